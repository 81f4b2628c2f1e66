//! The transaction simulator (C3): given an assembled calldata payload,
//! estimates gas and classifies failures as node-side reverts vs. local
//! transport errors (`spec` §4.3, §7).

use {
    alloy_primitives::{Bytes, U256},
    async_trait::async_trait,
    clearer_eth::{Address, Gas},
};

/// The calldata payload a dryrun hands to the simulator.
#[derive(Debug, Clone)]
pub struct RawTxRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

/// The unclassified error an underlying gas-estimation transport returns.
/// This is the named interface `spec` §1 calls out as external — estimating
/// gas against a live node — the simulator itself only adds classification
/// and headroom on top (`spec` C3).
#[derive(Debug, Clone)]
pub enum TransportError {
    InsufficientFundsForGas,
    /// A node-side revert, with raw return data when available.
    Revert { data: Option<Bytes>, message: String },
    /// Timeout, connection reset, or any other non-revert transport failure.
    Transport(String),
}

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait GasEstimationTransport: Send + Sync {
    async fn estimate_gas(&self, tx: &RawTxRequest) -> Result<u64, TransportError>;
}

/// `spec` §4.3 classification of a failed estimate.
#[derive(Debug, Clone)]
pub enum SimulationFailure {
    /// Terminal for the whole round (`spec` §7).
    InsufficientFundsForGas,
    /// Node-side revert with decodable data.
    NodeRevert {
        data: Option<Bytes>,
        message: String,
    },
    /// Transport/timeout; retryable.
    Retryable(String),
}

/// Default headroom multiplier applied to every successful gas estimate
/// (`spec` §4.3: "1.03").
pub const DEFAULT_HEADROOM_NUMERATOR: u64 = 103;
pub const DEFAULT_HEADROOM_DENOMINATOR: u64 = 100;

/// Wraps a [`GasEstimationTransport`], classifying its errors and applying
/// gas headroom (`spec` C3).
pub struct TxSimulator<T> {
    transport: T,
    headroom_numerator: u64,
    headroom_denominator: u64,
}

impl<T: GasEstimationTransport> TxSimulator<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            headroom_numerator: DEFAULT_HEADROOM_NUMERATOR,
            headroom_denominator: DEFAULT_HEADROOM_DENOMINATOR,
        }
    }

    pub fn with_headroom(mut self, numerator: u64, denominator: u64) -> Self {
        self.headroom_numerator = numerator;
        self.headroom_denominator = denominator;
        self
    }

    pub async fn estimate_gas(&self, tx: &RawTxRequest) -> Result<Gas, SimulationFailure> {
        match self.transport.estimate_gas(tx).await {
            Ok(gas) => Ok(Gas(U256::from(gas)).with_headroom(self.headroom_numerator, self.headroom_denominator)),
            Err(TransportError::InsufficientFundsForGas) => Err(SimulationFailure::InsufficientFundsForGas),
            Err(TransportError::Revert { data, message }) => {
                tracing::debug!(%message, "simulation reverted");
                Err(SimulationFailure::NodeRevert { data, message })
            }
            Err(TransportError::Transport(message)) => {
                tracing::debug!(%message, "simulation transport error");
                Err(SimulationFailure::Retryable(message))
            }
        }
    }
}

/// Object-safe facade over [`TxSimulator`] so callers that fan out across
/// several concurrent dryruns can hold an `Arc<dyn Simulator>` instead of
/// being generic over the transport.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait Simulator: Send + Sync {
    async fn estimate_gas(&self, tx: &RawTxRequest) -> Result<Gas, SimulationFailure>;
}

#[async_trait]
impl<T: GasEstimationTransport> Simulator for TxSimulator<T> {
    async fn estimate_gas(&self, tx: &RawTxRequest) -> Result<Gas, SimulationFailure> {
        // Resolves to the inherent method above; inherent methods shadow
        // trait methods of the same name, so this isn't recursive.
        self.estimate_gas(tx).await
    }
}
