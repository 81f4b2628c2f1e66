use {
    alloy_primitives::Bytes,
    clearer_eth::{Address, Fixed18, Gas, TokenAmount},
    std::collections::HashMap,
};

/// An assembled, unsigned clearing transaction, ready for gas estimation or
/// submission.
#[derive(Debug, Clone)]
pub struct RawTx {
    pub to: Address,
    pub data: Bytes,
    pub value: TokenAmount,
    /// Present once stage-2 simulation (`spec` §4.4 step 7) has locked the
    /// final gas limit.
    pub gas: Option<Gas>,
}

/// The result of a successful dryrun (`spec` §3, "Dryrun Outcome").
#[derive(Debug, Clone)]
pub struct DryrunOutcome {
    pub raw_tx: RawTx,
    pub max_input: TokenAmount,
    pub price: Fixed18,
    pub route_visual: String,
    pub gas_cost_in_token: TokenAmount,
    pub estimated_profit: Fixed18,
    pub opp_block_number: u64,
}

/// Why a dryrun failed to find a clearing opportunity at a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum DryrunFailureReason {
    NoRoute,
    NoOpportunity,
    NoWalletFund,
}

/// Severity attached to an [`ErrorSnapshot`] when it is emitted as telemetry.
/// Purely informational — never affects control flow (`spec` §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A diagnostic capture of a failed simulation or mined-but-reverted
/// transaction (`spec` §7, "Error snapshots").
#[derive(Debug, Clone, Default)]
pub struct ErrorSnapshot {
    pub message: String,
    pub name: String,
    pub details: String,
    /// Decoded revert arguments, present only when the revert data was hex
    /// and matched one of the ABIs named in `spec` §6.
    pub decoded_args: Option<Vec<String>>,
    /// `"account ran out of gas"` / `"transaction ran out of specified gas"`,
    /// present only when a receipt was available to diagnose against.
    pub gas_diagnostic: Option<String>,
}

/// The failure branch of a [`DryrunOutcome`] (`spec` §3).
#[derive(Debug, Clone)]
pub struct DryrunFailure {
    pub reason: DryrunFailureReason,
    pub node_error: Option<String>,
    pub error_snapshot: ErrorSnapshot,
    pub span_attrs: HashMap<String, String>,
}

impl DryrunFailure {
    pub fn new(reason: DryrunFailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            node_error: None,
            error_snapshot: ErrorSnapshot {
                message: message.into(),
                ..Default::default()
            },
            span_attrs: HashMap::new(),
        }
    }
}

pub type DryrunResult = Result<DryrunOutcome, DryrunFailure>;
