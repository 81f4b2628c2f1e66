//! Gas and native-token price types, adapted from the same shape the
//! teacher's settlement-facing `eth::Gas`/`eth::GasPrice` types use.

use alloy_primitives::U256;
use derive_more::{Add, Display, From, Into};

/// Gas amount in gas units, before any headroom multiplier is applied.
#[derive(Debug, Default, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Add, From, Into)]
pub struct Gas(pub U256);

impl Gas {
    /// Applies the simulator's configurable headroom factor (`spec` §4.3,
    /// default `1.03`) expressed as a numerator/denominator pair so the
    /// multiplication stays in integer arithmetic.
    pub fn with_headroom(self, numerator: u64, denominator: u64) -> Gas {
        Gas(self.0.saturating_mul(U256::from(numerator)) / U256::from(denominator))
    }
}

/// Current gas price returned by the gas oracle (`spec` C2), expressed as a
/// single wei value — the core only needs a scalar price to cost a dryrun,
/// unlike the EIP-1559 max/tip/base split a submission path would need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, From, Into)]
pub struct GasPrice(pub U256);

/// `gasUsed * effectiveGasPrice`, the wei cost of a mined transaction
/// (`spec` §4.7 `actualGasCost`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, From, Into)]
pub struct EffectiveGasPrice(pub U256);

impl std::ops::Mul<GasPrice> for Gas {
    type Output = EffectiveGasPrice;

    fn mul(self, rhs: GasPrice) -> Self::Output {
        EffectiveGasPrice(self.0 * rhs.0)
    }
}
