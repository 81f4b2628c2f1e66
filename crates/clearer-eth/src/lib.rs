//! Primitive newtypes and fixed-point arithmetic shared across the clearing
//! pipeline.
//!
//! All amounts that cross a component boundary are either a token-decimal
//! [`TokenAmount`] (the units a vault or ERC-20 `balanceOf` speaks) or a
//! [`Fixed18`] (18-decimal fixed point, the unit orderbook ratios and
//! intermediate arithmetic are always expressed in). [`scale18`] and
//! [`scale18_to`] are the only place a conversion between the two happens.

use alloy_primitives::U256;
use derive_more::{Add, Display, From, Into, Sub};
use ruint::aliases::U512;

pub mod gas;

pub use gas::{EffectiveGasPrice, Gas, GasPrice};

/// A 20-byte account/contract address.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, From, Into)]
pub struct Address(pub alloy_primitives::Address);

/// An amount denominated in a token's native decimals (e.g. what
/// `balanceOf` or a vault accounting entry returns).
#[derive(Debug, Default, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Add, Sub, From, Into)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(U256::ZERO);

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// An amount or ratio expressed in 18-decimal fixed point, regardless of the
/// decimals of the token it describes. This is the unit every order `ratio`,
/// every `marketPrice`, and every intermediate product in the dryrun
/// pipeline is expressed in (`spec` §3, §4.4 "Numeric semantics").
#[derive(Debug, Default, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Add, Sub, From, Into)]
pub struct Fixed18(pub U256);

impl Fixed18 {
    pub const ZERO: Fixed18 = Fixed18(U256::ZERO);
    pub const ONE: Fixed18 = Fixed18(U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]));

    pub fn from_raw(value: U256) -> Self {
        Self(value)
    }

    /// `self * rhs / 1e18`, the fixed-point multiplication of two 18-decimal
    /// numbers, computed with a widened intermediate product so that large
    /// token amounts never lose precision (`spec` §4.4: "never lose
    /// precision by early truncation").
    pub fn checked_mul(self, rhs: Fixed18) -> Option<Fixed18> {
        mul_div(self.0, rhs.0, Fixed18::ONE.0).map(Fixed18)
    }

    /// `self * 1e18 / rhs`, the fixed-point division of two 18-decimal
    /// numbers.
    pub fn checked_div(self, rhs: Fixed18) -> Option<Fixed18> {
        if rhs.0.is_zero() {
            return None;
        }
        mul_div(self.0, Fixed18::ONE.0, rhs.0).map(Fixed18)
    }

    /// `self * pct / 100`, used for the gas-coverage percentage and the 2%
    /// bundle-mode headroom (`spec` §4.4.4, §4.4.7).
    pub fn checked_mul_percent(self, pct_numerator: u64, pct_denominator: u64) -> Option<Fixed18> {
        mul_div(
            self.0,
            U256::from(pct_numerator),
            U256::from(pct_denominator),
        )
        .map(Fixed18)
    }

    pub fn saturating_sub(self, rhs: Fixed18) -> Fixed18 {
        Fixed18(self.0.saturating_sub(rhs.0))
    }
}

/// Converts a token-decimal amount into 18-decimal fixed point.
///
/// `scale18(x, d) = x * 10^(18 - d)` when `d <= 18`, else `x / 10^(d - 18)`
/// (`spec` §4.4).
pub fn scale18(amount: TokenAmount, decimals: u8) -> Fixed18 {
    let x = amount.0;
    Fixed18(match decimals.cmp(&18) {
        std::cmp::Ordering::Less | std::cmp::Ordering::Equal => {
            x.saturating_mul(pow10(18 - decimals))
        }
        std::cmp::Ordering::Greater => x / pow10(decimals - 18),
    })
}

/// The inverse of [`scale18`]: truncates an 18-decimal fixed-point amount
/// back down to a token's native decimals. Only emitted at the calldata
/// boundary (`spec` §3 invariant).
pub fn scale18_to(amount: Fixed18, decimals: u8) -> TokenAmount {
    let x = amount.0;
    TokenAmount(match decimals.cmp(&18) {
        std::cmp::Ordering::Less | std::cmp::Ordering::Equal => x / pow10(18 - decimals),
        std::cmp::Ordering::Greater => x.saturating_mul(pow10(decimals - 18)),
    })
}

fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// `a * b / denom`, computed with a 512-bit intermediate so the product of
/// two near-2^256 operands never overflows before the division truncates it
/// back down.
fn mul_div(a: U256, b: U256, denom: U256) -> Option<U256> {
    if denom.is_zero() {
        return None;
    }
    let wide = U512::from(a) * U512::from(b) / U512::from(denom);
    U256::try_from(wide).ok()
}
