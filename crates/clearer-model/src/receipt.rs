use clearer_eth::{EffectiveGasPrice, GasPrice, TokenAmount};

/// Opaque handle to a submitted transaction, returned by the (out-of-scope)
/// submission boundary so the core can wait on it (`spec` §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHash(pub alloy_primitives::B256);

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The mined result of a submitted clearing transaction, already decoded
/// down to the deltas the pair processor needs (`spec` §4.7). Raw log
/// decoding against the orderbook/arb contract ABIs is treated as part of the
/// external RPC boundary (`spec` §1 names "RPC client construction" and
/// "error-decoding libraries" out of scope), so this type carries the
/// decoded result rather than raw logs.
#[derive(Debug, Clone)]
pub struct MinedReceipt {
    pub status: bool,
    pub effective_gas_price: GasPrice,
    pub gas_used: u64,
    /// Sum of buy-token amounts cleared, read from `TakeOrderV2`/`ClearV2`
    /// events between the orderbook and arb contract.
    pub cleared_amount: TokenAmount,
    /// Signer's buy-token balance delta across the receipt.
    pub income: TokenAmount,
    pub cleared_orders: Vec<crate::OrderId>,
}

impl MinedReceipt {
    /// `effectiveGasPrice × gasUsed`, in wei (`spec` §4.7 `actualGasCost`).
    pub fn actual_gas_cost(&self) -> EffectiveGasPrice {
        clearer_eth::Gas(alloy_primitives::U256::from(self.gas_used)) * self.effective_gas_price
    }
}
