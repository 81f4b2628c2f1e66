use clearer_eth::{Fixed18, TokenAmount};

/// Why a pair's processing halted, surfaced verbatim in its [`PairReport`]
/// (`spec` §4.7). Replaces the source's sentinel reject strings with a
/// typed variant (`spec` §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum HaltReason {
    /// Terminal for the whole round (`spec` §7).
    NoWalletFund,
    FailedToGetVaultBalance,
    /// Non-fatal; the processor warns and continues with gas price unknown.
    FailedToGetGasPrice,
    /// Non-fatal; the processor warns and continues, income cannot be
    /// converted to the buy token.
    FailedToGetEthPrice,
    FailedToGetPools,
    NoRoute,
    NoOpportunity,
    TxFailed,
    TxMineFailed,
    UnexpectedError,
}

impl HaltReason {
    /// Only [`HaltReason::NoWalletFund`] breaks the pair loop (`spec` §7).
    pub fn terminates_round(self) -> bool {
        matches!(self, HaltReason::NoWalletFund)
    }
}

/// Outcome status of processing one [`crate::BundledPair`] (`spec` §3,
/// "Pair Report").
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PairStatus {
    EmptyVault,
    NoOpportunity,
    FoundOpportunity,
}

/// The per-pair result the round runner collects (`spec` §3, §4.8). Emitted
/// as telemetry with `details.*`-prefixed attributes by the (out-of-scope)
/// front-end (`spec` §6 "Report emission").
#[derive(Debug, Clone)]
pub struct PairReport {
    pub status: PairStatus,
    pub token_pair: String,
    pub buy_token: clearer_eth::Address,
    pub sell_token: clearer_eth::Address,
    pub tx_url: Option<String>,
    pub cleared_amount: Option<TokenAmount>,
    pub income: Option<Fixed18>,
    pub net_profit: Option<Fixed18>,
    pub gas_cost: Option<TokenAmount>,
    pub cleared_orders: Option<Vec<crate::OrderId>>,
    pub halt_reason: Option<HaltReason>,
}

impl PairReport {
    pub fn empty_vault(buy_token: clearer_eth::Address, sell_token: clearer_eth::Address, token_pair: String) -> Self {
        Self {
            status: PairStatus::EmptyVault,
            token_pair,
            buy_token,
            sell_token,
            tx_url: None,
            cleared_amount: None,
            income: None,
            net_profit: None,
            gas_cost: None,
            cleared_orders: None,
            halt_reason: None,
        }
    }

    pub fn no_opportunity(
        buy_token: clearer_eth::Address,
        sell_token: clearer_eth::Address,
        token_pair: String,
        halt_reason: HaltReason,
    ) -> Self {
        Self {
            status: PairStatus::NoOpportunity,
            token_pair,
            buy_token,
            sell_token,
            tx_url: None,
            cleared_amount: None,
            income: None,
            net_profit: None,
            gas_cost: None,
            cleared_orders: None,
            halt_reason: Some(halt_reason),
        }
    }

    /// A transaction was found and at least attempted; `halt_reason` is set
    /// when submission or mining did not succeed cleanly (`spec` §4.7, S6).
    /// `tx_url` is `None` when an opportunity was found but submission never
    /// produced a transaction hash.
    #[allow(clippy::too_many_arguments)]
    pub fn found_opportunity(
        buy_token: clearer_eth::Address,
        sell_token: clearer_eth::Address,
        token_pair: String,
        tx_url: Option<String>,
        cleared_amount: Option<TokenAmount>,
        income: Option<Fixed18>,
        net_profit: Option<Fixed18>,
        gas_cost: Option<TokenAmount>,
        cleared_orders: Option<Vec<crate::OrderId>>,
        halt_reason: Option<HaltReason>,
    ) -> Self {
        Self {
            status: PairStatus::FoundOpportunity,
            token_pair,
            buy_token,
            sell_token,
            tx_url,
            cleared_amount,
            income,
            net_profit,
            gas_cost,
            cleared_orders,
            halt_reason,
        }
    }

    /// Emits this report's `details.*` fields as a single tracing event, the
    /// shape a front-end span exporter would forward (`spec` §6).
    pub fn emit(&self) {
        tracing::info!(
            details.status = %self.status,
            details.token_pair = %self.token_pair,
            details.buy_token = %self.buy_token,
            details.sell_token = %self.sell_token,
            details.tx_url = self.tx_url.as_deref().unwrap_or(""),
            details.halt_reason = self.halt_reason.map(|r| r.to_string()).unwrap_or_default(),
            "pair processed"
        );
    }
}
