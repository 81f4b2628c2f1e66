use {
    alloy_primitives::Bytes,
    async_trait::async_trait,
    clearer_eth::{Address, TokenAmount},
};

/// A priced route returned by the external router/data-fetcher for a given
/// `(fromToken, toToken, amountIn)` triple (`spec` C1).
#[derive(Debug, Clone)]
pub struct Route {
    pub amount_out: TokenAmount,
    /// The route-processor calldata fragment embedded as `takeOrdersConfig.data`
    /// (`spec` §4.4 step 5).
    pub route_code: Bytes,
    /// A human-readable hop summary, carried through to the dryrun outcome
    /// as `routeVisual` (`spec` §3).
    pub visual: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// No path exists between the two tokens through the allow-listed
    /// liquidity providers at this input size (`spec` §4.4 step 1).
    #[error("no route")]
    NoWay,
    #[error("transport error: {0}")]
    Transport(String),
}

/// Wraps an on-chain router/data-fetcher: given a token pair and an input
/// size, returns the best available route and amount out (`spec` C1, "Quote/
/// Liquidity Oracle"). The data-fetcher itself — the thing that actually
/// knows how to talk to pools on chain — is an external collaborator
/// (`spec` §1); this trait is the named interface the core depends on.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait RouteFetcher: Send + Sync {
    async fn best_route(
        &self,
        from_token: Address,
        to_token: Address,
        amount_in: TokenAmount,
        liquidity_providers: &[String],
    ) -> Result<Route, RouteError>;
}
