use {
    crate::route::{RouteError, RouteFetcher},
    alloy_primitives::U256,
    cached::{Cached, TimedCache},
    clearer_eth::{scale18, Address, Fixed18, TokenAmount},
    std::sync::Arc,
    tokio::sync::Mutex,
};

/// Returns a reference native-token price expressed in the buy-token,
/// obtained by routing `1 native` through the [`RouteFetcher`] into
/// `buyToken` (`spec` C2, `ethPrice()`). Memoised per `(token,
/// block-height-bucket)` with a bounded TTL so a tight dryrun loop never
/// recomputes it on every hop (`spec` §4.2).
pub struct EthPriceOracle<F> {
    fetcher: Arc<F>,
    native_token: Address,
    liquidity_providers: Vec<String>,
    block_bucket_size: u64,
    cache: Mutex<TimedCache<(Address, u64), Option<Fixed18>>>,
}

impl<F: RouteFetcher> EthPriceOracle<F> {
    pub fn new(
        fetcher: Arc<F>,
        native_token: Address,
        liquidity_providers: Vec<String>,
        ttl_seconds: u64,
        block_bucket_size: u64,
    ) -> Self {
        Self {
            fetcher,
            native_token,
            liquidity_providers,
            block_bucket_size: block_bucket_size.max(1),
            cache: Mutex::new(TimedCache::with_lifespan(ttl_seconds)),
        }
    }

    /// Returns `None` when no route exists from native token to `buy_token`
    /// (`spec` §4.2: "Returns empty/none when no route exists").
    pub async fn eth_price(&self, buy_token: Address, buy_decimals: u8, block_number: u64) -> Option<Fixed18> {
        let bucket = block_number / self.block_bucket_size;
        let key = (buy_token, bucket);

        if let Some(hit) = self.cache.lock().await.cache_get(&key) {
            return *hit;
        }

        let one_native = TokenAmount(U256::from(10u64).pow(U256::from(18u64)));
        let priced = match self
            .fetcher
            .best_route(self.native_token, buy_token, one_native, &self.liquidity_providers)
            .await
        {
            Ok(route) => Some(scale18(route.amount_out, buy_decimals)),
            Err(RouteError::NoWay) => None,
            Err(RouteError::Transport(err)) => {
                tracing::warn!(%err, "failed to fetch eth price route");
                None
            }
        };

        self.cache.lock().await.cache_set(key, priced);
        priced
    }
}

/// Object-safe facade over [`EthPriceOracle`] so callers that hold several
/// oracles behind trait objects (`spec` C7) aren't generic over the route
/// fetcher type.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait EthPriceSource: Send + Sync {
    async fn eth_price(&self, buy_token: Address, buy_decimals: u8, block_number: u64) -> Option<Fixed18>;
}

#[async_trait::async_trait]
impl<F: RouteFetcher> EthPriceSource for EthPriceOracle<F> {
    async fn eth_price(&self, buy_token: Address, buy_decimals: u8, block_number: u64) -> Option<Fixed18> {
        // Resolves to the inherent method above; see the identical note on
        // `clearer_simulator::Simulator`.
        self.eth_price(buy_token, buy_decimals, block_number).await
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::route::Route,
        std::sync::atomic::{AtomicUsize, Ordering},
    };

    /// Counts how many times `best_route` is actually invoked, so the cache
    /// tests below can tell a hit from a miss.
    struct CountingFetcher {
        calls: AtomicUsize,
        outcome: Option<TokenAmount>,
    }

    #[async_trait::async_trait]
    impl RouteFetcher for CountingFetcher {
        async fn best_route(
            &self,
            _from_token: Address,
            _to_token: Address,
            _amount_in: TokenAmount,
            _liquidity_providers: &[String],
        ) -> Result<Route, RouteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Some(amount_out) => Ok(Route {
                    amount_out,
                    route_code: alloy_primitives::Bytes::new(),
                    visual: "direct".to_string(),
                }),
                None => Err(RouteError::NoWay),
            }
        }
    }

    fn buy_token() -> Address {
        Address(alloy_primitives::Address::with_last_byte(0x20))
    }

    /// `spec` §4.2: repeated lookups in the same block bucket are memoised
    /// and never re-fetch the route.
    #[tokio::test]
    async fn same_block_bucket_is_served_from_cache() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
            outcome: Some(TokenAmount(U256::from(2_000u64))),
        });
        let oracle = EthPriceOracle::new(fetcher.clone(), Address(alloy_primitives::Address::ZERO), vec![], 3600, 10);

        let first = oracle.eth_price(buy_token(), 18, 100).await;
        let second = oracle.eth_price(buy_token(), 18, 105).await; // same bucket (100/10 == 105/10)

        assert_eq!(first, second);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    /// A block number that lands in a new bucket re-fetches.
    #[tokio::test]
    async fn a_new_block_bucket_refetches() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
            outcome: Some(TokenAmount(U256::from(2_000u64))),
        });
        let oracle = EthPriceOracle::new(fetcher.clone(), Address(alloy_primitives::Address::ZERO), vec![], 3600, 10);

        oracle.eth_price(buy_token(), 18, 100).await;
        oracle.eth_price(buy_token(), 18, 200).await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    /// `spec` §4.2: no route caches and returns `None`, it does not panic or
    /// retry on the next call within the same bucket.
    #[tokio::test]
    async fn no_route_is_cached_as_none() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
            outcome: None,
        });
        let oracle = EthPriceOracle::new(fetcher.clone(), Address(alloy_primitives::Address::ZERO), vec![], 3600, 10);

        let first = oracle.eth_price(buy_token(), 18, 1).await;
        let second = oracle.eth_price(buy_token(), 18, 2).await;

        assert!(first.is_none());
        assert!(second.is_none());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }
}
