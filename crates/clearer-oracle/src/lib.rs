//! The quote/liquidity oracle (C1) and gas & native-price oracle (C2)
//! external collaborator interfaces, plus the shared on-disk pool cache
//! (`spec` §4.1, §4.2, §5, §6).

mod eth_price;
mod gas_price;
mod pool_cache;
mod route;

pub use eth_price::{EthPriceOracle, EthPriceSource};
pub use gas_price::{GasPriceError, GasPriceSource};
pub use pool_cache::PoolCache;
pub use route::{Route, RouteError, RouteFetcher};

#[cfg(any(test, feature = "test-util"))]
pub use {eth_price::MockEthPriceSource, gas_price::MockGasPriceSource, route::MockRouteFetcher};
