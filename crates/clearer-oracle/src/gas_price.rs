use {async_trait::async_trait, clearer_eth::GasPrice};

#[derive(Debug, thiserror::Error)]
pub enum GasPriceError {
    #[error("transport error fetching gas price: {0}")]
    Transport(String),
}

/// Returns the current gas price in wei (`spec` C2, `gasPrice()`). Backed by
/// an external node RPC, which is out of this crate's scope (`spec` §1).
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait GasPriceSource: Send + Sync {
    async fn gas_price(&self) -> Result<GasPrice, GasPriceError>;
}
