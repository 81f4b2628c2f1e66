//! Small read-only boundary traits C7/C9 depend on that don't belong to any
//! one component: current block number and fresh vault balances (`spec` §4.7
//! "HaveBalance", §5 "block-number" is listed among the awaitable RPC
//! calls).

use {
    async_trait::async_trait,
    clearer_eth::TokenAmount,
    clearer_model::BundledPair,
};

#[derive(Debug, thiserror::Error)]
pub enum VaultBalanceError {
    #[error("transport error reading vault balance: {0}")]
    Transport(String),
}

/// Re-reads a bundle's current total vault balance immediately before
/// sizing, independent of the quote the order bundler (C8) read at round
/// start (`spec` §4.7 "HaveBalance").
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait VaultBalanceReader: Send + Sync {
    async fn vault_balance(&self, bundle: &BundledPair) -> Result<TokenAmount, VaultBalanceError>;
}

#[derive(Debug, thiserror::Error)]
#[error("transport error reading block number: {0}")]
pub struct BlockNumberError(pub String);

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait BlockNumberSource: Send + Sync {
    async fn block_number(&self) -> Result<u64, BlockNumberError>;
}
