//! The submission boundary C7 uses to send a clearing transaction and wait
//! for its receipt (`spec` §4.7, §1 names "RPC client construction" out of
//! scope — this trait is the named interface the core depends on).

use {
    async_trait::async_trait,
    clearer_model::{MinedReceipt, RawTx, TxHash},
};

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("transport error submitting transaction: {0}")]
    Transport(String),
    #[error("submission timed out")]
    TimedOut,
}

#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    #[error("transport error waiting for receipt: {0}")]
    Transport(String),
    #[error("timed out waiting for receipt")]
    TimedOut,
}

/// Sends a [`RawTx`] and waits for it to mine. When `private_rpc` is `Some`,
/// implementations route submission through the bound flashbot-style signer
/// while reads still go through the public RPC (`spec` §4.7 "Optional private
/// submission").
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait TxSubmitter: Send + Sync {
    async fn submit(&self, raw_tx: &RawTx, private: bool) -> Result<TxHash, SubmitError>;

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout_ms: u64,
    ) -> Result<MinedReceipt, ReceiptError>;

    /// Re-simulates the mined tx at its block to recover a revert reason
    /// (`spec` §4.7 "re-simulate the same tx at the mined block").
    async fn revert_reason(&self, raw_tx: &RawTx, block_number: u64) -> Option<String>;

    /// Returns a human-facing URL for a mined transaction hash, used to
    /// populate [`clearer_model::PairReport::tx_url`].
    fn tx_url(&self, tx_hash: TxHash) -> String;
}

/// Runs `fut` and reports a timeout as `Err(on_timeout)` instead of hanging
/// forever, the core's equivalent of the source's `promiseTimeout(op, ms,
/// message)` combinator (`spec` §5 "Cancellation & timeouts").
pub async fn with_timeout<T, E>(
    timeout_ms: u64,
    fut: impl std::future::Future<Output = Result<T, E>>,
    on_timeout: E,
) -> Result<T, E> {
    match tokio::time::timeout(std::time::Duration::from_millis(timeout_ms), fut).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout),
    }
}
