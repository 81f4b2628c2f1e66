//! The clearing bot's outer shell: order bundling (C8), the pair processor
//! (C7), the round runner (C9), configuration, and process wiring (`spec`
//! §4.1, §4.7, §4.8, §6).

pub mod bundler;
pub mod chain;
pub mod config;
pub mod observe;
pub mod pair_processor;
pub mod round_runner;
pub mod submitter;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use bundler::{OrderBundler, OrderReader, OrderReaderError, UnquotedTakeOrder};
pub use chain::{BlockNumberError, BlockNumberSource, VaultBalanceError, VaultBalanceReader};
pub use config::Settings;
pub use pair_processor::{PairProcessor, ProcessorConfig};
pub use round_runner::{Repetitions, RoundRunner, RoundRunnerConfig};
pub use submitter::{with_timeout, ReceiptError, SubmitError, TxSubmitter};

#[cfg(any(test, feature = "test-util"))]
pub use {bundler::MockOrderReader, chain::MockBlockNumberSource, chain::MockVaultBalanceReader, submitter::MockTxSubmitter};
