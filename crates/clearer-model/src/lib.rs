//! The data model shared by every stage of the clearing pipeline: orders,
//! bundled pairs, dryrun outcomes, halt reasons, and pair reports (`spec`
//! §3).

mod bundle;
mod dryrun;
mod order;
mod receipt;
mod report;

pub use bundle::{BundledPair, Mode};
pub use dryrun::{
    DryrunFailure, DryrunFailureReason, DryrunOutcome, DryrunResult, ErrorSnapshot, RawTx,
    Severity,
};
pub use order::{Order, OrderId, OrderIo, Quote, TakeOrder};
pub use receipt::{MinedReceipt, TxHash};
pub use report::{HaltReason, PairReport, PairStatus};
