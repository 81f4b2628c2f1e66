use alloy_primitives::{Bytes, U256};

/// Builds the on-chain bytecode embedded in a withdraw/arb task that
/// enforces a minimum bounty (`spec` §4.4 step 5/7, §4.5 step 3).
///
/// The real interpreter bytecode is produced by a Rain expression compiler
/// that is out of this crate's scope (`spec` §1); what the core needs to
/// control is the single scalar the bytecode is parameterised on. This
/// builder produces a minimal, self-describing encoding of that scalar —
/// `abi.encode(minimumBounty)` — which is what every caller in this crate
/// treats an [`EvaluableV3::bytecode`](crate::abi::EvaluableV3) field as.
pub struct MinimumBountyTask;

impl MinimumBountyTask {
    /// A task that does not gate on any bounty at all, used while
    /// `gasCoveragePercentage == 0` (`spec` §8 property 5: "task.bytecode =
    /// 0x").
    pub fn zero() -> Bytes {
        Bytes::new()
    }

    /// A task enforcing `delta(balances) * prices >= minimum_bounty`.
    pub fn requiring_at_least(minimum_bounty: U256) -> Bytes {
        Bytes::from(minimum_bounty.to_be_bytes_vec())
    }
}
