use {
    async_trait::async_trait,
    clearer_eth::TokenAmount,
    clearer_model::{DryrunFailure, DryrunFailureReason, DryrunOutcome, DryrunResult, Mode},
    std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    tokio::task::JoinSet,
};

/// Object-safe facade over a single dryrun mode, abstracting over whether
/// the caller drives C4 (route-processor) or C5 (intra-orderbook) — both
/// share this binary-search skeleton (`spec` §2, C6).
#[async_trait]
pub trait SizableDryrun: Send + Sync {
    /// Runs the dryrun at `max_input`. The second element of the tuple is
    /// `Some(hasPriceMatch)` when the dryrun got far enough to compare
    /// against market price, matching C4's `hasPriceMatch` out-param
    /// (`spec` §4.4).
    async fn run(&self, max_input: TokenAmount, is_first_hop: bool) -> (DryrunResult, Option<bool>);
}

/// C6: drives a [`SizableDryrun`] across `hops` iterations, halving the step
/// each time to find the largest `maxInput <= vault_balance` that still
/// clears (`spec` §4.6).
pub struct BinarySearchSizer {
    hops: u8,
}

impl BinarySearchSizer {
    /// `hops` is clamped to `10`, the deadline-free bound the binary search
    /// enforces on itself (`spec` §5: "bounded by H <= 10 iterations").
    pub fn new(hops: u8) -> Self {
        Self {
            hops: hops.clamp(1, 10),
        }
    }

    pub async fn run(&self, dryrun: &dyn SizableDryrun, vault_balance: TokenAmount) -> DryrunResult {
        if vault_balance.is_zero() {
            return Err(DryrunFailure::new(
                DryrunFailureReason::NoOpportunity,
                "zero vault balance",
            ));
        }

        let mut cursor = vault_balance;
        let mut best: Option<DryrunOutcome> = None;
        let mut all_no_route = true;
        let mut last_failure: Option<DryrunFailure> = None;

        for hop in 1..=self.hops {
            let step = half_step(vault_balance, hop as u32 + 1);
            let (result, _has_price_match) = dryrun.run(cursor, hop == 1).await;

            match result {
                Ok(outcome) => {
                    all_no_route = false;
                    if hop == 1 || hop == self.hops {
                        return Ok(outcome);
                    }
                    best = Some(outcome);
                    cursor = clamp_to_balance(cursor + step, vault_balance);
                }
                Err(failure) => {
                    if matches!(failure.reason, DryrunFailureReason::NoWalletFund) {
                        return Err(failure);
                    }
                    if !matches!(failure.reason, DryrunFailureReason::NoRoute) {
                        all_no_route = false;
                    }
                    cursor = saturating_sub_amount(cursor, step);
                    last_failure = Some(failure);
                }
            }
        }

        if let Some(outcome) = best {
            return Ok(outcome);
        }

        let reason = if all_no_route {
            DryrunFailureReason::NoRoute
        } else {
            DryrunFailureReason::NoOpportunity
        };
        Err(last_failure.unwrap_or_else(|| DryrunFailure::new(reason, "no opportunity found")))
    }
}

fn half_step(vault_balance: TokenAmount, divisor_exponent: u32) -> TokenAmount {
    TokenAmount(vault_balance.0 >> divisor_exponent.min(255))
}

fn clamp_to_balance(value: TokenAmount, max: TokenAmount) -> TokenAmount {
    if value > max {
        max
    } else {
        value
    }
}

fn saturating_sub_amount(value: TokenAmount, step: TokenAmount) -> TokenAmount {
    TokenAmount(value.0.saturating_sub(step.0))
}

/// Runs `retries` independent binary searches concurrently, one per
/// duplication mode (`spec` §4.6 `findOppWithRetries`, §9 "structured
/// concurrency"). Cancels the remaining sizers as soon as any of them
/// reports a terminal `NoWalletFund`, and otherwise returns the fulfilled
/// outcome with the greatest `maxInput`.
pub async fn find_opp_with_retries(
    hops: u8,
    retries: u8,
    make_dryrun: impl Fn(Mode) -> Arc<dyn SizableDryrun> + Send + Sync + 'static,
    vault_balance: TokenAmount,
) -> DryrunResult {
    let retries = retries.clamp(1, Mode::RETRY_MODES.len() as u8);
    let terminal = Arc::new(AtomicBool::new(false));
    let mut join_set = JoinSet::new();

    for mode in Mode::RETRY_MODES.into_iter().take(retries as usize) {
        let dryrun = make_dryrun(mode);
        let sizer = BinarySearchSizer::new(hops);
        let terminal = Arc::clone(&terminal);
        join_set.spawn(async move {
            if terminal.load(Ordering::Relaxed) {
                return Err(DryrunFailure::new(
                    DryrunFailureReason::NoWalletFund,
                    "cancelled after sibling reported no wallet funds",
                ));
            }
            let result = sizer.run(dryrun.as_ref(), vault_balance).await;
            if matches!(
                result,
                Err(ref failure) if matches!(failure.reason, DryrunFailureReason::NoWalletFund)
            ) {
                terminal.store(true, Ordering::Relaxed);
            }
            result
        });
    }

    let mut best: Option<DryrunOutcome> = None;
    let mut last_failure: Option<DryrunFailure> = None;
    let mut all_no_route = true;

    while let Some(joined) = join_set.join_next().await {
        let result = match joined {
            Ok(result) => result,
            Err(join_err) => {
                last_failure = Some(DryrunFailure::new(
                    DryrunFailureReason::NoOpportunity,
                    format!("sizer task panicked: {join_err}"),
                ));
                all_no_route = false;
                continue;
            }
        };
        match result {
            Ok(outcome) => {
                all_no_route = false;
                let better = best
                    .as_ref()
                    .map(|current| outcome.max_input > current.max_input)
                    .unwrap_or(true);
                if better {
                    best = Some(outcome);
                }
            }
            Err(failure) => {
                if matches!(failure.reason, DryrunFailureReason::NoWalletFund) {
                    join_set.abort_all();
                    return Err(failure);
                }
                if !matches!(failure.reason, DryrunFailureReason::NoRoute) {
                    all_no_route = false;
                }
                last_failure = Some(failure);
            }
        }
    }

    if let Some(outcome) = best {
        return Ok(outcome);
    }

    let reason = if all_no_route {
        DryrunFailureReason::NoRoute
    } else {
        DryrunFailureReason::NoOpportunity
    };
    Err(last_failure.unwrap_or_else(|| DryrunFailure::new(reason, "no opportunity found across retries")))
}
