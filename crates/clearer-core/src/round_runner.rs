//! C9: iterates bundles once per round, composing their [`PairReport`]s
//! (`spec` §4.8).

use {
    crate::{
        bundler::{OrderBundler, OrderReader, OrderReaderError},
        pair_processor::{PairProcessor, ProcessorConfig},
    },
    clearer_dryrun::Opposing,
    clearer_model::{HaltReason, Order, PairReport, TakeOrder},
    clearer_oracle::PoolCache,
    std::{sync::Arc, time::Duration},
};

/// How many rounds to run: a fixed count, or forever (`spec` §6 `repetitions`,
/// "-1 = infinite").
#[derive(Debug, Clone, Copy)]
pub enum Repetitions {
    Count(u32),
    Infinite,
}

impl Repetitions {
    pub fn from_config(value: i64) -> Self {
        if value < 0 {
            Repetitions::Infinite
        } else {
            Repetitions::Count(value as u32)
        }
    }
}

pub struct RoundRunnerConfig {
    pub bundle_on: bool,
    pub shuffle: bool,
    pub repetitions: Repetitions,
    pub sleep_between_rounds: Duration,
    pub pool_update_interval: Duration,
    pub processor: ProcessorConfig,
}

/// C9: the top-level loop. Holds the long-lived collaborators a round needs
/// (`spec` §5: "Signers, clients, and data-fetchers are owned by the
/// long-lived process and shared read-only across rounds").
pub struct RoundRunner<R> {
    bundler: OrderBundler<R>,
    processor: PairProcessor,
    pool_cache: PoolCache,
    config: RoundRunnerConfig,
}

impl<R: OrderReader> RoundRunner<R> {
    pub fn new(
        bundler: OrderBundler<R>,
        processor: PairProcessor,
        pool_cache: PoolCache,
        config: RoundRunnerConfig,
    ) -> Self {
        Self {
            bundler,
            processor,
            pool_cache,
            config,
        }
    }

    /// Runs `repetitions` rounds (or forever), sleeping between each and
    /// refreshing the pool cache on its own interval (`spec` §4.8, §5).
    pub async fn run(&self, orders: &[Arc<Order>], block_number: impl Fn() -> u64) -> anyhow::Result<()> {
        let mut rounds_done: u32 = 0;
        let mut last_pool_refresh = tokio::time::Instant::now();

        loop {
            if let Repetitions::Count(total) = self.config.repetitions {
                if rounds_done >= total {
                    return Ok(());
                }
            }

            if last_pool_refresh.elapsed() >= self.config.pool_update_interval {
                self.pool_cache.refresh().await?;
                last_pool_refresh = tokio::time::Instant::now();
            }

            let reports = self.run_once(orders, block_number(), &[]).await?;
            for report in &reports {
                report.emit();
            }

            rounds_done += 1;
            tokio::time::sleep(self.config.sleep_between_rounds).await;
        }
    }

    /// Runs a single round over the current order set, returning early (with
    /// the reports gathered so far) the moment a pair halts with
    /// `NoWalletFund` (`spec` §4.8, §7, §8 property 8).
    pub async fn run_once(
        &self,
        orders: &[Arc<Order>],
        block_number: u64,
        opposing_by_pair: &[Option<(TakeOrder, Opposing)>],
    ) -> Result<Vec<PairReport>, OrderReaderError> {
        let bundles = self
            .bundler
            .bundle(orders, self.config.bundle_on, self.config.shuffle)
            .await?;

        let mut reports = Vec::with_capacity(bundles.len());
        for (index, bundle) in bundles.iter().enumerate() {
            let opposing = opposing_by_pair.get(index).cloned().flatten();
            let report = self
                .processor
                .process(bundle, &self.config.processor, block_number, opposing)
                .await;

            let terminal = report.halt_reason.map(HaltReason::terminates_round).unwrap_or(false);
            reports.push(report);
            if terminal {
                break;
            }
        }

        Ok(reports)
    }
}
