//! C7: end-to-end per-pair orchestration (`spec` §4.7).
//!
//! ```text
//! [Init] -> [HaveBalance] -> [HaveGas&EthPrice] -> [HavePools]
//!         -> [HaveOpportunity | NoOpportunity | EmptyVault]
//! [HaveOpportunity] -> [Submitted] -> [Mined:ok | Mined:reverted | TimedOut]
//! ```

use {
    crate::{
        chain::VaultBalanceReader,
        submitter::{with_timeout, ReceiptError, SubmitError, TxSubmitter},
    },
    clearer_dryrun::{
        find_opp_with_retries, IntraOrderbookContext, IntraOrderbookDryrun, Opposing,
        RouteProcessorContext, RouteProcessorDryrun, RouteProcessorSizable, SizableDryrun,
    },
    clearer_eth::{scale18, Address, Fixed18, GasPrice, TokenAmount},
    clearer_model::{
        BundledPair, DryrunFailure, DryrunFailureReason, DryrunResult, HaltReason, Mode,
        PairReport, TakeOrder,
    },
    clearer_oracle::{EthPriceSource, GasPriceSource, RouteFetcher},
    clearer_simulator::Simulator,
    std::sync::Arc,
};

/// Per-round configuration a [`PairProcessor`] needs that does not change
/// between pairs (`spec` §6).
pub struct ProcessorConfig {
    pub arb_contract: Address,
    pub liquidity_providers: Vec<String>,
    pub gas_coverage_percentage: u64,
    pub max_ratio: bool,
    pub hops: u8,
    pub retries: u8,
    /// Milliseconds allotted to submission and receipt-waiting (`spec` §6
    /// `timeout`, §5 "promiseTimeout").
    pub timeout_ms: u64,
    /// Route through [`TxSubmitter`]'s private endpoint when one is
    /// configured (`spec` §4.7 "Optional private submission").
    pub use_private_submission: bool,
}

/// C7: orchestrates one [`BundledPair`] through sizing, submission, and
/// receipt analysis.
pub struct PairProcessor {
    gas_price_source: Arc<dyn GasPriceSource>,
    eth_price_source: Arc<dyn EthPriceSource>,
    vault_balance_reader: Arc<dyn VaultBalanceReader>,
    route_fetcher: Arc<dyn RouteFetcher>,
    simulator: Arc<dyn Simulator>,
    submitter: Arc<dyn TxSubmitter>,
}

impl PairProcessor {
    pub fn new(
        gas_price_source: Arc<dyn GasPriceSource>,
        eth_price_source: Arc<dyn EthPriceSource>,
        vault_balance_reader: Arc<dyn VaultBalanceReader>,
        route_fetcher: Arc<dyn RouteFetcher>,
        simulator: Arc<dyn Simulator>,
        submitter: Arc<dyn TxSubmitter>,
    ) -> Self {
        Self {
            gas_price_source,
            eth_price_source,
            vault_balance_reader,
            route_fetcher,
            simulator,
            submitter,
        }
    }

    /// Runs the full state machine for one pair. `opposing` is `Some` when
    /// an eligible intra-orderbook counterparty was located for this bundle
    /// (candidate discovery is an external concern, `spec` §1); when present
    /// it is tried first since it avoids AMM slippage entirely.
    pub async fn process(
        &self,
        bundle: &BundledPair,
        config: &ProcessorConfig,
        block_number: u64,
        opposing: Option<(TakeOrder, Opposing)>,
    ) -> PairReport {
        let token_pair = format!("{}/{}", bundle.sell_symbol, bundle.buy_symbol);

        // [Init] -> [HaveBalance]
        let vault_balance = match self.vault_balance_reader.vault_balance(bundle).await {
            Ok(balance) => balance,
            Err(err) => {
                tracing::warn!(%err, "failed to read vault balance");
                return PairReport::no_opportunity(
                    bundle.buy_token,
                    bundle.sell_token,
                    token_pair,
                    HaltReason::FailedToGetVaultBalance,
                );
            }
        };
        if vault_balance.is_zero() {
            return PairReport::empty_vault(bundle.buy_token, bundle.sell_token, token_pair);
        }

        // [HaveBalance] -> [HaveGas&EthPrice]. Both sources are non-fatal on
        // failure (`spec` §4.7): a missing gas price degrades to a zero-cost
        // estimate and a missing eth price is already modelled as `None`.
        let gas_price = match self.gas_price_source.gas_price().await {
            Ok(price) => price,
            Err(err) => {
                tracing::warn!(%err, "failed to fetch gas price, continuing with zero");
                GasPrice(alloy_primitives::U256::ZERO)
            }
        };
        let eth_price = self
            .eth_price_source
            .eth_price(bundle.buy_token, bundle.buy_decimals, block_number)
            .await;

        // [HavePools] -> [HaveOpportunity | NoOpportunity]
        let outcome = if let Some((alice, opposing)) = opposing {
            self.find_intra_orderbook_opportunity(
                bundle,
                &alice,
                &opposing,
                config,
                gas_price,
                eth_price,
                block_number,
            )
            .await
        } else {
            self.find_route_processor_opportunity(
                bundle,
                vault_balance,
                config,
                gas_price,
                eth_price,
                block_number,
            )
            .await
        };

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(failure) => {
                let halt_reason = classify_dryrun_failure(&failure);
                return PairReport::no_opportunity(
                    bundle.buy_token,
                    bundle.sell_token,
                    token_pair,
                    halt_reason,
                );
            }
        };

        // [HaveOpportunity] -> [Submitted] -> [Mined]
        self.submit_and_report(bundle, &token_pair, config, outcome, eth_price)
            .await
    }

    async fn find_route_processor_opportunity(
        &self,
        bundle: &BundledPair,
        vault_balance: TokenAmount,
        config: &ProcessorConfig,
        gas_price: GasPrice,
        eth_price: Option<Fixed18>,
        block_number: u64,
    ) -> DryrunResult {
        let dryrun = RouteProcessorDryrun::new(Arc::clone(&self.route_fetcher), Arc::clone(&self.simulator));
        let bundle = Arc::new(bundle.clone());
        let ctx = Arc::new(RouteProcessorContext {
            arb_contract: config.arb_contract,
            orderbook: bundle.orderbook,
            gas_price,
            eth_price,
            gas_coverage_percentage: config.gas_coverage_percentage,
            max_ratio: config.max_ratio,
            liquidity_providers: config.liquidity_providers.clone(),
            block_number,
        });

        let hops = config.hops;
        let retries = config.retries;
        let make_dryrun = {
            let dryrun = dryrun.clone();
            let bundle = Arc::clone(&bundle);
            let ctx = Arc::clone(&ctx);
            move |mode: Mode| -> Arc<dyn SizableDryrun> {
                Arc::new(RouteProcessorSizable::new(
                    dryrun.clone(),
                    Arc::clone(&bundle),
                    mode,
                    Arc::clone(&ctx),
                ))
            }
        };

        find_opp_with_retries(hops, retries, make_dryrun, vault_balance).await
    }

    async fn find_intra_orderbook_opportunity(
        &self,
        bundle: &BundledPair,
        alice: &TakeOrder,
        opposing: &Opposing,
        config: &ProcessorConfig,
        gas_price: GasPrice,
        eth_price: Option<Fixed18>,
        block_number: u64,
    ) -> DryrunResult {
        let dryrun = IntraOrderbookDryrun::new(Arc::clone(&self.simulator));
        let ctx = IntraOrderbookContext {
            orderbook: bundle.orderbook,
            gas_price,
            eth_price,
            gas_coverage_percentage: config.gas_coverage_percentage,
            block_number,
        };
        dryrun.run(alice, opposing, &ctx).await
    }

    async fn submit_and_report(
        &self,
        bundle: &BundledPair,
        token_pair: &str,
        config: &ProcessorConfig,
        outcome: clearer_model::DryrunOutcome,
        eth_price: Option<Fixed18>,
    ) -> PairReport {
        let cleared_orders: Vec<_> = bundle.take_orders().iter().map(|to| to.order.id).collect();

        let tx_hash = match with_timeout(
            config.timeout_ms,
            self.submitter.submit(&outcome.raw_tx, config.use_private_submission),
            SubmitError::TimedOut,
        )
        .await
        {
            Ok(hash) => hash,
            Err(err) => {
                tracing::warn!(%err, "failed to submit transaction");
                return PairReport::found_opportunity(
                    bundle.buy_token,
                    bundle.sell_token,
                    token_pair.to_string(),
                    None,
                    None,
                    None,
                    None,
                    None,
                    None,
                    Some(HaltReason::TxFailed),
                );
            }
        };

        let tx_url = self.submitter.tx_url(tx_hash);

        let receipt = match with_timeout(
            config.timeout_ms,
            self.submitter.wait_for_receipt(tx_hash, config.timeout_ms),
            ReceiptError::TimedOut,
        )
        .await
        {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::warn!(%err, "timed out waiting for receipt");
                return PairReport::found_opportunity(
                    bundle.buy_token,
                    bundle.sell_token,
                    token_pair.to_string(),
                    Some(tx_url),
                    None,
                    None,
                    None,
                    None,
                    Some(cleared_orders),
                    Some(HaltReason::TxMineFailed),
                );
            }
        };

        if !receipt.status {
            let revert_reason = self
                .submitter
                .revert_reason(&outcome.raw_tx, outcome.opp_block_number)
                .await;
            tracing::warn!(?revert_reason, "mined transaction reverted");
            return PairReport::found_opportunity(
                bundle.buy_token,
                bundle.sell_token,
                token_pair.to_string(),
                Some(tx_url),
                None,
                None,
                None,
                None,
                Some(cleared_orders),
                Some(HaltReason::TxMineFailed),
            );
        }

        // `spec` §4.7: `actualGasCost` is native-token wei and must be
        // converted to buy-token via the previously obtained `ethPrice`
        // before it can be compared against `income` (same conversion
        // `RouteProcessorDryrun::run` applies to its own gas estimate).
        let actual_gas_cost_wei = receipt.actual_gas_cost();
        let gas_cost = eth_price
            .map(|price| {
                let gas_cost_18 = scale18(TokenAmount(actual_gas_cost_wei.0), 18)
                    .checked_mul(price)
                    .unwrap_or(Fixed18::ZERO);
                clearer_eth::scale18_to(gas_cost_18, bundle.buy_decimals)
            })
            .unwrap_or(TokenAmount::ZERO);
        let gas_cost_18 = scale18(gas_cost, bundle.buy_decimals);
        let income_18 = scale18(receipt.income, bundle.buy_decimals);
        let net_profit = income_18.saturating_sub(gas_cost_18);

        PairReport::found_opportunity(
            bundle.buy_token,
            bundle.sell_token,
            token_pair.to_string(),
            Some(tx_url),
            Some(receipt.cleared_amount),
            Some(income_18),
            Some(net_profit),
            Some(gas_cost),
            Some(receipt.cleared_orders),
            None,
        )
    }
}

/// Maps a dryrun failure to the halt reason the report carries (`spec`
/// §4.7). `DryrunFailureReason` only distinguishes `NoRoute`/`NoOpportunity`/
/// `NoWalletFund`; route-fetch transport errors are folded into `NoRoute` by
/// C4/C5 (`spec` §4.4 step 1), so a transport-flavoured message is
/// reclassified here as `FailedToGetPools` to preserve the distinction
/// `spec` §4.7 draws between "no path found" and "couldn't reach the pool
/// data source".
fn classify_dryrun_failure(failure: &DryrunFailure) -> HaltReason {
    match failure.reason {
        DryrunFailureReason::NoWalletFund => HaltReason::NoWalletFund,
        DryrunFailureReason::NoOpportunity => HaltReason::NoOpportunity,
        DryrunFailureReason::NoRoute => {
            if failure.error_snapshot.message.contains("transport error") {
                HaltReason::FailedToGetPools
            } else {
                HaltReason::NoRoute
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            chain::{MockVaultBalanceReader, VaultBalanceError},
            submitter::MockTxSubmitter,
            testing::{single_bundle, take_order, OrderBuilder},
        },
        alloy_primitives::{Bytes, U256},
        clearer_model::PairStatus,
        clearer_oracle::{MockEthPriceSource, MockGasPriceSource, MockRouteFetcher, Route},
        clearer_simulator::MockSimulator,
    };

    fn config() -> ProcessorConfig {
        ProcessorConfig {
            arb_contract: Address(alloy_primitives::Address::with_last_byte(0xAB)),
            liquidity_providers: vec!["sushi".to_string()],
            gas_coverage_percentage: 0,
            max_ratio: false,
            hops: 3,
            retries: 1,
            timeout_ms: 5_000,
            use_private_submission: false,
        }
    }

    #[tokio::test]
    async fn empty_vault_short_circuits_before_any_rpc_call() {
        let order = OrderBuilder::new(1).build();
        let bundle = single_bundle(take_order(order, 0, U256::from(0u64).to::<u128>()));

        let mut vault_reader = MockVaultBalanceReader::new();
        vault_reader
            .expect_vault_balance()
            .returning(|_| Ok(TokenAmount::ZERO));

        let processor = PairProcessor::new(
            Arc::new(MockGasPriceSource::new()),
            Arc::new(MockEthPriceSource::new()),
            Arc::new(vault_reader),
            Arc::new(MockRouteFetcher::new()),
            Arc::new(MockSimulator::new()),
            Arc::new(MockTxSubmitter::new()),
        );

        let report = processor.process(&bundle, &config(), 100, None).await;

        assert_eq!(report.status, PairStatus::EmptyVault);
    }

    #[tokio::test]
    async fn failed_vault_balance_read_is_reported_without_halting_the_round() {
        let order = OrderBuilder::new(1).build();
        let bundle = single_bundle(take_order(order, 1_000, 1));

        let mut vault_reader = MockVaultBalanceReader::new();
        vault_reader
            .expect_vault_balance()
            .returning(|_| Err(VaultBalanceError::Transport("timeout".into())));

        let processor = PairProcessor::new(
            Arc::new(MockGasPriceSource::new()),
            Arc::new(MockEthPriceSource::new()),
            Arc::new(vault_reader),
            Arc::new(MockRouteFetcher::new()),
            Arc::new(MockSimulator::new()),
            Arc::new(MockTxSubmitter::new()),
        );

        let report = processor.process(&bundle, &config(), 100, None).await;

        assert_eq!(report.status, PairStatus::NoOpportunity);
        assert_eq!(report.halt_reason, Some(HaltReason::FailedToGetVaultBalance));
    }

    #[tokio::test]
    async fn happy_path_clears_and_reports_found_opportunity() {
        let order = OrderBuilder::new(1).build();
        let bundle = single_bundle(take_order(
            Arc::clone(&order),
            1_000_000_000_000_000_000,
            500_000_000_000_000_000,
        ));

        let mut vault_reader = MockVaultBalanceReader::new();
        vault_reader
            .expect_vault_balance()
            .returning(|bundle| Ok(bundle.vault_balance()));

        let mut gas_price_source = MockGasPriceSource::new();
        gas_price_source
            .expect_gas_price()
            .returning(|| Ok(GasPrice(U256::from(10_000_000_000u64))));

        let mut eth_price_source = MockEthPriceSource::new();
        eth_price_source
            .expect_eth_price()
            .returning(|_, _, _| Some(Fixed18(U256::from(10u64).pow(U256::from(18u64)))));

        let mut route_fetcher = MockRouteFetcher::new();
        route_fetcher.expect_best_route().returning(|_, _, amount_in, _| {
            Ok(Route {
                amount_out: TokenAmount(amount_in.0),
                route_code: Bytes::new(),
                visual: "direct".to_string(),
            })
        });

        let mut simulator = MockSimulator::new();
        simulator.expect_estimate_gas().returning(|_| Ok(clearer_eth::Gas(U256::from(100_000u64))));

        let mut submitter = MockTxSubmitter::new();
        submitter.expect_submit().returning(|_, _| {
            Ok(clearer_model::TxHash(alloy_primitives::B256::with_last_byte(1)))
        });
        submitter.expect_tx_url().returning(|_| "https://etherscan.io/tx/0x01".to_string());
        submitter.expect_wait_for_receipt().returning(|_, _| {
            Ok(clearer_model::MinedReceipt {
                status: true,
                effective_gas_price: GasPrice(U256::from(10_000_000_000u64)),
                gas_used: 100_000,
                cleared_amount: TokenAmount(U256::from(1_000_000_000_000_000_000u128)),
                income: TokenAmount(U256::from(1_000_000_000_000_000_000u128)),
                cleared_orders: vec![order.id],
            })
        });

        let processor = PairProcessor::new(
            Arc::new(gas_price_source),
            Arc::new(eth_price_source),
            Arc::new(vault_reader),
            Arc::new(route_fetcher),
            Arc::new(simulator),
            Arc::new(submitter),
        );

        let report = processor.process(&bundle, &config(), 100, None).await;

        assert_eq!(report.status, PairStatus::FoundOpportunity);
        assert!(report.halt_reason.is_none());
        assert!(report.tx_url.is_some());
        assert!(report.net_profit.unwrap() >= Fixed18::ZERO);
    }
}
