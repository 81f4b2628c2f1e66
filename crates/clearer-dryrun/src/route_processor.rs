use {
    alloy_primitives::U256,
    clearer_contracts::{
        build_take_orders_config, encode_arb3, encode_multicall, EvaluableV3, MinimumBountyTask,
    },
    clearer_eth::{scale18, scale18_to, Address, Fixed18, GasPrice, TokenAmount},
    clearer_model::{
        BundledPair, DryrunFailure, DryrunFailureReason, DryrunOutcome, DryrunResult, Mode, RawTx,
    },
    clearer_oracle::{RouteError, RouteFetcher},
    clearer_simulator::{RawTxRequest, Simulator, SimulationFailure},
    std::sync::Arc,
};

/// Per-round configuration a [`RouteProcessorDryrun`] needs that does not
/// change between hops of the binary search (`spec` §4.4).
pub struct RouteProcessorContext {
    pub arb_contract: Address,
    pub orderbook: Address,
    pub gas_price: GasPrice,
    /// Native token price expressed in buy-token units, 18-decimal
    /// (`spec` C2).
    pub eth_price: Option<Fixed18>,
    /// Percentage (integer, `>= 0`) of gas cost the bounty must cover
    /// (`spec` §6 `gasCoverage`).
    pub gas_coverage_percentage: u64,
    /// Skip the price ceiling and allow `maximumIORatio = MAX` (`spec` §6
    /// `maxRatio`).
    pub max_ratio: bool,
    pub liquidity_providers: Vec<String>,
    pub block_number: u64,
}

/// C4: builds a route-processor clearing calldata and probes feasibility at
/// a given input size (`spec` §4.4).
#[derive(Clone)]
pub struct RouteProcessorDryrun {
    route_fetcher: Arc<dyn RouteFetcher>,
    simulator: Arc<dyn Simulator>,
}

impl RouteProcessorDryrun {
    pub fn new(route_fetcher: Arc<dyn RouteFetcher>, simulator: Arc<dyn Simulator>) -> Self {
        Self {
            route_fetcher,
            simulator,
        }
    }

    /// Runs one dryrun at `max_input` sell-token units, for the given clear
    /// mode, optionally shrinking `bundle` to the profitable subset on the
    /// first hop of a bundle-mode run (`spec` §4.4 steps 1-8).
    #[allow(clippy::too_many_arguments)]
    pub async fn run(
        &self,
        bundle: &BundledPair,
        mode: Mode,
        max_input: TokenAmount,
        ctx: &RouteProcessorContext,
        is_first_hop: bool,
    ) -> (DryrunResult, Option<bool>) {
        let mut has_price_match = None;

        let route = match self
            .route_fetcher
            .best_route(
                bundle.sell_token,
                bundle.buy_token,
                max_input,
                &ctx.liquidity_providers,
            )
            .await
        {
            Ok(route) => route,
            Err(RouteError::NoWay) => {
                return (
                    Err(DryrunFailure::new(DryrunFailureReason::NoRoute, "no route")),
                    has_price_match,
                )
            }
            Err(RouteError::Transport(message)) => {
                return (
                    Err(DryrunFailure::new(DryrunFailureReason::NoRoute, message)),
                    has_price_match,
                )
            }
        };

        let max_input_18 = scale18(max_input, bundle.sell_decimals);
        let amount_out_18 = scale18(route.amount_out, bundle.buy_decimals);
        let market_price = match amount_out_18.checked_div(max_input_18) {
            Some(price) => price,
            None => {
                return (
                    Err(DryrunFailure::new(
                        DryrunFailureReason::NoOpportunity,
                        "zero input",
                    )),
                    has_price_match,
                )
            }
        };

        let best_ratio = bundle.take_orders()[0].quote.ratio;
        if market_price < best_ratio {
            has_price_match = Some(false);
            return (
                Err(DryrunFailure::new(
                    DryrunFailureReason::NoOpportunity,
                    "ratio greater than market price",
                )),
                has_price_match,
            );
        }
        has_price_match = Some(true);

        // `spec` §4.4 step 4: shrink the bundle to the profitable subset,
        // only on the first hop, only in bundle mode (mode != Bundle already
        // carries a single take-order, nothing to shrink).
        let filtered;
        let take_orders = if is_first_hop && matches!(mode, Mode::Bundle) {
            let headroom = match market_price.checked_mul_percent(102, 100) {
                Some(h) => h,
                None => {
                    return (
                        Err(DryrunFailure::new(DryrunFailureReason::NoOpportunity, "overflow")),
                        has_price_match,
                    )
                }
            };
            let kept: Vec<_> = bundle
                .take_orders()
                .iter()
                .filter(|to| to.quote.ratio <= headroom)
                .cloned()
                .collect();
            if kept.is_empty() {
                return (
                    Err(DryrunFailure::new(
                        DryrunFailureReason::NoOpportunity,
                        "no take-orders within 2% of market price",
                    )),
                    has_price_match,
                );
            }
            filtered = bundle.with_take_orders(kept);
            mode.expand(filtered.take_orders())
        } else {
            mode.expand(bundle.take_orders())
        };

        let maximum_io_ratio = if ctx.max_ratio { U256::MAX } else { scale18_to(market_price, 18).0 };
        let maximum_input_raw = scale18_to(max_input_18, bundle.sell_decimals).0;

        let take_orders_config = build_take_orders_config(
            &take_orders,
            U256::from(1u64),
            maximum_input_raw,
            maximum_io_ratio,
            route.route_code.clone(),
        );

        let zero_task = EvaluableV3 {
            interpreter: alloy_primitives::Address::ZERO,
            store: alloy_primitives::Address::ZERO,
            bytecode: MinimumBountyTask::zero(),
        };
        let data = encode_arb3(ctx.arb_contract, take_orders_config.clone(), zero_task);
        let calldata = encode_multicall(vec![data]);

        let tx_request = RawTxRequest {
            from: ctx.arb_contract,
            to: ctx.arb_contract,
            data: calldata,
            value: U256::ZERO,
        };

        let stage1_gas = match self.simulator.estimate_gas(&tx_request).await {
            Ok(gas) => gas,
            Err(SimulationFailure::InsufficientFundsForGas) => {
                return (
                    Err(DryrunFailure::new(
                        DryrunFailureReason::NoWalletFund,
                        "insufficient funds for gas",
                    )),
                    has_price_match,
                )
            }
            Err(SimulationFailure::NodeRevert { message, .. }) => {
                return (
                    Err(DryrunFailure::new(DryrunFailureReason::NoOpportunity, message)),
                    has_price_match,
                )
            }
            Err(SimulationFailure::Retryable(message)) => {
                return (
                    Err(DryrunFailure::new(DryrunFailureReason::NoOpportunity, message)),
                    has_price_match,
                )
            }
        };

        let gas_cost_wei = stage1_gas.0 * ctx.gas_price.0;
        let gas_cost_in_token = ctx
            .eth_price
            .map(|price| {
                let gas_cost_18 = scale18(TokenAmount(gas_cost_wei), 18)
                    .checked_mul(price)
                    .unwrap_or(Fixed18::ZERO);
                scale18_to(gas_cost_18, bundle.buy_decimals)
            })
            .unwrap_or(TokenAmount::ZERO);

        let (final_gas, final_task_bytecode) = if ctx.gas_coverage_percentage == 0 {
            (stage1_gas, MinimumBountyTask::zero())
        } else {
            let headroom_bounty = mul_div_u256(gas_cost_wei, ctx.gas_coverage_percentage * 103, 10_000);
            let headroom_task = EvaluableV3 {
                interpreter: alloy_primitives::Address::ZERO,
                store: alloy_primitives::Address::ZERO,
                bytecode: MinimumBountyTask::requiring_at_least(headroom_bounty),
            };
            let headroom_data = encode_arb3(ctx.arb_contract, take_orders_config.clone(), headroom_task);
            let headroom_calldata = encode_multicall(vec![headroom_data]);
            let stage2_request = RawTxRequest {
                data: headroom_calldata,
                ..tx_request.clone()
            };
            let stage2_gas = match self.simulator.estimate_gas(&stage2_request).await {
                Ok(gas) => gas,
                Err(SimulationFailure::InsufficientFundsForGas) => {
                    return (
                        Err(DryrunFailure::new(
                            DryrunFailureReason::NoWalletFund,
                            "insufficient funds for gas",
                        )),
                        has_price_match,
                    )
                }
                Err(SimulationFailure::NodeRevert { message, .. })
                | Err(SimulationFailure::Retryable(message)) => {
                    return (
                        Err(DryrunFailure::new(DryrunFailureReason::NoOpportunity, message)),
                        has_price_match,
                    )
                }
            };

            let exact_bounty = mul_div_u256(gas_cost_wei, ctx.gas_coverage_percentage, 100);
            let exact_bytecode = MinimumBountyTask::requiring_at_least(exact_bounty);
            (stage2_gas, exact_bytecode)
        };

        let final_task = EvaluableV3 {
            interpreter: alloy_primitives::Address::ZERO,
            store: alloy_primitives::Address::ZERO,
            bytecode: final_task_bytecode,
        };
        let final_data = encode_arb3(ctx.arb_contract, take_orders_config, final_task);
        let final_calldata = encode_multicall(vec![final_data]);

        // Income minus gas cost, both expressed 18-decimal in the buy token
        // (`spec` §4.7 defines the same subtraction for the mined receipt;
        // the dryrun estimates it ahead of submission).
        let gas_cost_18 = scale18(gas_cost_in_token, bundle.buy_decimals);
        let estimated_profit = amount_out_18.saturating_sub(gas_cost_18);

        let outcome = DryrunOutcome {
            raw_tx: RawTx {
                to: ctx.arb_contract,
                data: final_calldata,
                value: TokenAmount::ZERO,
                gas: Some(final_gas),
            },
            max_input,
            price: market_price,
            route_visual: route.visual,
            gas_cost_in_token,
            estimated_profit,
            opp_block_number: ctx.block_number,
        };

        (Ok(outcome), has_price_match)
    }
}

fn mul_div_u256(value: U256, numerator: u64, denominator: u64) -> U256 {
    value.saturating_mul(U256::from(numerator)) / U256::from(denominator)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy_primitives::{Bytes as AlloyBytes, B256},
        clearer_eth::Gas,
        clearer_model::{Order, OrderId, OrderIo, TakeOrder, Quote},
        clearer_oracle::MockRouteFetcher,
        clearer_simulator::MockSimulator,
    };

    fn token(byte: u8) -> Address {
        Address(alloy_primitives::Address::with_last_byte(byte))
    }

    fn take_order(id: u8, ratio_18: u128) -> TakeOrder {
        let order = Arc::new(Order {
            id: OrderId(B256::with_last_byte(id)),
            owner: Address(alloy_primitives::Address::with_last_byte(id)),
            orderbook: token(0xFF),
            inputs: vec![OrderIo {
                token: token(0x10),
                decimals: 18,
                vault_id: U256::from(1u64),
            }],
            outputs: vec![OrderIo {
                token: token(0x20),
                decimals: 18,
                vault_id: U256::from(1u64),
            }],
            evaluable: AlloyBytes::new(),
        });
        TakeOrder {
            order,
            input_io_index: 0,
            output_io_index: 0,
            quote: Quote {
                max_output: TokenAmount(U256::from(1_000u64)),
                ratio: Fixed18(U256::from(ratio_18)),
            },
        }
    }

    fn bundle(take_orders: Vec<TakeOrder>) -> BundledPair {
        BundledPair::new(
            token(0xFF),
            token(0x10),
            18,
            "SELL".to_string(),
            token(0x20),
            18,
            "BUY".to_string(),
            take_orders,
        )
        .unwrap()
    }

    fn ctx(liquidity_providers: Vec<String>) -> RouteProcessorContext {
        RouteProcessorContext {
            arb_contract: token(0xAB),
            orderbook: token(0xFF),
            gas_price: GasPrice(U256::from(1u64)),
            eth_price: None,
            gas_coverage_percentage: 0,
            max_ratio: false,
            liquidity_providers,
            block_number: 100,
        }
    }

    fn route_at_price(amount_in: TokenAmount, price_18: u128) -> clearer_oracle::Route {
        let amount_out = Fixed18(U256::from(price_18))
            .checked_mul(scale18(amount_in, 18))
            .unwrap();
        clearer_oracle::Route {
            amount_out: scale18_to(amount_out, 18),
            route_code: AlloyBytes::from(vec![0xAA]),
            visual: "direct".to_string(),
        }
    }

    /// spec §8 property 1: `marketPrice < bestRatio` never submits anything.
    #[tokio::test]
    async fn ratio_above_market_price_is_rejected_without_simulating() {
        let to = take_order(1, Fixed18::ONE.0.to::<u128>());
        let b = bundle(vec![to]);

        let mut fetcher = MockRouteFetcher::new();
        fetcher
            .expect_best_route()
            .returning(|_, _, amount_in, _| Ok(route_at_price(amount_in, 500_000_000_000_000_000)));

        let simulator = MockSimulator::new();
        let dryrun = RouteProcessorDryrun::new(Arc::new(fetcher), Arc::new(simulator));

        let (result, has_price_match) = dryrun
            .run(&b, Mode::Bundle, TokenAmount(U256::from(100u64)), &ctx(vec![]), true)
            .await;

        assert!(result.is_err());
        assert_eq!(has_price_match, Some(false));
    }

    /// spec §4.4 step 1: no route available is reported as `NoRoute`.
    #[tokio::test]
    async fn no_route_is_reported_without_a_price_match_verdict() {
        let to = take_order(1, Fixed18::ONE.0.to::<u128>());
        let b = bundle(vec![to]);

        let mut fetcher = MockRouteFetcher::new();
        fetcher
            .expect_best_route()
            .returning(|_, _, _, _| Err(clearer_oracle::RouteError::NoWay));

        let simulator = MockSimulator::new();
        let dryrun = RouteProcessorDryrun::new(Arc::new(fetcher), Arc::new(simulator));

        let (result, has_price_match) = dryrun
            .run(&b, Mode::Bundle, TokenAmount(U256::from(100u64)), &ctx(vec![]), true)
            .await;

        assert!(matches!(
            result.unwrap_err().reason,
            DryrunFailureReason::NoRoute
        ));
        assert_eq!(has_price_match, None);
    }

    /// spec §4.4 step 4: on the first hop of a bundle-mode run, only
    /// take-orders within 2% of market price survive into the calldata.
    #[tokio::test]
    async fn first_hop_bundle_mode_drops_take_orders_outside_the_two_percent_headroom() {
        let within = take_order(1, 990_000_000_000_000_000); // 0.99, within 2% of 1.0
        let outside = take_order(2, 800_000_000_000_000_000); // 0.80, well outside
        let b = bundle(vec![within, outside]);

        let mut fetcher = MockRouteFetcher::new();
        fetcher
            .expect_best_route()
            .returning(|_, _, amount_in, _| Ok(route_at_price(amount_in, 1_000_000_000_000_000_000)));

        let mut simulator = MockSimulator::new();
        simulator
            .expect_estimate_gas()
            .returning(|_| Ok(Gas(U256::from(21_000u64))));
        let dryrun = RouteProcessorDryrun::new(Arc::new(fetcher), Arc::new(simulator));

        let (result, has_price_match) = dryrun
            .run(&b, Mode::Bundle, TokenAmount(U256::from(100u64)), &ctx(vec![]), true)
            .await;

        assert_eq!(has_price_match, Some(true));
        let outcome = result.unwrap();
        assert!(outcome.estimated_profit >= Fixed18::ZERO);
    }

    /// The same 2% filter is skipped past the first hop: a later hop must
    /// not re-shrink the bundle even if an order has since drifted outside
    /// the headroom (`spec` §4.4 step 4, "only on the first hop").
    #[tokio::test]
    async fn later_hops_do_not_reapply_the_first_hop_filter() {
        let within = take_order(1, 990_000_000_000_000_000);
        let outside = take_order(2, 800_000_000_000_000_000);
        let b = bundle(vec![within, outside]);

        let mut fetcher = MockRouteFetcher::new();
        fetcher
            .expect_best_route()
            .returning(|_, _, amount_in, _| Ok(route_at_price(amount_in, 1_000_000_000_000_000_000)));

        let mut simulator = MockSimulator::new();
        simulator
            .expect_estimate_gas()
            .returning(|_| Ok(Gas(U256::from(21_000u64))));
        let dryrun = RouteProcessorDryrun::new(Arc::new(fetcher), Arc::new(simulator));

        let (result, has_price_match) = dryrun
            .run(&b, Mode::Bundle, TokenAmount(U256::from(100u64)), &ctx(vec![]), false)
            .await;

        assert_eq!(has_price_match, Some(true));
        assert!(result.is_ok());
    }
}

/// Binds a [`RouteProcessorDryrun`] to one bundle/mode/context so the
/// binary-search sizer (C6) can drive it without knowing it is talking to a
/// route processor rather than the intra-orderbook path.
#[derive(Clone)]
pub struct RouteProcessorSizable {
    dryrun: RouteProcessorDryrun,
    bundle: Arc<BundledPair>,
    mode: Mode,
    ctx: Arc<RouteProcessorContext>,
}

impl RouteProcessorSizable {
    pub fn new(
        dryrun: RouteProcessorDryrun,
        bundle: Arc<BundledPair>,
        mode: Mode,
        ctx: Arc<RouteProcessorContext>,
    ) -> Self {
        Self {
            dryrun,
            bundle,
            mode,
            ctx,
        }
    }
}

#[async_trait::async_trait]
impl crate::SizableDryrun for RouteProcessorSizable {
    async fn run(
        &self,
        max_input: TokenAmount,
        is_first_hop: bool,
    ) -> (DryrunResult, Option<bool>) {
        self.dryrun
            .run(&self.bundle, self.mode, max_input, &self.ctx, is_first_hop)
            .await
    }
}
