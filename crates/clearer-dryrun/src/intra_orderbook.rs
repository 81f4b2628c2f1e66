use {
    alloy_primitives::U256,
    clearer_contracts::{
        encode_clear2, encode_multicall, encode_withdraw2, EvaluableV3, MinimumBountyTask,
        BOUNTY_VAULT_ID,
    },
    clearer_eth::{scale18, scale18_to, Address, Fixed18, GasPrice, TokenAmount},
    clearer_model::{
        DryrunFailure, DryrunFailureReason, DryrunOutcome, DryrunResult, Order, RawTx, TakeOrder,
    },
    clearer_simulator::{RawTxRequest, Simulator, SimulationFailure},
    std::sync::Arc,
};

/// A candidate opposing order ("Bob") considered against a Alice's
/// [`TakeOrder`] (`spec` §4.5).
#[derive(Clone)]
pub struct Opposing {
    pub order: Arc<Order>,
    pub input_io_index: usize,
    pub output_io_index: usize,
    pub ratio: Fixed18,
}

pub struct IntraOrderbookContext {
    pub orderbook: Address,
    pub gas_price: GasPrice,
    pub eth_price: Option<Fixed18>,
    pub gas_coverage_percentage: u64,
    pub block_number: u64,
}

/// C5: clears one order directly against an opposing order on the same
/// orderbook, skimming the price overlap (`spec` §4.5).
#[derive(Clone)]
pub struct IntraOrderbookDryrun {
    simulator: Arc<dyn Simulator>,
}

impl IntraOrderbookDryrun {
    pub fn new(simulator: Arc<dyn Simulator>) -> Self {
        Self { simulator }
    }

    /// Returns `None` without simulating when the precondition in `spec`
    /// §4.5/§8 property 4 fails: `opposing.id != alice.id`,
    /// `opposing.owner != alice.owner`, and `opposing.ratio * alice.ratio <
    /// 1e18` (an actual price overlap).
    pub fn admits(alice: &TakeOrder, opposing: &Opposing) -> bool {
        if opposing.order.id == alice.order.id || opposing.order.owner == alice.order.owner {
            return false;
        }
        match opposing.ratio.checked_mul(alice.quote.ratio) {
            Some(product) => product < Fixed18::ONE,
            None => false,
        }
    }

    pub async fn run(
        &self,
        alice: &TakeOrder,
        opposing: &Opposing,
        ctx: &IntraOrderbookContext,
    ) -> DryrunResult {
        if !Self::admits(alice, opposing) {
            return Err(DryrunFailure::new(
                DryrunFailureReason::NoOpportunity,
                "no price overlap with opposing order",
            ));
        }

        let clear_data = encode_clear2(
            &alice.order,
            alice.input_io_index,
            alice.output_io_index,
            &opposing.order,
            opposing.input_io_index,
            opposing.output_io_index,
        );

        let buy_token = alice.output_io().token;
        let sell_token = alice.input_io().token;

        let withdraw_buy = encode_withdraw2(buy_token, U256::from(BOUNTY_VAULT_ID), U256::MAX, vec![]);

        let zero_task = EvaluableV3 {
            interpreter: alloy_primitives::Address::ZERO,
            store: alloy_primitives::Address::ZERO,
            bytecode: MinimumBountyTask::zero(),
        };
        let withdraw_sell_stage1 = encode_withdraw2(
            sell_token,
            U256::from(BOUNTY_VAULT_ID),
            U256::MAX,
            vec![zero_task],
        );
        let calldata_stage1 = encode_multicall(vec![
            clear_data.clone(),
            withdraw_buy.clone(),
            withdraw_sell_stage1,
        ]);

        let tx_request = RawTxRequest {
            from: ctx.orderbook,
            to: ctx.orderbook,
            data: calldata_stage1,
            value: U256::ZERO,
        };

        let stage1_gas = match self.simulator.estimate_gas(&tx_request).await {
            Ok(gas) => gas,
            Err(SimulationFailure::InsufficientFundsForGas) => {
                return Err(DryrunFailure::new(
                    DryrunFailureReason::NoWalletFund,
                    "insufficient funds for gas",
                ))
            }
            Err(SimulationFailure::NodeRevert { message, .. })
            | Err(SimulationFailure::Retryable(message)) => {
                return Err(DryrunFailure::new(DryrunFailureReason::NoOpportunity, message))
            }
        };

        let gas_cost_wei = stage1_gas.0 * ctx.gas_price.0;
        let buy_decimals = alice.output_io().decimals;
        let gas_cost_in_token = ctx
            .eth_price
            .map(|price| {
                let gas_cost_18 = scale18(TokenAmount(gas_cost_wei), 18)
                    .checked_mul(price)
                    .unwrap_or(Fixed18::ZERO);
                scale18_to(gas_cost_18, buy_decimals)
            })
            .unwrap_or(TokenAmount::ZERO);

        let (final_gas, withdraw_sell_task_bytecode) = if ctx.gas_coverage_percentage == 0 {
            (stage1_gas, MinimumBountyTask::zero())
        } else {
            let headroom_bounty = gas_cost_wei.saturating_mul(U256::from(ctx.gas_coverage_percentage))
                .saturating_mul(U256::from(103u64))
                / U256::from(10_000u64);
            let headroom_task = EvaluableV3 {
                interpreter: alloy_primitives::Address::ZERO,
                store: alloy_primitives::Address::ZERO,
                bytecode: MinimumBountyTask::requiring_at_least(headroom_bounty),
            };
            let withdraw_sell_headroom =
                encode_withdraw2(sell_token, U256::from(BOUNTY_VAULT_ID), U256::MAX, vec![headroom_task]);
            let calldata_stage2 =
                encode_multicall(vec![clear_data.clone(), withdraw_buy.clone(), withdraw_sell_headroom]);
            let stage2_request = RawTxRequest {
                data: calldata_stage2,
                ..tx_request.clone()
            };
            let stage2_gas = match self.simulator.estimate_gas(&stage2_request).await {
                Ok(gas) => gas,
                Err(SimulationFailure::InsufficientFundsForGas) => {
                    return Err(DryrunFailure::new(
                        DryrunFailureReason::NoWalletFund,
                        "insufficient funds for gas",
                    ))
                }
                Err(SimulationFailure::NodeRevert { message, .. })
                | Err(SimulationFailure::Retryable(message)) => {
                    return Err(DryrunFailure::new(DryrunFailureReason::NoOpportunity, message))
                }
            };

            let exact_bounty =
                gas_cost_wei.saturating_mul(U256::from(ctx.gas_coverage_percentage)) / U256::from(100u64);
            (stage2_gas, MinimumBountyTask::requiring_at_least(exact_bounty))
        };

        let final_task = EvaluableV3 {
            interpreter: alloy_primitives::Address::ZERO,
            store: alloy_primitives::Address::ZERO,
            bytecode: withdraw_sell_task_bytecode,
        };
        let withdraw_sell_final =
            encode_withdraw2(sell_token, U256::from(BOUNTY_VAULT_ID), U256::MAX, vec![final_task]);
        let final_calldata = encode_multicall(vec![clear_data, withdraw_buy, withdraw_sell_final]);

        Ok(DryrunOutcome {
            raw_tx: RawTx {
                to: ctx.orderbook,
                data: final_calldata,
                value: TokenAmount::ZERO,
                gas: Some(final_gas),
            },
            max_input: alice.vault_balance(),
            price: alice.quote.ratio,
            route_visual: "intra-orderbook".to_string(),
            gas_cost_in_token,
            estimated_profit: Fixed18::ZERO,
            opp_block_number: ctx.block_number,
        })
    }
}

/// Binds an [`IntraOrderbookDryrun`] to one alice/opposing pair and context so
/// the binary-search sizer (C6) can drive it through the same [`SizableDryrun`]
/// facade as the route processor, even though intra-orderbook clearing does
/// not vary with `max_input` (`spec` §4.5 has no sizing loop of its own; the
/// opportunity either exists at the alice order's full vault balance or it
/// doesn't, so every hop resolves on the first iteration).
#[derive(Clone)]
pub struct IntraOrderbookSizable {
    dryrun: IntraOrderbookDryrun,
    alice: TakeOrder,
    opposing: Opposing,
    ctx: Arc<IntraOrderbookContext>,
}

impl IntraOrderbookSizable {
    pub fn new(
        dryrun: IntraOrderbookDryrun,
        alice: TakeOrder,
        opposing: Opposing,
        ctx: Arc<IntraOrderbookContext>,
    ) -> Self {
        Self {
            dryrun,
            alice,
            opposing,
            ctx,
        }
    }
}

#[async_trait::async_trait]
impl crate::SizableDryrun for IntraOrderbookSizable {
    async fn run(
        &self,
        _max_input: TokenAmount,
        _is_first_hop: bool,
    ) -> (DryrunResult, Option<bool>) {
        let result = self.dryrun.run(&self.alice, &self.opposing, &self.ctx).await;
        (result, None)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy_primitives::{Bytes, B256, U256},
        clearer_eth::Fixed18,
        clearer_model::{OrderId, OrderIo, Quote},
    };

    fn order(id: u8, owner: u8, token: Address) -> Arc<Order> {
        Arc::new(Order {
            id: OrderId(B256::with_last_byte(id)),
            owner: Address(alloy_primitives::Address::with_last_byte(owner)),
            orderbook: Address(alloy_primitives::Address::with_last_byte(0xFF)),
            inputs: vec![OrderIo {
                token,
                decimals: 18,
                vault_id: U256::from(1u64),
            }],
            outputs: vec![OrderIo {
                token,
                decimals: 18,
                vault_id: U256::from(1u64),
            }],
            evaluable: Bytes::new(),
        })
    }

    fn alice(ratio_18: u128) -> TakeOrder {
        TakeOrder {
            order: order(1, 0xA1, Address(alloy_primitives::Address::with_last_byte(0x10))),
            input_io_index: 0,
            output_io_index: 0,
            quote: Quote {
                max_output: TokenAmount(U256::from(1_000u64)),
                ratio: Fixed18(U256::from(ratio_18)),
            },
        }
    }

    fn opposing(id: u8, owner: u8, ratio_18: u128) -> Opposing {
        Opposing {
            order: order(id, owner, Address(alloy_primitives::Address::with_last_byte(0x20))),
            input_io_index: 0,
            output_io_index: 0,
            ratio: Fixed18(U256::from(ratio_18)),
        }
    }

    const HALF: u128 = 500_000_000_000_000_000;

    #[test]
    fn price_overlap_is_admitted() {
        // spec §8 property 4 (the admitting half): product < 1e18.
        let a = alice(HALF);
        let b = opposing(2, 0xB2, HALF);

        assert!(IntraOrderbookDryrun::admits(&a, &b));
    }

    #[test]
    fn no_price_overlap_is_rejected_without_simulation() {
        // spec §8 property 4: alice.ratio * bob.ratio >= 1e18 is rejected.
        // alice is 0.5e18; an opposing ratio of 2e18 makes the product
        // exactly 1e18, which is not a price overlap.
        let a = alice(HALF);
        let b = opposing(2, 0xB2, 2 * Fixed18::ONE.0.to::<u128>());

        assert!(!IntraOrderbookDryrun::admits(&a, &b));
    }

    #[test]
    fn same_order_id_is_rejected() {
        let a = alice(HALF);
        // Same `id` (byte `1`) as `a.order`, different owner.
        let b = opposing(1, 0xB2, HALF);

        assert!(!IntraOrderbookDryrun::admits(&a, &b));
    }

    #[test]
    fn same_owner_is_rejected() {
        let a = alice(HALF);
        // `alice()` always builds its order with owner byte `0xA1`.
        let b = opposing(2, 0xA1, HALF);

        assert!(!IntraOrderbookDryrun::admits(&a, &b));
    }
}
