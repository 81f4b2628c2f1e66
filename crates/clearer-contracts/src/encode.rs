use {
    crate::abi::{
        arb3Call, balanceOfCall, clear2Call, multicallCall, withdraw2Call, ClearConfig,
        EvaluableV3, IoV3, OrderV3, TakeOrderConfigV3, TakeOrdersConfigV3,
    },
    alloy_primitives::{Bytes, U256},
    alloy_sol_types::SolCall,
    clearer_eth::Address,
    clearer_model::{Order, TakeOrder},
};

/// Vault id `"1"` reserved for bounty accounting (`spec` §4.5 step 1).
pub const BOUNTY_VAULT_ID: u64 = 1;

fn io_to_sol(io: &clearer_model::OrderIo) -> IoV3 {
    IoV3 {
        token: io.token.0,
        decimals: io.decimals,
        vaultId: io.vault_id,
    }
}

/// The real interpreter/store addresses travel inside `Order.evaluable`
/// upstream of this crate; `OrderV3` only needs the bytecode payload to
/// build calldata, so the address slots are zeroed here.
const PLACEHOLDER_EVALUABLE_ADDRESS: alloy_primitives::Address = alloy_primitives::Address::ZERO;

pub fn order_to_sol(order: &Order) -> OrderV3 {
    OrderV3 {
        owner: order.owner.0,
        evaluable: EvaluableV3 {
            interpreter: PLACEHOLDER_EVALUABLE_ADDRESS,
            store: PLACEHOLDER_EVALUABLE_ADDRESS,
            bytecode: order.evaluable.clone(),
        },
        validInputs: order.inputs.iter().map(io_to_sol).collect(),
        validOutputs: order.outputs.iter().map(io_to_sol).collect(),
        nonce: order.id.0,
    }
}

fn take_order_to_sol(to: &TakeOrder) -> TakeOrderConfigV3 {
    TakeOrderConfigV3 {
        order: order_to_sol(&to.order),
        inputIOIndex: U256::from(to.input_io_index as u64),
        outputIOIndex: U256::from(to.output_io_index as u64),
        signedContext: vec![],
    }
}

/// Builds the `takeOrdersConfig` argument to `arb3` (`spec` §4.4 step 5).
pub fn build_take_orders_config(
    take_orders: &[TakeOrder],
    minimum_input: U256,
    maximum_input: U256,
    maximum_io_ratio: U256,
    route_data: Bytes,
) -> TakeOrdersConfigV3 {
    TakeOrdersConfigV3 {
        minimumInput: minimum_input,
        maximumInput: maximum_input,
        maximumIORatio: maximum_io_ratio,
        orders: take_orders.iter().map(take_order_to_sol).collect(),
        data: route_data,
    }
}

pub fn encode_arb3(orderbook: Address, take_orders_config: TakeOrdersConfigV3, task: EvaluableV3) -> Bytes {
    arb3Call {
        orderbook: orderbook.0,
        takeOrdersConfig: take_orders_config,
        task,
    }
    .abi_encode()
    .into()
}

pub fn encode_multicall(calls: Vec<Bytes>) -> Bytes {
    multicallCall { data: calls }.abi_encode().into()
}

#[allow(clippy::too_many_arguments)]
pub fn encode_clear2(
    alice: &Order,
    alice_input_io_index: usize,
    alice_output_io_index: usize,
    bob: &Order,
    bob_input_io_index: usize,
    bob_output_io_index: usize,
) -> Bytes {
    clear2Call {
        aliceOrder: order_to_sol(alice),
        bobOrder: order_to_sol(bob),
        clearConfig: ClearConfig {
            aliceInputIOIndex: U256::from(alice_input_io_index as u64),
            aliceOutputIOIndex: U256::from(alice_output_io_index as u64),
            bobInputIOIndex: U256::from(bob_input_io_index as u64),
            bobOutputIOIndex: U256::from(bob_output_io_index as u64),
            aliceBountyVaultId: U256::from(BOUNTY_VAULT_ID),
            bobBountyVaultId: U256::from(BOUNTY_VAULT_ID),
        },
        aliceSignedContext: vec![],
        bobSignedContext: vec![],
    }
    .abi_encode()
    .into()
}

pub fn encode_withdraw2(token: Address, vault_id: U256, amount: U256, tasks: Vec<EvaluableV3>) -> Bytes {
    withdraw2Call {
        token: token.0,
        vaultId: vault_id,
        amount,
        tasks,
    }
    .abi_encode()
    .into()
}

pub fn encode_balance_of(account: Address) -> Bytes {
    balanceOfCall { account: account.0 }.abi_encode().into()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::abi::{arb3Call, balanceOfCall, multicallCall},
        alloy_primitives::{Bytes as AlloyBytes, B256},
        clearer_model::{Order, OrderIo},
    };

    fn order(id: u8) -> Order {
        Order {
            id: clearer_model::OrderId(B256::with_last_byte(id)),
            owner: Address(alloy_primitives::Address::with_last_byte(id)),
            orderbook: Address(alloy_primitives::Address::with_last_byte(0xFF)),
            inputs: vec![OrderIo {
                token: Address(alloy_primitives::Address::with_last_byte(0x10)),
                decimals: 18,
                vault_id: U256::from(1u64),
            }],
            outputs: vec![OrderIo {
                token: Address(alloy_primitives::Address::with_last_byte(0x20)),
                decimals: 6,
                vault_id: U256::from(2u64),
            }],
            evaluable: AlloyBytes::from(vec![0xAB, 0xCD]),
        }
    }

    #[test]
    fn balance_of_roundtrips_through_abi_decode() {
        let account = Address(alloy_primitives::Address::with_last_byte(0x42));
        let encoded = encode_balance_of(account);

        let decoded = balanceOfCall::abi_decode(&encoded).unwrap();

        assert_eq!(decoded.account, account.0);
    }

    #[test]
    fn order_to_sol_carries_decimals_and_vault_ids_through_unchanged() {
        let order = order(7);
        let sol = order_to_sol(&order);

        assert_eq!(sol.validInputs[0].decimals, 18);
        assert_eq!(sol.validInputs[0].vaultId, U256::from(1u64));
        assert_eq!(sol.validOutputs[0].decimals, 6);
        assert_eq!(sol.validOutputs[0].vaultId, U256::from(2u64));
        assert_eq!(sol.nonce, order.id.0);
    }

    fn take_order(order: &Order) -> clearer_model::TakeOrder {
        clearer_model::TakeOrder {
            order: std::sync::Arc::new(order.clone()),
            input_io_index: 0,
            output_io_index: 0,
            quote: clearer_model::Quote {
                max_output: clearer_eth::TokenAmount(U256::from(1_000u64)),
                ratio: clearer_eth::Fixed18(U256::from(1u64)),
            },
        }
    }

    #[test]
    fn arb3_calldata_roundtrips_with_the_take_orders_config_intact() {
        let order = order(1);
        let take_orders = vec![take_order(&order)];
        let config = build_take_orders_config(
            &take_orders,
            U256::from(1u64),
            U256::from(1_000u64),
            U256::from(2u64).pow(U256::from(18u64)),
            AlloyBytes::from(vec![1, 2, 3]),
        );
        let task = EvaluableV3 {
            interpreter: alloy_primitives::Address::ZERO,
            store: alloy_primitives::Address::ZERO,
            bytecode: MinimumBountyTask::zero(),
        };
        let orderbook = Address(alloy_primitives::Address::with_last_byte(0x99));

        let encoded = encode_arb3(orderbook, config, task);
        let multicall = encode_multicall(vec![encoded.clone()]);

        let decoded_call = arb3Call::abi_decode(&encoded).unwrap();
        assert_eq!(decoded_call.orderbook, orderbook.0);
        assert_eq!(decoded_call.takeOrdersConfig.maximumInput, U256::from(1_000u64));

        let decoded_multicall = multicallCall::abi_decode(&multicall).unwrap();
        assert_eq!(decoded_multicall.data.len(), 1);
        assert_eq!(decoded_multicall.data[0], encoded);
    }
}
