//! Builder fixtures for orders, take-orders, and bundled pairs, available to
//! every crate's test suite under `test-util` (mirrors the teacher's
//! `testlib` role: shared, reusable fixtures rather than ad hoc structs
//! copy-pasted into every test module).

use {
    alloy_primitives::{Bytes, B256, U256},
    clearer_eth::{Address, Fixed18, TokenAmount},
    clearer_model::{BundledPair, Order, OrderId, OrderIo, Quote, TakeOrder},
    std::sync::Arc,
};

/// Builds an [`Order`] with one input and one output, defaulting to 18
/// decimals on both sides and a distinct address per `seed` byte.
pub struct OrderBuilder {
    seed: u8,
    orderbook: Address,
    sell_token: Address,
    sell_decimals: u8,
    buy_token: Address,
    buy_decimals: u8,
}

impl OrderBuilder {
    pub fn new(seed: u8) -> Self {
        Self {
            seed,
            orderbook: Address(alloy_primitives::Address::with_last_byte(0xFF)),
            sell_token: Address(alloy_primitives::Address::with_last_byte(0xA0)),
            sell_decimals: 18,
            buy_token: Address(alloy_primitives::Address::with_last_byte(0xB0)),
            buy_decimals: 18,
        }
    }

    pub fn orderbook(mut self, orderbook: Address) -> Self {
        self.orderbook = orderbook;
        self
    }

    pub fn sell(mut self, token: Address, decimals: u8) -> Self {
        self.sell_token = token;
        self.sell_decimals = decimals;
        self
    }

    pub fn buy(mut self, token: Address, decimals: u8) -> Self {
        self.buy_token = token;
        self.buy_decimals = decimals;
        self
    }

    pub fn build(self) -> Arc<Order> {
        Arc::new(Order {
            id: OrderId(B256::with_last_byte(self.seed)),
            owner: Address(alloy_primitives::Address::with_last_byte(self.seed)),
            orderbook: self.orderbook,
            inputs: vec![OrderIo {
                token: self.sell_token,
                decimals: self.sell_decimals,
                vault_id: U256::from(1u64),
            }],
            outputs: vec![OrderIo {
                token: self.buy_token,
                decimals: self.buy_decimals,
                vault_id: U256::from(1u64),
            }],
            evaluable: Bytes::new(),
        })
    }
}

/// Wraps an [`Order`] built by [`OrderBuilder`] into a [`TakeOrder`] with the
/// given vault balance and ratio.
pub fn take_order(order: Arc<Order>, max_output: u128, ratio_18: u128) -> TakeOrder {
    TakeOrder {
        order,
        input_io_index: 0,
        output_io_index: 0,
        quote: Quote {
            max_output: TokenAmount(U256::from(max_output)),
            ratio: Fixed18(U256::from(ratio_18)),
        },
    }
}

/// Bundles a single take-order into a one-element [`BundledPair`], the
/// shape most sizer/dryrun tests need.
pub fn single_bundle(take_order: TakeOrder) -> BundledPair {
    let orderbook = take_order.order.orderbook;
    let sell = take_order.input_io().clone();
    let buy = take_order.output_io().clone();
    BundledPair::new(
        orderbook,
        sell.token,
        sell.decimals,
        "SELL".to_string(),
        buy.token,
        buy.decimals,
        "BUY".to_string(),
        vec![take_order],
    )
    .expect("non-empty take_orders")
}
