use {crate::order::TakeOrder, clearer_eth::Address};

/// A set of [`TakeOrder`]s that all share `(orderbook, sellToken, buyToken)`
/// (`spec` §3, "Bundled Pair"). Constructing one enforces the non-empty
/// invariant a [`BundledPair`] must uphold for the rest of the pipeline.
#[derive(Debug, Clone)]
pub struct BundledPair {
    pub orderbook: Address,
    pub sell_token: Address,
    pub sell_decimals: u8,
    pub sell_symbol: String,
    pub buy_token: Address,
    pub buy_decimals: u8,
    pub buy_symbol: String,
    take_orders: Vec<TakeOrder>,
}

impl BundledPair {
    /// Returns `None` if `take_orders` is empty; every emitted `BP` must
    /// have at least one take-order (`spec` §4.1 guarantee).
    pub fn new(
        orderbook: Address,
        sell_token: Address,
        sell_decimals: u8,
        sell_symbol: String,
        buy_token: Address,
        buy_decimals: u8,
        buy_symbol: String,
        take_orders: Vec<TakeOrder>,
    ) -> Option<Self> {
        if take_orders.is_empty() {
            return None;
        }
        Some(Self {
            orderbook,
            sell_token,
            sell_decimals,
            sell_symbol,
            buy_token,
            buy_decimals,
            buy_symbol,
            take_orders,
        })
    }

    pub fn take_orders(&self) -> &[TakeOrder] {
        &self.take_orders
    }

    /// Total vault balance available to clear against, the sum of every
    /// take-order's current max output.
    pub fn vault_balance(&self) -> clearer_eth::TokenAmount {
        self.take_orders
            .iter()
            .fold(clearer_eth::TokenAmount::ZERO, |acc, to| {
                acc + to.vault_balance()
            })
    }

    /// Returns a clone of this bundle with `take_orders` replaced. Used by
    /// the first hop of a bundle-mode dryrun to apply the 2% price filter
    /// (`spec` §4.4.4, §9 "make the first hop return a filtered-clone") —
    /// the original `BundledPair` an outer retry owns is never mutated.
    pub fn with_take_orders(&self, take_orders: Vec<TakeOrder>) -> Self {
        Self {
            take_orders,
            ..self.clone()
        }
    }
}

/// How a dryrun expands `BP.takeOrders` into the `orders` array of the
/// clearing calldata (`spec` §4.4 step 5). Replaces the source's `mode`
/// integer (0..3) with an explicit tagged variant (`spec` §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// mode 0: every take-order in the bundle.
    Bundle,
    /// mode 1: `[TO0]`.
    Single,
    /// mode 2: `[TO0, TO0]`.
    Double,
    /// mode 3: `[TO0, TO0, TO0]`, an intentional duplication amplifier that
    /// lets the contract aggregate dust (`spec` §4.4 step 5).
    Triple,
}

impl Mode {
    pub const RETRY_MODES: [Mode; 3] = [Mode::Single, Mode::Double, Mode::Triple];

    pub fn expand(self, take_orders: &[TakeOrder]) -> Vec<TakeOrder> {
        match self {
            Mode::Bundle => take_orders.to_vec(),
            Mode::Single => take_orders.first().cloned().into_iter().collect(),
            Mode::Double => take_orders
                .first()
                .cloned()
                .into_iter()
                .flat_map(|to| [to.clone(), to])
                .collect(),
            Mode::Triple => take_orders
                .first()
                .cloned()
                .into_iter()
                .flat_map(|to| [to.clone(), to.clone(), to])
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy_primitives::{Bytes, B256, U256},
        clearer_eth::{Address, Fixed18, TokenAmount},
        crate::{OrderId, OrderIo, Quote},
        std::sync::Arc,
    };

    fn take_orders() -> Vec<TakeOrder> {
        let order = Arc::new(crate::Order {
            id: OrderId(B256::with_last_byte(1)),
            owner: Address(alloy_primitives::Address::with_last_byte(1)),
            orderbook: Address(alloy_primitives::Address::with_last_byte(0xFF)),
            inputs: vec![OrderIo {
                token: Address(alloy_primitives::Address::with_last_byte(0x10)),
                decimals: 18,
                vault_id: U256::from(1u64),
            }],
            outputs: vec![OrderIo {
                token: Address(alloy_primitives::Address::with_last_byte(0x20)),
                decimals: 18,
                vault_id: U256::from(1u64),
            }],
            evaluable: Bytes::new(),
        });
        let first = TakeOrder {
            order,
            input_io_index: 0,
            output_io_index: 0,
            quote: Quote {
                max_output: TokenAmount(U256::from(100u64)),
                ratio: Fixed18(U256::from(1u64)),
            },
        };
        let second = TakeOrder {
            order: Arc::new((*first.order).clone()),
            ..first.clone()
        };
        vec![first, second]
    }

    #[rstest::rstest]
    #[case(Mode::Bundle, 2)]
    #[case(Mode::Single, 1)]
    #[case(Mode::Double, 2)]
    #[case(Mode::Triple, 3)]
    fn mode_expands_to_the_documented_order_count(#[case] mode: Mode, #[case] expected_len: usize) {
        // spec §4.4 step 5: mode 0 keeps every take-order, modes 1-3 take
        // only the first and duplicate it `mode` times.
        let expanded = mode.expand(&take_orders());

        assert_eq!(expanded.len(), expected_len);
        assert!(expanded.iter().all(|to| to.order.id == take_orders()[0].order.id));
    }

    #[test]
    fn bundle_mode_preserves_every_take_order_not_just_the_first() {
        let expanded = Mode::Bundle.expand(&take_orders());
        assert_eq!(expanded.len(), take_orders().len());
    }

    #[test]
    fn expanding_an_empty_bundle_never_panics() {
        assert!(Mode::Bundle.expand(&[]).is_empty());
        assert!(Mode::Single.expand(&[]).is_empty());
        assert!(Mode::Triple.expand(&[]).is_empty());
    }
}
