//! C8: groups raw order records into per-pair [`BundledPair`]s (`spec`
//! §4.1).

use {
    async_trait::async_trait,
    clearer_eth::Address,
    clearer_model::{BundledPair, Order, Quote, TakeOrder},
    rand::seq::SliceRandom,
    std::{collections::HashMap, sync::Arc},
};

/// One buy/sell direction of an [`Order`] before its current quote has been
/// read on-chain.
#[derive(Debug, Clone)]
pub struct UnquotedTakeOrder {
    pub order: Arc<Order>,
    pub input_io_index: usize,
    pub output_io_index: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderReaderError {
    #[error("transport error reading order quotes: {0}")]
    Transport(String),
}

/// Reads the current vault balance and ratio for a batch of candidate
/// directions in a single multicall (`spec` §4.1: "single multicall";
/// "fails only on unrecoverable RPC errors; missing quotes mark the TO
/// skipped"). Backed by an external node RPC, out of this crate's scope
/// (`spec` §1).
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait OrderReader: Send + Sync {
    async fn read_quotes(
        &self,
        candidates: &[UnquotedTakeOrder],
    ) -> Result<Vec<Option<Quote>>, OrderReaderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey {
    orderbook: Address,
    sell_token: Address,
    buy_token: Address,
}

/// C8: groups an unordered set of orders into [`BundledPair`]s keyed by
/// `(orderbook, sellToken, buyToken)` (`spec` §4.1).
pub struct OrderBundler<R> {
    reader: Arc<R>,
}

impl<R: OrderReader> OrderBundler<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// `bundle_on` selects one `BP` per triple versus one `BP` per
    /// take-order; `shuffle` reduces adversarial ordering effects (`spec`
    /// §4.1, §5 "RPC endpoint list is shuffled per round").
    pub async fn bundle(
        &self,
        orders: &[Arc<Order>],
        bundle_on: bool,
        shuffle: bool,
    ) -> Result<Vec<BundledPair>, OrderReaderError> {
        let candidates = expand_candidates(orders);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let quotes = self.reader.read_quotes(&candidates).await?;
        let take_orders = zip_and_filter(candidates, quotes);

        let mut bundles = if bundle_on {
            group_by_pair(take_orders)
        } else {
            take_orders
                .into_iter()
                .filter_map(|to| {
                    BundledPair::new(
                        to.order.orderbook,
                        to.input_io().token,
                        to.input_io().decimals,
                        String::new(),
                        to.output_io().token,
                        to.output_io().decimals,
                        String::new(),
                        vec![to],
                    )
                })
                .collect::<Vec<_>>()
        };

        if shuffle {
            bundles.shuffle(&mut rand::thread_rng());
        }

        Ok(bundles)
    }
}

fn expand_candidates(orders: &[Arc<Order>]) -> Vec<UnquotedTakeOrder> {
    let mut candidates = Vec::new();
    for order in orders {
        for (input_io_index, input) in order.inputs.iter().enumerate() {
            for (output_io_index, output) in order.outputs.iter().enumerate() {
                if input.token == output.token {
                    continue;
                }
                candidates.push(UnquotedTakeOrder {
                    order: Arc::clone(order),
                    input_io_index,
                    output_io_index,
                });
            }
        }
    }
    candidates
}

/// Pairs each candidate with its quote, discarding candidates the reader
/// could not quote and any whose vault balance is zero (`spec` §4.1
/// guarantee: "every emitted BP has at least one TO with non-zero vault
/// balance").
fn zip_and_filter(
    candidates: Vec<UnquotedTakeOrder>,
    quotes: Vec<Option<Quote>>,
) -> Vec<TakeOrder> {
    candidates
        .into_iter()
        .zip(quotes)
        .filter_map(|(candidate, quote)| {
            let quote = quote?;
            if quote.max_output.is_zero() {
                return None;
            }
            Some(TakeOrder {
                order: candidate.order,
                input_io_index: candidate.input_io_index,
                output_io_index: candidate.output_io_index,
                quote,
            })
        })
        .collect()
}

fn pair_key(to: &TakeOrder) -> PairKey {
    PairKey {
        orderbook: to.order.orderbook,
        sell_token: to.input_io().token,
        buy_token: to.output_io().token,
    }
}

/// Groups take-orders sharing a pair key into one [`BundledPair]` each,
/// stable by first encounter (`spec` §4.1 "Tie-break across equal bundles:
/// stable by first encounter").
fn group_by_pair(take_orders: Vec<TakeOrder>) -> Vec<BundledPair> {
    let mut order_of_keys: Vec<PairKey> = Vec::new();
    let mut grouped: HashMap<PairKey, Vec<TakeOrder>> = HashMap::new();

    for to in take_orders {
        let key = pair_key(&to);
        if !grouped.contains_key(&key) {
            order_of_keys.push(key);
        }
        grouped.entry(key).or_default().push(to);
    }

    order_of_keys
        .into_iter()
        .filter_map(|key| {
            let group = grouped.remove(&key)?;
            let first = group.first()?;
            let sell_decimals = first.input_io().decimals;
            let buy_decimals = first.output_io().decimals;
            BundledPair::new(
                key.orderbook,
                key.sell_token,
                sell_decimals,
                String::new(),
                key.buy_token,
                buy_decimals,
                String::new(),
                group,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy_primitives::{Bytes, U256},
        clearer_eth::{Fixed18, TokenAmount},
        clearer_model::{OrderId, OrderIo},
    };

    fn order(id: u8, orderbook: Address, sell: Address, buy: Address) -> Arc<Order> {
        Arc::new(Order {
            id: OrderId(alloy_primitives::B256::with_last_byte(id)),
            owner: Address(alloy_primitives::Address::with_last_byte(id)),
            orderbook,
            inputs: vec![OrderIo {
                token: sell,
                decimals: 18,
                vault_id: U256::from(1u64),
            }],
            outputs: vec![OrderIo {
                token: buy,
                decimals: 18,
                vault_id: U256::from(1u64),
            }],
            evaluable: Bytes::new(),
        })
    }

    fn quote(max_output: u64, ratio: u64) -> Quote {
        Quote {
            max_output: TokenAmount(U256::from(max_output)),
            ratio: Fixed18(U256::from(ratio)),
        }
    }

    struct FixedReader(Vec<Option<Quote>>);

    #[async_trait]
    impl OrderReader for FixedReader {
        async fn read_quotes(
            &self,
            _candidates: &[UnquotedTakeOrder],
        ) -> Result<Vec<Option<Quote>>, OrderReaderError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn bundle_on_groups_matching_pairs_into_one_bundled_pair() {
        let orderbook = Address(alloy_primitives::Address::ZERO);
        let sell = Address(alloy_primitives::Address::with_last_byte(10));
        let buy = Address(alloy_primitives::Address::with_last_byte(20));
        let orders = vec![order(1, orderbook, sell, buy), order(2, orderbook, sell, buy)];
        let reader = Arc::new(FixedReader(vec![
            Some(quote(100, 1)),
            Some(quote(200, 1)),
        ]));
        let bundler = OrderBundler::new(reader);

        let bundles = bundler.bundle(&orders, true, false).await.unwrap();

        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].take_orders().len(), 2);
    }

    #[tokio::test]
    async fn bundle_off_emits_one_bundled_pair_per_take_order() {
        let orderbook = Address(alloy_primitives::Address::ZERO);
        let sell = Address(alloy_primitives::Address::with_last_byte(10));
        let buy = Address(alloy_primitives::Address::with_last_byte(20));
        let orders = vec![order(1, orderbook, sell, buy), order(2, orderbook, sell, buy)];
        let reader = Arc::new(FixedReader(vec![
            Some(quote(100, 1)),
            Some(quote(200, 1)),
        ]));
        let bundler = OrderBundler::new(reader);

        let bundles = bundler.bundle(&orders, false, false).await.unwrap();

        assert_eq!(bundles.len(), 2);
    }

    #[tokio::test]
    async fn zero_vault_balance_take_orders_are_discarded() {
        let orderbook = Address(alloy_primitives::Address::ZERO);
        let sell = Address(alloy_primitives::Address::with_last_byte(10));
        let buy = Address(alloy_primitives::Address::with_last_byte(20));
        let orders = vec![order(1, orderbook, sell, buy)];
        let reader = Arc::new(FixedReader(vec![Some(quote(0, 1))]));
        let bundler = OrderBundler::new(reader);

        let bundles = bundler.bundle(&orders, true, false).await.unwrap();

        assert!(bundles.is_empty());
    }

    #[tokio::test]
    async fn same_token_input_output_pair_is_never_a_candidate() {
        let orderbook = Address(alloy_primitives::Address::ZERO);
        let token = Address(alloy_primitives::Address::with_last_byte(10));
        let orders = vec![order(1, orderbook, token, token)];
        let reader = Arc::new(FixedReader(vec![]));
        let bundler = OrderBundler::new(reader);

        let bundles = bundler.bundle(&orders, true, false).await.unwrap();

        assert!(bundles.is_empty());
    }
}
