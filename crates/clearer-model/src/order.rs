use {
    alloy_primitives::{Bytes, U256},
    clearer_eth::{Address, Fixed18, TokenAmount},
    std::sync::Arc,
};

/// A single input or output side of an [`Order`]: the token it moves, that
/// token's decimals, and the vault id it settles against (`spec` §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIo {
    pub token: Address,
    pub decimals: u8,
    pub vault_id: U256,
}

/// An order as read from the indexer/file source. Immutable for the
/// lifetime of a round (`spec` §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub owner: Address,
    pub orderbook: Address,
    pub inputs: Vec<OrderIo>,
    pub outputs: Vec<OrderIo>,
    /// The on-chain executable payload used to evaluate the order at clear
    /// time. Opaque to the core; passed through to calldata encoding
    /// verbatim.
    pub evaluable: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub struct OrderId(pub alloy_primitives::B256);

/// The owner-demanded price and current clearable size for one direction of
/// an [`Order`]. `ratio` is always 18-decimal fixed point regardless of the
/// tokens' own decimals (`spec` §3 invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub max_output: TokenAmount,
    pub ratio: Fixed18,
}

/// One buy-token/sell-token direction extracted from an [`Order`] (`spec`
/// §3, "Take-Order Record").
#[derive(Debug, Clone)]
pub struct TakeOrder {
    pub order: Arc<Order>,
    pub input_io_index: usize,
    pub output_io_index: usize,
    pub quote: Quote,
}

impl TakeOrder {
    pub fn input_io(&self) -> &OrderIo {
        &self.order.inputs[self.input_io_index]
    }

    pub fn output_io(&self) -> &OrderIo {
        &self.order.outputs[self.output_io_index]
    }

    pub fn vault_balance(&self) -> TokenAmount {
        self.quote.max_output
    }
}
