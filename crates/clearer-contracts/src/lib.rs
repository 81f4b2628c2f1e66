//! Calldata encoding for the orderbook/arb/router contracts the clearing
//! core drives (`spec` §6).

pub mod abi;
mod bounty;
mod encode;
mod route_version;

pub use abi::{ClearConfig, EvaluableV3, IoV3, OrderV3, TakeOrderConfigV3, TakeOrdersConfigV3};
pub use bounty::MinimumBountyTask;
pub use encode::{
    build_take_orders_config, encode_arb3, encode_balance_of, encode_clear2, encode_multicall,
    encode_withdraw2, order_to_sol, BOUNTY_VAULT_ID,
};
pub use route_version::RouteProcessorVersion;
