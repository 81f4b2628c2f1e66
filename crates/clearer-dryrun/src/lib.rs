//! C4 (route-processor dryrun), C5 (intra-orderbook dryrun), and C6 (the
//! binary-search sizer they share) — `spec` §4.4, §4.5, §4.6.

mod intra_orderbook;
mod route_processor;
mod sizer;

pub use intra_orderbook::{IntraOrderbookContext, IntraOrderbookDryrun, IntraOrderbookSizable, Opposing};
pub use route_processor::{RouteProcessorContext, RouteProcessorDryrun, RouteProcessorSizable};
pub use sizer::{find_opp_with_retries, BinarySearchSizer, SizableDryrun};
