mod chain;
mod rpc;

pub use chain::*;
pub use rpc::*;
