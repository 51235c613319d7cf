mod client_options;
pub use client_options::*;

pub mod error;

mod rpc_client;
pub use rpc_client::*;

mod rpc_client_proxy;
pub use rpc_client_proxy::*;
