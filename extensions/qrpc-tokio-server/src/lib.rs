mod rpc_server;
pub use rpc_server::*;

mod server_options;
pub use server_options::*;

pub mod error;
pub mod limiter;

pub use qrpc_service_endpoint::{RpcService, RpcServiceEndpoint};
