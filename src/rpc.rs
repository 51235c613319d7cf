mod rpc_message;
mod rpc_request_response;
mod rpc_value;

pub use rpc_message::{ProtocolError, RpcMessage, decode_message, encode_message};
pub use rpc_request_response::{RpcCallError, RpcRequest, RpcResponse};
pub use rpc_value::{FromValue, IntoValue, Value, ValueError, take_field};
