use crate::{
    constants::{CODE_ERROR, CODE_SUCCESS, CODE_THROTTLED},
    frame::{CompressType, SerializeType},
    rpc::{FromValue, Value, ValueError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A call of `method_name` on the service registered as `service_name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub request_id: u64,
    pub service_name: String,
    pub method_name: String,
    pub args: Vec<Value>,
}

impl RpcRequest {
    pub fn new(
        request_id: u64,
        service_name: impl Into<String>,
        method_name: impl Into<String>,
        args: Vec<Value>,
    ) -> Self {
        Self {
            request_id,
            service_name: service_name.into(),
            method_name: method_name.into(),
            args,
        }
    }
}

/// The single answer to an [`RpcRequest`].
///
/// `code` is [`CODE_SUCCESS`] when `data` holds the method's result;
/// otherwise `message` explains the failure and `data` is `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub request_id: u64,
    pub code: u16,
    pub message: String,
    pub compress_type: CompressType,
    pub serialize_type: SerializeType,
    pub data: Value,
}

impl RpcResponse {
    pub fn success(request_id: u64, data: Value) -> Self {
        Self {
            request_id,
            code: CODE_SUCCESS,
            message: "success".to_string(),
            compress_type: CompressType::default(),
            serialize_type: SerializeType::default(),
            data,
        }
    }

    pub fn error(request_id: u64, message: impl Into<String>) -> Self {
        Self::with_code(request_id, CODE_ERROR, message)
    }

    pub fn throttled(request_id: u64, message: impl Into<String>) -> Self {
        Self::with_code(request_id, CODE_THROTTLED, message)
    }

    fn with_code(request_id: u64, code: u16, message: impl Into<String>) -> Self {
        Self {
            request_id,
            code,
            message: message.into(),
            compress_type: CompressType::default(),
            serialize_type: SerializeType::default(),
            data: Value::Null,
        }
    }

    /// Sets the codecs the response will be encoded with.
    pub fn with_codecs(mut self, serialize_type: SerializeType, compress_type: CompressType) -> Self {
        self.serialize_type = serialize_type;
        self.compress_type = compress_type;
        self
    }

    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }

    /// Converts a successful response's `data` into `T`; any other code
    /// becomes an [`RpcCallError`].
    pub fn into_result<T: FromValue>(self) -> Result<T, RpcCallError> {
        match self.code {
            CODE_SUCCESS => Ok(T::from_value(self.data)?),
            CODE_THROTTLED => Err(RpcCallError::Throttled(self.message)),
            code => Err(RpcCallError::Remote {
                code,
                message: self.message,
            }),
        }
    }
}

/// Failure reported by the remote side, seen from the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RpcCallError {
    #[error("remote call failed with code {code}: {message}")]
    Remote { code: u16, message: String },

    #[error("remote call throttled: {0}")]
    Throttled(String),

    #[error("could not convert response data: {0}")]
    Decode(#[from] ValueError),
}
