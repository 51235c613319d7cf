use qrpc::{codec::CodecError, rpc::RpcCallError};
use qrpc_service_registry::RegistryError;
use std::{io, time::Duration};
use thiserror::Error;

/// Failures that happen before a request frame could be exchanged.
///
/// Once the request is on the wire, problems are reported as a `500`
/// response instead.
#[derive(Debug, Error)]
pub enum RpcClientError {
    #[error("service registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("connecting to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("client is not connected")]
    NotConnected,

    /// Each connection carries exactly one call.
    #[error("connection already carried a call")]
    ConnectionUsed,

    #[error("failed to encode request: {0}")]
    Codec(#[from] CodecError),

    #[error("failed to send request: {0}")]
    Io(#[from] io::Error),

    #[error("retries is 0, no attempt was made")]
    NoAttempts,

    #[error(transparent)]
    Call(#[from] RpcCallError),
}
