use qrpc_service_endpoint::error::RpcServiceEndpointError;
use qrpc_service_registry::RegistryError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcServerError {
    #[error("server i/o error: {0}")]
    Io(#[from] io::Error),

    /// Advertising a service failed; the server does not start.
    #[error("service registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Endpoint(#[from] RpcServiceEndpointError),

    /// A method panicked while serving a request. The connection is closed
    /// without a response.
    #[error("invocation panicked: {0}")]
    InvocationPanic(String),
}
