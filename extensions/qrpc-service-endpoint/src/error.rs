use qrpc::rpc::ValueError;
use thiserror::Error;

/// Registration-time failures.
#[derive(Debug, Error, PartialEq)]
pub enum RpcServiceEndpointError {
    #[error("a service named `{0}` is already registered")]
    DuplicateService(String),

    #[error("a method named `{0}` is already registered on this service")]
    DuplicateMethod(String),
}

/// Failure of a single method invocation. Its text becomes the `message` of
/// the error response.
#[derive(Debug, Error, PartialEq)]
pub enum RpcMethodError {
    #[error("expected {expected} arguments, got {actual}")]
    Arity { expected: usize, actual: usize },

    #[error("argument {index}: {source}")]
    Argument {
        index: usize,
        #[source]
        source: ValueError,
    },

    /// The method ran and returned an error.
    #[error("{0}")]
    Failed(String),
}
