use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry client is not connected")]
    NotConnected,

    #[error("no address registered for service `{0}`")]
    NotFound(String),

    #[error("registry backend error: {0}")]
    Backend(String),
}
