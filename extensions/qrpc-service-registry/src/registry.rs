use crate::RegistryError;
use std::time::Duration;

/// Connection settings for a registry backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOptions {
    pub endpoints: Vec<String>,
    pub dial_timeout: Duration,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            endpoints: vec!["127.0.0.1:2379".to_string()],
            dial_timeout: Duration::from_secs(5),
        }
    }
}

impl RegistryOptions {
    pub fn with_endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dial_timeout(mut self, dial_timeout: Duration) -> Self {
        self.dial_timeout = dial_timeout;
        self
    }
}

/// Directory that maps a service name to the `host:port` serving it.
///
/// Servers advertise themselves with [`register_service`]; clients look a
/// name up with [`resolve`]. Both must call [`create_client`] first.
///
/// [`register_service`]: ServiceRegistry::register_service
/// [`resolve`]: ServiceRegistry::resolve
/// [`create_client`]: ServiceRegistry::create_client
#[async_trait::async_trait]
pub trait ServiceRegistry: Send + Sync {
    async fn create_client(&self, options: &RegistryOptions) -> Result<(), RegistryError>;

    async fn register_service(
        &self,
        service_name: &str,
        host: &str,
        port: u16,
    ) -> Result<(), RegistryError>;

    /// Returns the advertised address as `host:port`.
    async fn resolve(&self, service_name: &str) -> Result<String, RegistryError>;

    async fn close(&self) -> Result<(), RegistryError>;
}
