use qrpc::frame::{CompressType, SerializeType};
use qrpc_service_registry::{RegistryOptions, ServiceRegistry};
use std::{fmt, sync::Arc, time::Duration};

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-call configuration, shared read-only by every call made with it.
#[derive(Clone)]
pub struct ClientOptions {
    /// Attempts made by [`RpcClientProxy`](crate::RpcClientProxy) per call.
    pub retries: u32,
    pub connection_timeout: Duration,
    pub serialize_type: SerializeType,
    pub compress_type: CompressType,

    /// Dialed directly when no registry is configured.
    pub host: String,
    pub port: u16,

    /// When set, the target address is looked up by service name.
    pub registry: Option<(Arc<dyn ServiceRegistry>, RegistryOptions)>,

    /// Pause between failed proxy attempts.
    pub retry_delay: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            serialize_type: SerializeType::Native,
            compress_type: CompressType::Gzip,
            host: "127.0.0.1".to_string(),
            port: 9222,
            registry: None,
            retry_delay: Duration::ZERO,
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("retries", &self.retries)
            .field("connection_timeout", &self.connection_timeout)
            .field("serialize_type", &self.serialize_type)
            .field("compress_type", &self.compress_type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "registry",
                &self.registry.as_ref().map(|(_, options)| options),
            )
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl ClientOptions {
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_connection_timeout(mut self, connection_timeout: Duration) -> Self {
        self.connection_timeout = connection_timeout;
        self
    }

    pub fn with_serialize_type(mut self, serialize_type: SerializeType) -> Self {
        self.serialize_type = serialize_type;
        self
    }

    pub fn with_compress_type(mut self, compress_type: CompressType) -> Self {
        self.compress_type = compress_type;
        self
    }

    pub fn with_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_registry(
        mut self,
        registry: Arc<dyn ServiceRegistry>,
        options: RegistryOptions,
    ) -> Self {
        self.registry = Some((registry, options));
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}
