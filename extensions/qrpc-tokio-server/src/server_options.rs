use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9222;
pub const DEFAULT_LIMITER_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    /// Address `serve` binds to. Also the host advertised to the registry
    /// when the listener is bound to an unspecified address.
    pub host: String,
    pub port: u16,

    /// How long a request may wait for a rate-limiter token.
    pub limiter_timeout: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            limiter_timeout: DEFAULT_LIMITER_TIMEOUT,
        }
    }
}

impl ServerOptions {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_limiter_timeout(mut self, limiter_timeout: Duration) -> Self {
        self.limiter_timeout = limiter_timeout;
        self
    }
}
