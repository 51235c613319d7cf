use crate::{RegistryError, RegistryOptions, ServiceRegistry};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::sync::RwLock;

/// In-process registry backend.
///
/// Cloning yields a new, unconnected handle onto the same directory, the way
/// two processes would each hold their own client to one shared store.
pub struct MemoryRegistry {
    directory: Arc<RwLock<HashMap<String, String>>>,
    connected: AtomicBool,
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryRegistry {
    fn clone(&self) -> Self {
        Self {
            directory: self.directory.clone(),
            connected: AtomicBool::new(false),
        }
    }
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            directory: Arc::new(RwLock::new(HashMap::new())),
            connected: AtomicBool::new(false),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn ensure_connected(&self) -> Result<(), RegistryError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(RegistryError::NotConnected)
        }
    }
}

#[async_trait::async_trait]
impl ServiceRegistry for MemoryRegistry {
    async fn create_client(&self, options: &RegistryOptions) -> Result<(), RegistryError> {
        if options.endpoints.is_empty() {
            return Err(RegistryError::Backend("no registry endpoints configured".into()));
        }

        self.connected.store(true, Ordering::Release);
        tracing::debug!("Registry client connected to {:?}", options.endpoints);
        Ok(())
    }

    async fn register_service(
        &self,
        service_name: &str,
        host: &str,
        port: u16,
    ) -> Result<(), RegistryError> {
        self.ensure_connected()?;

        let address = format!("{}:{}", host, port);
        tracing::info!("Registering service `{}` at {}", service_name, address);

        self.directory
            .write()
            .await
            .insert(service_name.to_string(), address);
        Ok(())
    }

    async fn resolve(&self, service_name: &str) -> Result<String, RegistryError> {
        self.ensure_connected()?;

        self.directory
            .read()
            .await
            .get(service_name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(service_name.to_string()))
    }

    async fn close(&self) -> Result<(), RegistryError> {
        self.connected.store(false, Ordering::Release);
        Ok(())
    }
}
