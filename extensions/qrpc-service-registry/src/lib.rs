mod error;
pub use error::RegistryError;

mod memory_registry;
pub use memory_registry::MemoryRegistry;

mod registry;
pub use registry::{RegistryOptions, ServiceRegistry};
