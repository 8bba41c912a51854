mod builtin;
mod error;
mod memory;
mod registry;

pub use builtin::builtins;
pub use error::RegistryError;
pub use memory::InMemoryRegistry;
pub use registry::{ComponentRegistry, ComponentSummary};
