//! Execution adapters: the registry that maps routing keys to adapter
//! factories, meta-routing suggestion plumbing, a local echo adapter for
//! development, mock implementations for tests, and secrets loading.

pub mod echo;
pub mod meta;
pub mod mock;
pub mod registry;
pub mod secrets;

pub use meta::{DEFAULT_FALLBACK_MODEL_ID, META_MODEL_SENTINEL};
pub use registry::{AdapterRegistry, AdapterRegistryBuilder};
