mod cleanup_service;
mod policy_loader;

pub use cleanup_service::{CleanupError, CleanupService};
pub use policy_loader::{DEFAULT_CONFIG_KEY, PolicyLoader, PolicySource};
