mod cleanup_service_impl;
mod policy_loader_impl;

pub use cleanup_service_impl::{CleanupOptions, CleanupServiceImpl};
pub use policy_loader_impl::{PolicyLoaderImpl, parse_policy_document};
