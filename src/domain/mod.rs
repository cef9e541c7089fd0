pub mod errors;
pub mod models;
pub mod retention;
pub mod value_objects;

// Re-export commonly used types
pub use errors::{ConfigurationError, StorageError, ValidationError as DomainValidationError};
pub use models::*;
pub use retention::{age_in_days, decide};
pub use value_objects::*;
