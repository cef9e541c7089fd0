/// Errors raised while resolving, fetching or validating the retention
/// policy document. Any of these aborts the run before a single object is
/// listed or deleted.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A required setting was not provided
    MissingSetting { name: String },

    /// The `s3://` location could not be understood
    InvalidSourceUrl { url: String, reason: String },

    /// The policy document could not be downloaded
    FetchFailed { location: String, message: String },

    /// The policy document is not valid JSON or has the wrong shape
    MalformedDocument { message: String },

    /// A field holds a value outside its allowed range
    InvalidField {
        folder: String,
        field: String,
        value: String,
        expected: String,
    },

    /// Two policies target the same folder
    DuplicateFolder { folder: String },
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationError::MissingSetting { name } => {
                write!(f, "{} is required", name)
            }
            ConfigurationError::InvalidSourceUrl { url, reason } => {
                write!(f, "Invalid config location '{}': {}", url, reason)
            }
            ConfigurationError::FetchFailed { location, message } => {
                write!(f, "Failed to load config from {}: {}", location, message)
            }
            ConfigurationError::MalformedDocument { message } => {
                write!(f, "Malformed retention config: {}", message)
            }
            ConfigurationError::InvalidField {
                folder,
                field,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Invalid value for '{}' in policy for folder '{}': {} (expected: {})",
                    field, folder, value, expected
                )
            }
            ConfigurationError::DuplicateFolder { folder } => {
                write!(f, "Folder '{}' has more than one retention policy", folder)
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Result type for configuration loading
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
