//! Error types for Polysearch

use thiserror::Error;

/// Result type alias using Polysearch's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Polysearch error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Search errors (E001-E099)
    #[error("The \"{0}\" object doesn't exist. Run `polysearch objects` to see searchable objects.")]
    InvalidArgument(String),

    #[error("No metadata registered for object class '{0}'.")]
    MetadataNotFound(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "E001",
            Self::MetadataNotFound(_) => "E002",
            Self::InvalidFilter(_) => "E003",
            Self::DatabaseError(_) => "E400",
            Self::Serialization(_) => "E401",
            Self::ConfigError(_) => "E600",
            Self::CatalogError(_) => "E601",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::InvalidArgument(_) => Some("polysearch objects".to_string()),
            Self::InvalidFilter(_) => {
                Some("Use `field=value`, `field!=value`, `field~value` or `field>=value`".to_string())
            }
            Self::CatalogError(_) => Some("Check the --catalog file".to_string()),
            _ => None,
        }
    }
}
