//! Error types for Crewdeck

use thiserror::Error;

use crate::model::EntityKind;

/// Result type alias using Crewdeck's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Crewdeck error types with helpful messages and suggestions
///
/// Errors are `Clone` because a settled cache entry keeps the failure that
/// settled it, and every subscriber of that entry sees the same value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Entity errors (E001-E099)
    #[error("{kind} '{id}' not found. It may have been deleted by an earlier request.")]
    NotFound { kind: EntityKind, id: String },

    // Input errors (E100-E199)
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    // Transport errors (E200-E299)
    #[error("Transport failure: {0}. The backend could not be reached.")]
    TransportFailure(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    // Cache errors (E300-E399)
    #[error("Cache entry '{0}' was dropped before it settled")]
    CacheClosed(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a missing entity
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "E001",
            Self::ValidationFailed(_) => "E100",
            Self::TransportFailure(_) => "E200",
            Self::Timeout(_) => "E201",
            Self::CacheClosed(_) => "E300",
            Self::ConfigError(_) => "E600",
            Self::Other(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NotFound { kind, .. } => Some(format!("Refresh the {} list", kind)),
            Self::TransportFailure(_) | Self::Timeout(_) => {
                Some("Retry the action once the backend responds".to_string())
            }
            Self::ConfigError(_) => {
                Some("Check config.toml in $CREWDECK_CONFIG_DIR".to_string())
            }
            _ => None,
        }
    }

    /// Whether the failure came from the transport rather than the request itself
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransportFailure(_) | Self::Timeout(_))
    }
}
