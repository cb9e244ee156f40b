//! Error types for the intake service.

use thiserror::Error;

/// Message returned for any body that cannot be read or parsed.
pub const INVALID_BODY: &str = "Invalid request body";

/// Failure of an [`ArtifactService`](crate::service::ArtifactService) operation.
///
/// The `Display` text of every variant is safe to hand back to a caller;
/// the underlying cause of a storage failure is kept in `source` for
/// logging and never rendered.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Body was not a JSON object of the expected shape.
    #[error("{}", INVALID_BODY)]
    InvalidBody(#[source] serde_json::Error),

    /// Body parsed but broke the submission contract.
    #[error("{0}")]
    Validation(String),

    /// No artifact stored under the requested id.
    #[error("Not found")]
    NotFound,

    /// The key-value backend failed.
    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ServiceError {
    pub(crate) fn storage(context: &'static str, source: impl Into<anyhow::Error>) -> Self {
        ServiceError::Storage {
            context,
            source: source.into(),
        }
    }

    /// True for errors caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ServiceError::Storage { .. })
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
