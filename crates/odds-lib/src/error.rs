use thiserror::Error;

/// Convenient result alias for the odds library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Variants split into client-caused outcomes (`Validation`,
/// `MissingSearchParameters`, `NotFound`) and server-caused failures
/// (`Decode`, `Store`).
#[derive(Debug, Error)]
pub enum Error {
    /// A search parameter failed syntactic validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Neither `id` nor `key` was supplied to a search.
    #[error("at least one of 'id' or 'key' must be supplied")]
    MissingSearchParameters,

    /// The search matched no records.
    #[error("no records matched the search")]
    NotFound,

    /// A record returned by the store did not have the expected shape.
    #[error("failed to decode record {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: serde_dynamo::Error,
    },

    /// The store call itself failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// Whether the error was caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::MissingSearchParameters | Error::NotFound
        )
    }
}

/// Raised when untrusted search input violates the allowed character class or length.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'id' must be 1-{max} ASCII letters or digits")]
    InvalidId { max: usize },

    #[error("'key' must be 1-{max} ASCII letters")]
    InvalidKey { max: usize },
}

/// Transport, permission, or throttling failure reported by the record store.
#[derive(Debug, Clone, Error)]
#[error("{operation} failed: {message}")]
pub struct StoreError {
    /// Store operation that failed (e.g. "Scan").
    pub operation: &'static str,
    /// Error text reported by the store client.
    pub message: String,
}

impl StoreError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display_includes_operation() {
        let err = StoreError::new("Scan", "AccessDeniedException: not authorized");
        assert_eq!(
            err.to_string(),
            "Scan failed: AccessDeniedException: not authorized"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::NotFound.is_client_error());
        assert!(Error::MissingSearchParameters.is_client_error());
        assert!(Error::from(ValidationError::InvalidKey { max: 50 }).is_client_error());
        assert!(!Error::from(StoreError::new("Query", "timeout")).is_client_error());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidId { max: 100 };
        assert!(err.to_string().contains("'id'"));
        assert!(err.to_string().contains("100"));
    }
}
