//! Error types for the catalog and balance clients

use storefront_core::ProductId;
use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the Catalog or Balance APIs
#[derive(Error, Debug)]
pub enum ClientError {
    /// Server rejected the payload (HTTP 422); the message is shown verbatim
    #[error("{message}")]
    Validation {
        /// Server-provided message
        message: String,
    },

    /// Target resource does not exist (HTTP 404)
    #[error("{message}")]
    NotFound {
        /// Server-provided message
        message: String,
    },

    /// Draft failed local validation; nothing was sent
    #[error("Invalid {field}: {message}")]
    InvalidDraft {
        /// Offending field
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// Product is not in the local list
    #[error("Product {id} is not in the current product list")]
    UnknownProduct {
        /// Requested product id
        id: ProductId,
    },

    /// Submit was called with no product form open
    #[error("No product form is open")]
    EditorClosed,

    /// Any other non-success status
    #[error("API returned {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Refresh gave up before reaching the server-reported last page
    #[error("Pagination stopped after {pages} pages without reaching the last page")]
    PaginationLimit {
        /// Pages read before giving up
        pages: u32,
    },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse error categories shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User-correctable input problem
    Validation,
    /// Target vanished
    NotFound,
    /// Network or unknown failure
    Transport,
}

impl ClientError {
    /// Map a non-success HTTP status and its message onto an error
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            422 => Self::Validation { message },
            404 => Self::NotFound { message },
            _ => Self::UnexpectedStatus { status, message },
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Category of this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::InvalidDraft { .. } | Self::EditorClosed => {
                ErrorKind::Validation
            }
            Self::NotFound { .. } | Self::UnknownProduct { .. } => ErrorKind::NotFound,
            _ => ErrorKind::Transport,
        }
    }

    /// Check if trying again could succeed without user action
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            Self::UnexpectedStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<storefront_core::Error> for ClientError {
    fn from(err: storefront_core::Error) -> Self {
        match err {
            storefront_core::Error::Validation { field, message } => {
                Self::InvalidDraft { field, message }
            }
            storefront_core::Error::Configuration { message } => Self::Configuration { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_categories() {
        let err = ClientError::from_status(422, "The name field is required.");
        assert!(matches!(err, ClientError::Validation { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "The name field is required.");

        let err = ClientError::from_status(404, "Product not found");
        assert!(matches!(err, ClientError::NotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Product not found");

        let err = ClientError::from_status(500, "Server Error");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "API returned 500: Server Error");
    }

    #[test]
    fn test_error_retryable() {
        assert!(ClientError::from_status(503, "Service Unavailable").is_retryable());
        assert!(ClientError::from_status(429, "Too Many Requests").is_retryable());
        assert!(!ClientError::from_status(422, "invalid").is_retryable());
        assert!(!ClientError::PaginationLimit { pages: 500 }.is_retryable());
    }

    #[test]
    fn test_core_validation_becomes_invalid_draft() {
        let err = ClientError::from(storefront_core::Error::validation("price", "is required"));
        assert!(matches!(&err, ClientError::InvalidDraft { field, .. } if field == "price"));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Invalid price: is required");
    }

    #[test]
    fn test_core_configuration_error_is_carried_over() {
        let core = storefront_core::Error::Configuration {
            message: "catalog.base_url is empty".to_string(),
        };
        let err = ClientError::from(core);
        assert!(matches!(&err, ClientError::Configuration { message } if message.contains("base_url")));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::UnknownProduct { id: 42 };
        assert!(err.to_string().contains("42"));

        let err = ClientError::PaginationLimit { pages: 3 };
        assert!(err.to_string().contains("3 pages"));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
