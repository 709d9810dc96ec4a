//! User-facing notices for completed or failed operations

use crate::error::{ClientError, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
}

/// Operation a notice reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Listing refresh
    Refresh,
    /// Create or update
    Save,
    /// Delete
    Delete,
    /// Balance inquiry
    Balance,
}

impl Operation {
    /// Text shown when the failure carries nothing worth showing
    pub const fn generic_failure(self) -> &'static str {
        match self {
            Self::Refresh => "Failed to fetch products.",
            Self::Save => "An error occurred while saving the product.",
            Self::Delete => "An unexpected error occurred while deleting the product.",
            Self::Balance => "Failed to fetch balance information.",
        }
    }
}

/// Title/text pair shown after an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Short heading
    pub title: String,
    /// Body text
    pub text: String,
}

impl Notice {
    /// Create a success notice
    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            text: text.into(),
        }
    }

    /// Create an error notice
    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            text: text.into(),
        }
    }

    /// Product saved
    pub fn saved(message: impl Into<String>) -> Self {
        Self::success("Success", message)
    }

    /// Product deleted
    pub fn deleted(message: impl Into<String>) -> Self {
        Self::success("Deleted!", message)
    }

    /// Notice for a failed operation
    ///
    /// Validation and not-found failures show the server's message; anything
    /// else falls back to a generic per-operation text.
    pub fn from_error(operation: Operation, err: &ClientError) -> Self {
        match err.kind() {
            ErrorKind::Validation => Self::error("Validation Error", err.to_string()),
            ErrorKind::NotFound => Self::error("Error", err.to_string()),
            ErrorKind::Transport => Self::error("Error", operation.generic_failure()),
        }
    }

    /// Whether this notice reports a failure
    pub const fn is_error(&self) -> bool {
        matches!(self.level, NoticeLevel::Error)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.text)
    }
}
