/// Error types for tab hibernation
use thiserror::Error;

use crate::tab_record::TabRecord;

/// Persistence read/write failures
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The underlying key-value API rejected the call (I/O, quota, ...)
    #[error("Storage error: {0}")]
    Io(String),
    /// Stored data could not be encoded or decoded
    #[error("Storage data is malformed: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Failures of the tab record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid tab index")]
    OutOfRange { index: i64, len: usize },
    #[error("Tab record not found")]
    NotFound(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Failures of the hibernate/restore operations
#[derive(Debug, Error)]
pub enum HibernateError {
    /// The tab handle no longer resolves (e.g. tab already closed)
    #[error("Tab not found: {0}")]
    TabNotFound(String),
    #[error("No active tab found")]
    NoActiveTab,
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The record was stored but the originating tab could not be closed
    #[error("Failed to close tab: {reason}")]
    CloseFailed { record: Box<TabRecord>, reason: String },
    #[error("Failed to open tab: {0}")]
    OpenFailed(String),
    #[error("Tabs API error: {0}")]
    Browser(String),
}

/// Failures at the message boundary
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Unknown action")]
    UnknownAction,
    #[error("Invalid request: {0}")]
    Malformed(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Hibernate(#[from] HibernateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = StoreError::OutOfRange { index: -1, len: 0 };
        assert_eq!(err.to_string(), "Invalid tab index");
    }

    #[test]
    fn test_messages_pass_through_router_error() {
        let err: RouterError = StoreError::OutOfRange { index: 3, len: 1 }.into();
        assert_eq!(err.to_string(), "Invalid tab index");

        let err: RouterError = HibernateError::NoActiveTab.into();
        assert_eq!(err.to_string(), "No active tab found");

        let err: RouterError =
            StoreError::Persistence(PersistenceError::Io("QuotaExceededError".into())).into();
        assert_eq!(err.to_string(), "Storage error: QuotaExceededError");
    }

    #[test]
    fn test_unknown_action_message() {
        assert_eq!(RouterError::UnknownAction.to_string(), "Unknown action");
    }
}
