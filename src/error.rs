use std::fmt::{Display, Formatter};

use reqwest::StatusCode;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Every failure is surfaced to the caller as-is; nothing is retried.
#[derive(Clone, Debug)]
pub enum StorageError {
    /// A name could not be resolved against the store, or the backend is
    /// missing a required setting such as the access token.
    Configuration(String),
    /// A byte fetch came back with a non-success HTTP status.
    Suspicious(String),
    /// The operation is deliberately not implemented.
    Unsupported(String),
    /// A write was attempted on a handle not opened for writing.
    InvalidMode(String),
    /// A closed handle was reopened but its backing entry is gone.
    Value(String),
    Network(String),
    Serialization(String),
    UnexpectedStatus(StatusCode),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Configuration(msg) => write!(f, "improperly configured: {}", msg),
            StorageError::Suspicious(msg) => write!(f, "suspicious operation: {}", msg),
            StorageError::Unsupported(msg) => write!(f, "not supported: {}", msg),
            StorageError::InvalidMode(msg) => write!(f, "invalid mode: {}", msg),
            StorageError::Value(msg) => write!(f, "invalid value: {}", msg),
            StorageError::Network(msg) => write!(f, "network error: {}", msg),
            StorageError::Serialization(msg) => write!(f, "serialization error: {}", msg),
            StorageError::UnexpectedStatus(code) => write!(f, "unexpected status: {}", code),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<reqwest::Error> for StorageError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            StorageError::Serialization(error.to_string())
        } else if let Some(status) = error.status() {
            StorageError::UnexpectedStatus(status)
        } else {
            StorageError::Network(error.to_string())
        }
    }
}
