//! Error types shared by the search pipeline and the favorites store.

/// Failures that can occur while building, issuing or applying a search.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Search request failed: HTTP {0}")]
    Network(u16),

    #[error("Search request failed: {0}")]
    Transport(String),

    #[error("Failed to parse search response: {0}")]
    Parse(String),

    #[error("A search request is already in flight")]
    Busy,

    #[error("Invalid catalog key: {0}")]
    InvalidKey(String),
}

/// Failures of the persistent key-value store.
///
/// These never reach the user; callers log them and fall back to defaults.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Store lock poisoned")]
    Poisoned,
}
