use thiserror::Error;

#[derive(Debug, Error)]
pub enum SculptError {
    /// Malformed definition or JSON document
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A parameter reference names a key missing from the current context
    #[error("Reference error: '{0}' is not present in the current context")]
    ReferenceResolution(String),

    /// A column reference names a key missing from the current context
    #[error("Unknown context key: '{0}'")]
    UnknownContextKey(String),

    /// Fetched data does not have the shape a provider requires
    #[error("Shape error: {0}")]
    Shape(String),

    /// Error raised by a user supplied callback, key function or filter
    #[error("Callback error: {0}")]
    Callback(String),

    /// Error raised by a backend while fetching
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Error parsing or serializing JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

impl SculptError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        SculptError::Configuration(message.into())
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        SculptError::Shape(message.into())
    }
}

/// Result type for definition building and rendering
pub type Result<T> = std::result::Result<T, SculptError>;
