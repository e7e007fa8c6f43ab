//! # Error Types
//!
//! Error taxonomy for secret access and cluster coordination using `thiserror`.

/// Custom result type for safe operations
pub type Result<T> = std::result::Result<T, SafeError>;

/// Main error type for the safe client
#[derive(thiserror::Error, Debug)]
pub enum SafeError {
    /// Nothing exists at the requested path. Callers branch on this
    /// to mean "start from empty" or "nothing to migrate".
    #[error("no secret exists at path '{path}'")]
    NotFound { path: String },

    /// Network-layer failure talking to the backend
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a status the operation does not accept
    #[error("API {status}")]
    Api { status: String },

    /// Too many consecutive 307 responses
    #[error("redirection loop detected")]
    RedirectLoop,

    /// Response could not be interpreted under the expected envelope
    #[error("malformed response from vault: {message}")]
    Malformed { message: String },

    /// JSON serialization/deserialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization/deserialization errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Refused to write a secret with no keys
    #[error("nothing to write")]
    NothingToWrite,

    /// No cluster members could be found
    #[error("no backends detected")]
    NoBackends,

    /// Cluster coordination gave up waiting on name resolution
    #[error("{message}")]
    Timeout { message: String },

    /// A polling loop was cancelled by its caller
    #[error("operation cancelled")]
    Cancelled,

    /// The caller invoked an operation incorrectly
    #[error("USAGE: {0}")]
    Usage(String),

    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A backend address could not be parsed
    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SafeError {
    /// Create a not found error for a path
    pub fn not_found<S: Into<String>>(path: S) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create an API status error from the status text, e.g. "500 Internal Server Error"
    pub fn api<S: Into<String>>(status: S) -> Self {
        Self::Api { status: status.into() }
    }

    /// Create a malformed response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::Malformed { message: message.into() }
    }

    /// Create a usage error
    pub fn usage<S: Into<String>>(message: S) -> Self {
        Self::Usage(message.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create an invalid url error
    pub fn invalid_url<S: Into<String>>(url: S, source: url::ParseError) -> Self {
        Self::InvalidUrl { url: url.into(), source }
    }

    /// The election poll never saw an active member
    pub fn active_node_timeout() -> Self {
        Self::Timeout { message: "timed out determining the active node".to_string() }
    }

    /// The cluster did not elect a replacement after a seal
    pub fn new_active_node_timeout() -> Self {
        Self::Timeout { message: "timed out waiting for a new active node".to_string() }
    }

    /// A name lookup did not answer in time
    pub fn resolve_timeout(name: &str) -> Self {
        Self::Timeout { message: format!("timed out resolving {}", name) }
    }

    /// Check whether this is the distinguished absence condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, SafeError::NotFound { .. })
    }

    /// Check whether this error describes caller misuse rather than an operational failure
    pub fn is_usage(&self) -> bool {
        matches!(self, SafeError::Usage(_))
    }
}
