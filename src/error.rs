//! tldw error types

/// tldw error types
#[derive(Debug, thiserror::Error)]
pub enum TldwError {
    // Registry errors
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unsupported provider type: {0}")]
    UnsupportedProvider(String),

    /// Durable write or read of the settings blob failed.
    ///
    /// The registry swallows this on mutation paths and reports it through
    /// its [`Notifier`](crate::registry::Notifier) instead.
    #[error("failed to persist settings: {0}")]
    Persistence(String),

    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("empty response from model")]
    EmptyResponse,

    // Pipeline errors
    #[error("no model selected")]
    NoModelSelected,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl TldwError {
    /// Map a non-success HTTP status into the matching error variant.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => TldwError::AuthenticationFailed,
            code => TldwError::Api {
                status: code,
                message: body,
            },
        }
    }

    /// Whether this error came from a registry invariant check.
    ///
    /// These are the errors the presentation layer shows verbatim and after
    /// which the registry state is unchanged.
    pub fn is_registry_rejection(&self) -> bool {
        matches!(
            self,
            TldwError::Validation(_) | TldwError::NotFound(_) | TldwError::Conflict(_)
        )
    }
}

impl From<reqwest::Error> for TldwError {
    fn from(err: reqwest::Error) -> Self {
        TldwError::Http(err.to_string())
    }
}

/// Result type alias for tldw operations
pub type Result<T> = std::result::Result<T, TldwError>;
