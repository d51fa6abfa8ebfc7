use thiserror::Error;

use crate::domain::error::SpecValidationError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors returned by the cluster adapter.
///
/// `Transport` covers transient failures (connection refused, timeout, 5xx)
/// that the next scheduled re-sync is expected to heal. `Rejected` means the
/// cluster refused the resource as constructed and retrying the same object
/// cannot succeed.
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("cluster transport failure: {reason}")]
    Transport {
        reason: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("cluster rejected {kind} {name}: {reason}")]
    Rejected {
        kind: String,
        name: String,
        reason: String,
    },
}

impl ClusterError {
    /// Transport failure without an underlying HTTP cause, for fakes and
    /// non-HTTP adapters.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
            source: None,
        }
    }

    /// True when a later identical attempt could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Spec(#[from] SpecValidationError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(err))
    }
}
