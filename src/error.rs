//! Console error types.
//!
//! [`RegistryError`] is what the rule registry returns and records for
//! display. Its `Display` output is the single human-readable message a
//! view shows; the variant and its [`ApiError`] source keep the
//! machine-distinguishable kind.
//!
//! | Error               | Raised by                          | Surfaced to the user |
//! |---------------------|------------------------------------|----------------------|
//! | `RegistryError`     | `RuleRegistry` operations          | yes (last error)     |
//! | `ApiError`          | `OffersApi` implementations        | via `RegistryError`  |
//! | `FeedError`         | live feed ingestion                | never (counted)      |
//! | `ConfigError`       | `ConsoleConfig` loading            | at startup           |

use std::sync::Arc;

use reqwest::StatusCode;

use crate::domain::OfferId;

/// Failure talking to the offers backend over HTTP.
///
/// Cloneable so the registry can both return an error and keep it as the
/// last recorded error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, I/O).
    #[error("transport error: {0}")]
    Transport(#[source] Arc<reqwest::Error>),

    /// The backend answered with a non-success status code.
    #[error("unexpected status: {0}")]
    Status(StatusCode),

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Arc::new(err))
    }
}

/// Error returned by the rule registry controller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// Listing offers failed.
    #[error("Failed to load offers")]
    Fetch(#[source] ApiError),

    /// Creating an offer failed.
    #[error("Failed to create offer")]
    Create(#[source] ApiError),

    /// Updating an existing offer failed.
    #[error("Failed to update offer")]
    Update {
        /// Offer the update targeted.
        id: OfferId,
        /// Underlying transport or status failure.
        #[source]
        source: ApiError,
    },

    /// The draft was rejected before any request was issued.
    #[error("Invalid offer: {0}")]
    InvalidDraft(String),

    /// Another submit is still in flight.
    #[error("A submit is already in progress")]
    SubmitInFlight,
}

impl RegistryError {
    /// Returns the underlying API error, if this error came from the backend.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Fetch(source) | Self::Create(source) | Self::Update { source, .. } => {
                Some(source)
            }
            Self::InvalidDraft(_) | Self::SubmitInFlight => None,
        }
    }
}

/// Error raised while ingesting the live award feed.
///
/// Never propagated past the ingestor: payload errors are counted and
/// traced, connection errors end the connection.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The text frame was not a valid award.
    #[error("malformed award payload: {0}")]
    Parse(#[from] serde_json::Error),

    /// A binary frame arrived where only JSON text is expected.
    #[error("unexpected binary frame of {0} bytes")]
    NonText(usize),

    /// The WebSocket handshake or stream failed.
    #[error("websocket error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Error raised while loading or installing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configured address could not be parsed.
    #[error("invalid {key} `{value}`: {reason}")]
    InvalidUrl {
        /// Environment key that held the value.
        key: &'static str,
        /// The offending value.
        value: String,
        /// Parser or scheme diagnostic.
        reason: String,
    },

    /// [`crate::config::ConsoleConfig::install`] was called more than once.
    #[error("configuration already installed")]
    AlreadyInstalled,
}
