// ── Core error types ──
//
// Domain errors from dizque-core. Transport failures, missing remote
// resources and client-side validation rejections are separate variants,
// so callers can tell a configuration mistake from a flaky network.
// The `From<dizque_api::Error>` impl translates transport-layer errors.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to dizqueTV at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to dizqueTV timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{kind} not found: {key}")]
    NotFound { kind: String, key: String },

    #[error("Invalid {kind} returned by server: {message}")]
    InvalidResource { kind: String, message: String },

    // ── Validation errors ────────────────────────────────────────────
    #[error("{kind} is missing required fields: {}", .missing.join(", "))]
    MissingFields { kind: String, missing: Vec<String> },

    #[error("Channel creation error: {message}")]
    ChannelCreation { message: String },

    #[error("Missing parameters: {message}")]
    MissingParameters { message: String },

    #[error("{kind} {from} cannot be renamed to {to}")]
    KeyChange { kind: String, from: String, to: String },

    // ── Partial failure ──────────────────────────────────────────────
    /// The write was accepted but re-fetching the resource failed; the
    /// local snapshot is stale.
    #[error("{kind} {key} was written but could not be re-read: {source}")]
    ReadBack {
        kind: String,
        key: String,
        #[source]
        source: Box<CoreError>,
    },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The remote resource does not exist (or no longer exists).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Network-level failure; the request may succeed if repeated.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout => true,
            Self::Api { status, .. } => status.is_some_and(|s| s >= 500),
            _ => false,
        }
    }

    /// Rejected client-side before any write was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingFields { .. }
                | Self::ChannelCreation { .. }
                | Self::MissingParameters { .. }
                | Self::KeyChange { .. }
        )
    }

    pub(crate) fn not_found(kind: impl Into<String>, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind: kind.into(),
            key: key.to_string(),
        }
    }

    /// Attach resource context to a 404 coming out of the API layer.
    pub(crate) fn from_api(err: dizque_api::Error, kind: &str, key: &impl std::fmt::Display) -> Self {
        if err.is_not_found() {
            Self::not_found(kind, key)
        } else {
            err.into()
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<dizque_api::Error> for CoreError {
    fn from(err: dizque_api::Error) -> Self {
        match err {
            dizque_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            dizque_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            dizque_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            dizque_api::Error::NotFound { path } => CoreError::NotFound {
                kind: "resource".into(),
                key: path,
            },
            dizque_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            dizque_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            dizque_api::Error::Xml(message) => CoreError::InvalidResource {
                kind: "XMLTV document".into(),
                message,
            },
            dizque_api::Error::Playlist(message) => CoreError::InvalidResource {
                kind: "M3U playlist".into(),
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_404_maps_to_not_found_with_context() {
        let err = CoreError::from_api(
            dizque_api::Error::NotFound {
                path: "/api/channel/9".into(),
            },
            "channel",
            &9,
        );
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "channel not found: 9");
    }

    #[test]
    fn server_error_is_transient_validation_is_not() {
        let err: CoreError = dizque_api::Error::Api {
            status: 503,
            message: "busy".into(),
        }
        .into();
        assert!(err.is_transient());
        assert!(!err.is_validation());

        let missing = CoreError::MissingFields {
            kind: "channel".into(),
            missing: vec!["name".into(), "number".into()],
        };
        assert!(missing.is_validation());
        assert_eq!(
            missing.to_string(),
            "channel is missing required fields: name, number"
        );
    }
}
