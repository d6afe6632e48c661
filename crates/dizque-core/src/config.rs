// ── Runtime connection configuration ──
//
// These types describe *how* to talk to a dizqueTV server. They never
// touch disk; `dizque-config` builds a `ClientConfig` from profiles.

use std::time::Duration;

use url::Url;

use dizque_api::transport::{DEFAULT_CHANNELS_TIMEOUT, DEFAULT_TIMEOUT};
use dizque_api::{TlsMode, TransportConfig};

/// How channel creation reacts to a bad or conflicting request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorHandling {
    /// Reject with a structured error.
    #[default]
    Strict,
    /// Repair the request: reassign a taken channel number, substitute an
    /// offline program for an empty program list.
    Lenient,
}

/// Configuration for one dizqueTV server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root (e.g., `http://localhost:8000`).
    pub url: Url,
    pub tls: TlsMode,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Timeout for the full channel listing.
    pub channels_timeout: Duration,
    pub error_handling: ErrorHandling,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsMode::default(),
            timeout: DEFAULT_TIMEOUT,
            channels_timeout: DEFAULT_CHANNELS_TIMEOUT,
            error_handling: ErrorHandling::default(),
        }
    }

    pub fn with_error_handling(mut self, mode: ErrorHandling) -> Self {
        self.error_handling = mode;
        self
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            ..TransportConfig::default()
        }
        .with_timeout(self.timeout)
        .with_channels_timeout(self.channels_timeout)
    }
}
