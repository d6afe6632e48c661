// Settings bundles
//
// FFMPEG, Plex, XMLTV and HDHomeRun settings share one REST shape:
// GET returns the bundle, PUT replaces it, and POST with `{"_id": ...}`
// restores server defaults.

use std::fmt;

use serde_json::json;
use tracing::debug;

use crate::client::DizqueClient;
use crate::error::Error;
use crate::models::Fields;

/// Which settings bundle an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsKind {
    Ffmpeg,
    Plex,
    Xmltv,
    Hdhr,
}

impl SettingsKind {
    pub const ALL: [Self; 4] = [Self::Ffmpeg, Self::Plex, Self::Xmltv, Self::Hdhr];

    /// Endpoint path under `/api`.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Ffmpeg => "ffmpeg-settings",
            Self::Plex => "plex-settings",
            Self::Xmltv => "xmltv-settings",
            Self::Hdhr => "hdhr-settings",
        }
    }
}

impl fmt::Display for SettingsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ffmpeg => "FFMPEG settings",
            Self::Plex => "Plex settings",
            Self::Xmltv => "XMLTV settings",
            Self::Hdhr => "HDHomeRun settings",
        };
        f.write_str(label)
    }
}

impl DizqueClient {
    /// `GET /api/{kind}-settings`
    pub async fn get_settings(&self, kind: SettingsKind) -> Result<Fields, Error> {
        debug!(%kind, "fetching settings");
        self.get(kind.endpoint()).await
    }

    /// Replace the whole bundle.
    ///
    /// `PUT /api/{kind}-settings`
    pub async fn update_settings(&self, kind: SettingsKind, settings: &Fields) -> Result<(), Error> {
        debug!(%kind, "updating settings");
        self.put(kind.endpoint(), settings).await?;
        Ok(())
    }

    /// Restore server defaults for the bundle with the given `_id`.
    ///
    /// `POST /api/{kind}-settings` with `{"_id": ...}`
    pub async fn reset_settings(&self, kind: SettingsKind, id: &str) -> Result<(), Error> {
        debug!(%kind, id, "resetting settings");
        self.post(kind.endpoint(), &json!({ "_id": id })).await?;
        Ok(())
    }
}
