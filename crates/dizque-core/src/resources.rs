// ── Resource kinds ──
//
// Zero-sized tags binding each dizqueTV resource to its key, typed view
// and endpoints.

use serde_json::Value;

use dizque_api::models::{
    Channel, FfmpegSettings, HdhrSettings, PlexServer, PlexSettings, XmltvSettings,
};
use dizque_api::{DizqueClient, Fields, SettingsKind};

use crate::error::CoreError;
use crate::mirror::{Resettable, Resource};

fn missing_key(kind: &str, field: &str) -> CoreError {
    CoreError::InvalidResource {
        kind: kind.into(),
        message: format!("missing or invalid `{field}`"),
    }
}

// ── Settings bundles ─────────────────────────────────────────────────

/// A singleton settings bundle, keyed by its `_id`.
pub trait SettingsResource: Resettable<Key = String> {
    const SETTINGS: SettingsKind;
}

macro_rules! settings_kind {
    ($(#[$doc:meta])* $tag:ident, $view:ty, $settings:expr, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $tag;

        impl Resource for $tag {
            type Key = String;
            type View = $view;

            const KIND: &'static str = $label;

            fn key_of(fields: &Fields) -> Result<String, CoreError> {
                fields
                    .get(Self::ID_FIELD)
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .ok_or_else(|| missing_key(Self::KIND, Self::ID_FIELD))
            }

            async fn fetch(client: &DizqueClient, _key: &String) -> Result<Fields, CoreError> {
                Ok(client.get_settings(Self::SETTINGS).await?)
            }

            async fn write(
                client: &DizqueClient,
                _key: &String,
                fields: &Fields,
            ) -> Result<(), CoreError> {
                Ok(client.update_settings(Self::SETTINGS, fields).await?)
            }
        }

        impl Resettable for $tag {
            async fn reset(client: &DizqueClient, key: &String) -> Result<(), CoreError> {
                Ok(client.reset_settings(Self::SETTINGS, key).await?)
            }
        }

        impl SettingsResource for $tag {
            const SETTINGS: SettingsKind = $settings;
        }
    };
}

settings_kind!(
    /// `ffmpeg-settings`: transcoding options.
    FfmpegSettingsKind,
    FfmpegSettings,
    SettingsKind::Ffmpeg,
    "FFMPEG settings"
);
settings_kind!(
    /// `plex-settings`: how media is pulled from Plex.
    PlexSettingsKind,
    PlexSettings,
    SettingsKind::Plex,
    "Plex settings"
);
settings_kind!(
    /// `xmltv-settings`: guide generation.
    XmltvSettingsKind,
    XmltvSettings,
    SettingsKind::Xmltv,
    "XMLTV settings"
);
settings_kind!(
    /// `hdhr-settings`: HDHomeRun emulation.
    HdhrSettingsKind,
    HdhrSettings,
    SettingsKind::Hdhr,
    "HDHR settings"
);

// ── Channels ─────────────────────────────────────────────────────────

/// A channel, keyed by its number.
#[derive(Debug, Clone, Copy)]
pub struct ChannelKind;

impl Resource for ChannelKind {
    type Key = u32;
    type View = Channel;

    const KIND: &'static str = "channel";

    fn key_of(fields: &Fields) -> Result<u32, CoreError> {
        fields
            .get("number")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| missing_key(Self::KIND, "number"))
    }

    async fn fetch(client: &DizqueClient, key: &u32) -> Result<Fields, CoreError> {
        client
            .get_channel(*key)
            .await
            .map_err(|e| CoreError::from_api(e, Self::KIND, key))
    }

    async fn write(client: &DizqueClient, key: &u32, fields: &Fields) -> Result<(), CoreError> {
        client
            .update_channel(fields)
            .await
            .map_err(|e| CoreError::from_api(e, Self::KIND, key))
    }
}

// ── Plex servers ─────────────────────────────────────────────────────

/// A registered Plex Media Server, keyed by its name.
#[derive(Debug, Clone, Copy)]
pub struct PlexServerKind;

impl Resource for PlexServerKind {
    type Key = String;
    type View = PlexServer;

    const KIND: &'static str = "Plex server";
    // Updates are matched by name.
    const RENAMABLE: bool = false;

    fn key_of(fields: &Fields) -> Result<String, CoreError> {
        fields
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| missing_key(Self::KIND, "name"))
    }

    /// The server has no single-item endpoint; the list is searched by name.
    async fn fetch(client: &DizqueClient, key: &String) -> Result<Fields, CoreError> {
        client
            .list_plex_servers()
            .await?
            .into_iter()
            .find(|s| s.get("name").and_then(Value::as_str) == Some(key.as_str()))
            .ok_or_else(|| CoreError::not_found(Self::KIND, key))
    }

    async fn write(client: &DizqueClient, key: &String, fields: &Fields) -> Result<(), CoreError> {
        client
            .update_plex_server(fields)
            .await
            .map_err(|e| CoreError::from_api(e, Self::KIND, key))
    }
}
