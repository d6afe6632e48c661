// dizque-core: resource mirrors and the `Dizque` facade over dizque-api.

pub mod channel;
pub mod config;
pub mod defaults;
pub mod dizque;
pub mod error;
pub mod fields;
pub mod logging;
pub mod mirror;
pub mod plex_server;
pub mod resources;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, ErrorHandling};
pub use defaults::ChannelDraft;
pub use dizque::{ChannelTargets, Dizque};
pub use error::CoreError;
pub use fields::{CHANNEL_TEMPLATE, PLEX_SERVER_TEMPLATE, Template, merge};
pub use mirror::{Mirror, Resettable, Resource};
pub use resources::{
    ChannelKind, FfmpegSettingsKind, HdhrSettingsKind, PlexServerKind, PlexSettingsKind,
    SettingsResource, XmltvSettingsKind,
};

// Wire-level types callers need to build requests.
pub use dizque_api::models::{Filler, Program};
pub use dizque_api::{DizqueClient, Fields, TlsMode};
