// dizque-api: Async Rust client for the dizqueTV HTTP API

pub mod channels;
pub mod client;
pub mod error;
pub mod guide;
pub mod m3u;
pub mod models;
pub mod plex_servers;
pub mod settings;
pub mod system;
pub mod transport;

pub use client::DizqueClient;
pub use error::Error;
pub use m3u::{Playlist, PlaylistEntry};
pub use models::Fields;
pub use settings::SettingsKind;
pub use transport::{TlsMode, TransportConfig};
pub use xmltree;
