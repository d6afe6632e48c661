// dizqueTV response types
//
// The server's JSON schema is loose and changes between releases, so every
// model keeps `#[serde(default)]` on optional fields and a flattened
// `extra` map for anything not modelled here. Resources themselves travel
// through the client as opaque `Fields`; these structs are typed views.

use serde::{Deserialize, Serialize};

/// Opaque field map of one remote resource.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Serialize a model into an opaque field map.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, serde_json::Error> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

// ── Version ──────────────────────────────────────────────────────────

/// `GET /api/version`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Version {
    #[serde(default)]
    pub dizquetv: Option<String>,
    #[serde(default)]
    pub ffmpeg: Option<String>,
    #[serde(default)]
    pub nodejs: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

// ── Channels ─────────────────────────────────────────────────────────

/// `GET /api/channel/description/{number}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub name: String,
    pub number: u32,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

/// One entry of a channel's `programs` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<i32>,
    /// "movie", "episode", "track" or "redirect".
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub program_type: Option<String>,
    /// Milliseconds.
    #[serde(default)]
    pub duration: u64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_offline: bool,
    /// Target channel of a redirect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plex_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Program {
    /// Flex time: the channel shows its offline screen for `duration` ms.
    pub fn offline(duration: u64) -> Self {
        Self {
            duration,
            is_offline: true,
            ..Self::default()
        }
    }

    /// Redirect viewers to another channel for `duration` ms.
    pub fn redirect(channel: u32, duration: u64) -> Self {
        Self {
            duration,
            is_offline: true,
            program_type: Some("redirect".into()),
            channel: Some(channel),
            ..Self::default()
        }
    }

    pub fn is_redirect(&self) -> bool {
        self.program_type.as_deref() == Some("redirect")
    }
}

/// One entry of a channel's `fillerContent` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub filler_type: Option<String>,
    #[serde(default)]
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plex_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

/// Typed view of a full channel object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub filler_content: Vec<Filler>,
    #[serde(default)]
    pub filler_repeat_cooldown: Option<u64>,
    #[serde(default)]
    pub offline_picture: Option<String>,
    #[serde(default)]
    pub offline_soundtrack: Option<String>,
    #[serde(default)]
    pub offline_mode: Option<String>,
    #[serde(default)]
    pub stealth: Option<bool>,
    #[serde(flatten)]
    pub extra: Fields,
}

// ── Plex servers ─────────────────────────────────────────────────────

/// A Plex Media Server registered with dizqueTV.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexServer {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub ar_channels: bool,
    #[serde(default)]
    pub ar_guide: bool,
    #[serde(flatten)]
    pub extra: Fields,
}

// ── Settings ─────────────────────────────────────────────────────────

/// `GET /api/ffmpeg-settings`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FfmpegSettings {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub config_version: Option<u32>,
    #[serde(default)]
    pub ffmpeg_path: Option<String>,
    #[serde(default)]
    pub threads: Option<u32>,
    /// Sent as a string by most server versions.
    #[serde(default)]
    pub concat_mux_delay: Option<serde_json::Value>,
    #[serde(default)]
    pub log_ffmpeg: Option<bool>,
    #[serde(default, rename = "enableFFMPEGTranscoding")]
    pub enable_ffmpeg_transcoding: Option<bool>,
    #[serde(default)]
    pub audio_volume_percent: Option<u32>,
    #[serde(default)]
    pub video_encoder: Option<String>,
    #[serde(default)]
    pub audio_encoder: Option<String>,
    #[serde(default)]
    pub target_resolution: Option<String>,
    #[serde(default)]
    pub video_bitrate: Option<u64>,
    #[serde(default)]
    pub video_buf_size: Option<u64>,
    #[serde(default)]
    pub audio_bitrate: Option<u64>,
    #[serde(default)]
    pub audio_buf_size: Option<u64>,
    #[serde(default)]
    pub audio_sample_rate: Option<u64>,
    #[serde(default)]
    pub audio_channels: Option<u32>,
    #[serde(default)]
    pub error_screen: Option<String>,
    #[serde(default)]
    pub error_audio: Option<String>,
    #[serde(default)]
    pub normalize_video_codec: Option<bool>,
    #[serde(default)]
    pub normalize_audio_codec: Option<bool>,
    #[serde(default)]
    pub normalize_resolution: Option<bool>,
    #[serde(default)]
    pub normalize_audio: Option<bool>,
    #[serde(flatten)]
    pub extra: Fields,
}

/// `GET /api/plex-settings`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexSettings {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub stream_path: Option<String>,
    #[serde(default)]
    pub debug_logging: Option<bool>,
    #[serde(default)]
    pub transcode_bitrate: Option<u64>,
    #[serde(default)]
    pub media_buffer_size: Option<u64>,
    #[serde(default)]
    pub transcode_media_buffer_size: Option<u64>,
    #[serde(default)]
    pub max_playable_resolution: Option<String>,
    #[serde(default)]
    pub max_transcode_resolution: Option<String>,
    #[serde(default)]
    pub video_codecs: Option<String>,
    #[serde(default)]
    pub audio_codecs: Option<String>,
    #[serde(default)]
    pub max_audio_channels: Option<String>,
    #[serde(default)]
    pub audio_boost: Option<String>,
    #[serde(default)]
    pub enable_subtitles: Option<bool>,
    #[serde(default)]
    pub subtitle_size: Option<String>,
    #[serde(default)]
    pub update_play_status: Option<bool>,
    #[serde(default)]
    pub stream_protocol: Option<String>,
    #[serde(default)]
    pub force_direct_play: Option<bool>,
    #[serde(default)]
    pub path_replace: Option<String>,
    #[serde(default)]
    pub path_replace_with: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

/// `GET /api/xmltv-settings`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XmltvSettings {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    /// Hours of guide data to generate.
    #[serde(default)]
    pub cache: Option<u32>,
    /// Hours between regenerations.
    #[serde(default)]
    pub refresh: Option<u32>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

/// `GET /api/hdhr-settings`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HdhrSettings {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub tuner_count: Option<u32>,
    #[serde(default)]
    pub auto_discovery: Option<bool>,
    #[serde(flatten)]
    pub extra: Fields,
}
