// ── Dizque facade ──
//
// Entry point for consumers. Owns the HTTP client and the channel-creation
// error-handling mode, and hands out `Mirror`s for individual resources.
// Every call is a plain sequence of requests: no background tasks, no
// retries.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, info};

use dizque_api::models::{ChannelInfo, Filler, Program, to_fields};
use dizque_api::xmltree::Element;
use dizque_api::{DizqueClient, Fields, Playlist};

use crate::config::{ClientConfig, ErrorHandling};
use crate::defaults::ChannelDraft;
use crate::error::CoreError;
use crate::fields::{CHANNEL_TEMPLATE, PLEX_SERVER_TEMPLATE};
use crate::mirror::{Mirror, Resource};
use crate::resources::{
    ChannelKind, FfmpegSettingsKind, HdhrSettingsKind, PlexServerKind, PlexSettingsKind,
    SettingsResource, XmltvSettingsKind,
};

/// Channels targeted by a batch operation.
#[derive(Debug)]
pub enum ChannelTargets<'a> {
    /// Already-fetched mirrors; each is reloaded in place.
    Mirrors(&'a mut [Mirror<ChannelKind>]),
    /// Channel numbers, fetched before any write.
    Numbers(&'a [u32]),
}

impl ChannelTargets<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Mirrors(mirrors) => mirrors.is_empty(),
            Self::Numbers(numbers) => numbers.is_empty(),
        }
    }
}

/// A connection to one dizqueTV server.
#[derive(Debug, Clone)]
pub struct Dizque {
    client: Arc<DizqueClient>,
    error_handling: ErrorHandling,
}

impl Dizque {
    /// Build the HTTP client from configuration. Does not contact the server.
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let client = DizqueClient::new(config.url.as_str(), &config.transport())?;
        Ok(Self::from_client(client, config.error_handling))
    }

    pub fn from_client(client: DizqueClient, error_handling: ErrorHandling) -> Self {
        Self {
            client: Arc::new(client),
            error_handling,
        }
    }

    pub fn client(&self) -> &DizqueClient {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn error_handling(&self) -> ErrorHandling {
        self.error_handling
    }

    // ── Versions ─────────────────────────────────────────────────────

    pub async fn dizquetv_version(&self) -> Result<String, CoreError> {
        self.client
            .version()
            .await?
            .dizquetv
            .ok_or_else(|| missing_version("dizquetv"))
    }

    pub async fn ffmpeg_version(&self) -> Result<String, CoreError> {
        self.client
            .version()
            .await?
            .ffmpeg
            .ok_or_else(|| missing_version("ffmpeg"))
    }

    // ── Plex servers ─────────────────────────────────────────────────

    pub async fn plex_servers(&self) -> Result<Vec<Mirror<PlexServerKind>>, CoreError> {
        self.client
            .list_plex_servers()
            .await?
            .into_iter()
            .map(|fields| Mirror::from_fields(Arc::clone(&self.client), fields))
            .collect()
    }

    pub async fn get_plex_server(
        &self,
        name: &str,
    ) -> Result<Option<Mirror<PlexServerKind>>, CoreError> {
        found(Mirror::fetch(Arc::clone(&self.client), name.to_owned()).await)
    }

    pub async fn plex_server_status(&self, name: &str) -> Result<bool, CoreError> {
        Ok(self.client.plex_server_status(name).await?)
    }

    pub async fn plex_server_foreign_status(&self, name: &str) -> Result<bool, CoreError> {
        Ok(self.client.plex_server_foreign_status(name).await?)
    }

    /// Register a Plex server. `fields` must carry every template key.
    pub async fn add_plex_server(
        &self,
        fields: &Fields,
    ) -> Result<Mirror<PlexServerKind>, CoreError> {
        PLEX_SERVER_TEMPLATE.validate(fields)?;
        let name = PlexServerKind::key_of(fields)?;
        info!(%name, "adding Plex server");
        self.client.add_plex_server(fields).await?;
        self.read_back::<PlexServerKind>(name).await
    }

    /// Register a Plex server under the lowest unused `index`, with
    /// automatic channel and guide updates enabled.
    pub async fn add_plex_server_auto_index(
        &self,
        name: &str,
        uri: &str,
        access_token: &str,
    ) -> Result<Mirror<PlexServerKind>, CoreError> {
        let used: Vec<i64> = self
            .client
            .list_plex_servers()
            .await?
            .iter()
            .filter_map(|s| s.get("index").and_then(Value::as_i64))
            .collect();
        let index = (0_i64..).find(|i| !used.contains(i)).unwrap_or_default();
        debug!(name, index, "picked Plex server index");

        let mut fields = Fields::new();
        fields.insert("name".into(), json!(name));
        fields.insert("uri".into(), json!(uri));
        fields.insert("accessToken".into(), json!(access_token));
        fields.insert("index".into(), json!(index));
        fields.insert("arChannels".into(), json!(true));
        fields.insert("arGuide".into(), json!(true));
        self.add_plex_server(&fields).await
    }

    pub async fn update_plex_server(
        &self,
        name: &str,
        partial: &Fields,
    ) -> Result<Mirror<PlexServerKind>, CoreError> {
        let mut server = Mirror::<PlexServerKind>::fetch(Arc::clone(&self.client), name.to_owned())
            .await?;
        server.update(partial).await?;
        Ok(server)
    }

    pub async fn delete_plex_server(&self, name: &str) -> Result<(), CoreError> {
        info!(name, "deleting Plex server");
        self.client
            .delete_plex_server(name)
            .await
            .map_err(|e| CoreError::from_api(e, PlexServerKind::KIND, &name))
    }

    // ── Channels ─────────────────────────────────────────────────────

    pub async fn channels(&self) -> Result<Vec<Mirror<ChannelKind>>, CoreError> {
        self.client
            .list_channels()
            .await?
            .into_iter()
            .map(|fields| Mirror::from_fields(Arc::clone(&self.client), fields))
            .collect()
    }

    pub async fn get_channel(&self, number: u32) -> Result<Option<Mirror<ChannelKind>>, CoreError> {
        found(Mirror::fetch(Arc::clone(&self.client), number).await)
    }

    pub async fn get_channel_info(&self, number: u32) -> Result<ChannelInfo, CoreError> {
        self.client
            .get_channel_info(number)
            .await
            .map_err(|e| CoreError::from_api(e, ChannelKind::KIND, &number))
    }

    pub async fn channel_numbers(&self) -> Result<Vec<u32>, CoreError> {
        Ok(self.client.channel_numbers().await?)
    }

    /// Create a channel using the configured error-handling mode.
    ///
    /// Non-empty `programs` replace any `programs` entry in `fields`.
    pub async fn add_channel(
        &self,
        programs: &[Program],
        fields: Fields,
    ) -> Result<Mirror<ChannelKind>, CoreError> {
        self.add_channel_with(programs, fields, self.error_handling)
            .await
    }

    pub async fn add_channel_with(
        &self,
        programs: &[Program],
        mut fields: Fields,
        mode: ErrorHandling,
    ) -> Result<Mirror<ChannelKind>, CoreError> {
        if !programs.is_empty() {
            let encoded = programs
                .iter()
                .map(|p| to_fields(p).map(Value::Object))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CoreError::Internal(e.to_string()))?;
            fields.insert("programs".into(), Value::Array(encoded));
        }

        let existing = self.client.channel_numbers().await?;
        let channel = ChannelDraft {
            existing_numbers: &existing,
            server: &self.client,
            now: Utc::now(),
            mode,
        }
        .fill_defaults(fields)?;
        CHANNEL_TEMPLATE.validate(&channel)?;

        let number = ChannelKind::key_of(&channel)?;
        info!(number, "creating channel");
        self.client.add_channel(&channel).await?;
        self.read_back::<ChannelKind>(number).await
    }

    pub async fn update_channel(
        &self,
        number: u32,
        partial: &Fields,
    ) -> Result<Mirror<ChannelKind>, CoreError> {
        let mut channel = Mirror::<ChannelKind>::fetch(Arc::clone(&self.client), number).await?;
        channel.update(partial).await?;
        Ok(channel)
    }

    pub async fn delete_channel(&self, number: u32) -> Result<(), CoreError> {
        info!(number, "deleting channel");
        self.client
            .delete_channel(number)
            .await
            .map_err(|e| CoreError::from_api(e, ChannelKind::KIND, &number))
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub async fn settings<K: SettingsResource>(&self) -> Result<Mirror<K>, CoreError> {
        let fields = self.client.get_settings(K::SETTINGS).await?;
        Mirror::from_fields(Arc::clone(&self.client), fields)
    }

    pub async fn update_settings<K: SettingsResource>(
        &self,
        partial: &Fields,
    ) -> Result<Mirror<K>, CoreError> {
        let mut settings = self.settings::<K>().await?;
        settings.update(partial).await?;
        Ok(settings)
    }

    pub async fn reset_settings<K: SettingsResource>(&self) -> Result<Mirror<K>, CoreError> {
        let mut settings = self.settings::<K>().await?;
        settings.reset().await?;
        Ok(settings)
    }

    pub async fn ffmpeg_settings(&self) -> Result<Mirror<FfmpegSettingsKind>, CoreError> {
        self.settings().await
    }

    pub async fn update_ffmpeg_settings(
        &self,
        partial: &Fields,
    ) -> Result<Mirror<FfmpegSettingsKind>, CoreError> {
        self.update_settings(partial).await
    }

    pub async fn reset_ffmpeg_settings(&self) -> Result<Mirror<FfmpegSettingsKind>, CoreError> {
        self.reset_settings().await
    }

    pub async fn plex_settings(&self) -> Result<Mirror<PlexSettingsKind>, CoreError> {
        self.settings().await
    }

    pub async fn update_plex_settings(
        &self,
        partial: &Fields,
    ) -> Result<Mirror<PlexSettingsKind>, CoreError> {
        self.update_settings(partial).await
    }

    pub async fn reset_plex_settings(&self) -> Result<Mirror<PlexSettingsKind>, CoreError> {
        self.reset_settings().await
    }

    pub async fn xmltv_settings(&self) -> Result<Mirror<XmltvSettingsKind>, CoreError> {
        self.settings().await
    }

    pub async fn update_xmltv_settings(
        &self,
        partial: &Fields,
    ) -> Result<Mirror<XmltvSettingsKind>, CoreError> {
        self.update_settings(partial).await
    }

    pub async fn reset_xmltv_settings(&self) -> Result<Mirror<XmltvSettingsKind>, CoreError> {
        self.reset_settings().await
    }

    pub async fn hdhr_settings(&self) -> Result<Mirror<HdhrSettingsKind>, CoreError> {
        self.settings().await
    }

    pub async fn update_hdhr_settings(
        &self,
        partial: &Fields,
    ) -> Result<Mirror<HdhrSettingsKind>, CoreError> {
        self.update_settings(partial).await
    }

    pub async fn reset_hdhr_settings(&self) -> Result<Mirror<HdhrSettingsKind>, CoreError> {
        self.reset_settings().await
    }

    // ── Guide ────────────────────────────────────────────────────────

    pub async fn last_xmltv_refresh(&self) -> Result<String, CoreError> {
        Ok(self.client.xmltv_last_refresh().await?)
    }

    /// Ask the server to regenerate the XMLTV guide.
    ///
    /// Any write to the XMLTV settings triggers regeneration, so the
    /// current bundle is written back unchanged.
    pub async fn refresh_xml(&self) -> Result<(), CoreError> {
        debug!("refreshing XMLTV guide");
        self.update_settings::<XmltvSettingsKind>(&Fields::new())
            .await
            .map(drop)
    }

    /// Refresh the guide, then fetch and parse it.
    pub async fn xmltv_xml(&self) -> Result<Element, CoreError> {
        self.refresh_xml().await?;
        Ok(self.client.xmltv_xml().await?)
    }

    pub async fn m3u(&self) -> Result<Playlist, CoreError> {
        Ok(self.client.m3u().await?)
    }

    // ── Batch ────────────────────────────────────────────────────────

    /// Append `programs` to every target channel.
    ///
    /// Stops at the first failure and returns its error; channels updated
    /// before it keep their new programs.
    pub async fn add_programs_to_channels(
        &self,
        programs: &[Program],
        targets: ChannelTargets<'_>,
    ) -> Result<(), CoreError> {
        match targets {
            ChannelTargets::Mirrors(mirrors) if !mirrors.is_empty() => {
                for channel in mirrors.iter_mut() {
                    channel.add_programs(programs).await?;
                }
            }
            ChannelTargets::Numbers(numbers) if !numbers.is_empty() => {
                for mut channel in self.resolve_channels(numbers).await? {
                    channel.add_programs(programs).await?;
                }
            }
            _ => return Err(no_targets()),
        }
        Ok(())
    }

    /// Append `fillers` to every target channel. Same failure semantics as
    /// [`add_programs_to_channels`](Self::add_programs_to_channels).
    pub async fn add_fillers_to_channels(
        &self,
        fillers: &[Filler],
        targets: ChannelTargets<'_>,
    ) -> Result<(), CoreError> {
        match targets {
            ChannelTargets::Mirrors(mirrors) if !mirrors.is_empty() => {
                for channel in mirrors.iter_mut() {
                    channel.add_fillers(fillers).await?;
                }
            }
            ChannelTargets::Numbers(numbers) if !numbers.is_empty() => {
                for mut channel in self.resolve_channels(numbers).await? {
                    channel.add_fillers(fillers).await?;
                }
            }
            _ => return Err(no_targets()),
        }
        Ok(())
    }

    async fn resolve_channels(&self, numbers: &[u32]) -> Result<Vec<Mirror<ChannelKind>>, CoreError> {
        let mut channels = Vec::with_capacity(numbers.len());
        for &number in numbers {
            channels.push(Mirror::fetch(Arc::clone(&self.client), number).await?);
        }
        Ok(channels)
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Fetch a resource that was just written.
    async fn read_back<K: Resource>(&self, key: K::Key) -> Result<Mirror<K>, CoreError> {
        Mirror::fetch(Arc::clone(&self.client), key.clone())
            .await
            .map_err(|source| CoreError::ReadBack {
                kind: K::KIND.into(),
                key: key.to_string(),
                source: Box::new(source),
            })
    }
}

/// Turn a not-found lookup into `None`.
fn found<T>(result: Result<T, CoreError>) -> Result<Option<T>, CoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn missing_version(component: &str) -> CoreError {
    CoreError::InvalidResource {
        kind: "version".into(),
        message: format!("server did not report a {component} version"),
    }
}

fn no_targets() -> CoreError {
    CoreError::MissingParameters {
        message: "Please include either a list of channels or a list of channel numbers.".into(),
    }
}
