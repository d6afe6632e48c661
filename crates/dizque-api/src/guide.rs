// Guide and playlist endpoints: XMLTV refresh time, the XMLTV document
// itself and the M3U channel playlist.

use tracing::debug;
use xmltree::Element;

use crate::client::DizqueClient;
use crate::error::Error;
use crate::m3u::{self, Playlist};

impl DizqueClient {
    /// When the server last regenerated `xmltv.xml`.
    ///
    /// `GET /api/xmltv-last-refresh`. Depending on the server version this
    /// is a JSON string or an epoch number; both come back as text.
    pub async fn xmltv_last_refresh(&self) -> Result<String, Error> {
        debug!("fetching xmltv last refresh");
        let value: serde_json::Value = self.get("xmltv-last-refresh").await?;
        Ok(match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
    }

    /// The generated XMLTV guide, parsed into a generic element tree.
    ///
    /// `GET /api/xmltv.xml`
    pub async fn xmltv_xml(&self) -> Result<Element, Error> {
        debug!("fetching xmltv.xml");
        let body = self.get_text("xmltv.xml").await?;
        Element::parse(body.as_bytes()).map_err(|e| Error::Xml(e.to_string()))
    }

    /// The channel playlist.
    ///
    /// `GET /api/channels.m3u`
    pub async fn m3u(&self) -> Result<Playlist, Error> {
        debug!("fetching channels.m3u");
        let body = self.get_text("channels.m3u").await?;
        m3u::parse(&body)
    }
}
