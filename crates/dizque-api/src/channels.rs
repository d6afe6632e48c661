// Channel endpoints
//
// Channels are addressed by number. Reads use `/channel/{number}`; writes
// go to `/channel` with the full channel object in the body.

use serde_json::json;
use tracing::debug;

use crate::client::DizqueClient;
use crate::error::Error;
use crate::models::{ChannelInfo, Fields};

impl DizqueClient {
    /// Every channel with its full program list.
    ///
    /// `GET /api/channels` (uses the longer channel-listing timeout)
    pub async fn list_channels(&self) -> Result<Vec<Fields>, Error> {
        debug!("listing channels");
        self.get_with_timeout("channels", self.channels_timeout())
            .await
    }

    /// `GET /api/channel/{number}`
    pub async fn get_channel(&self, number: u32) -> Result<Fields, Error> {
        debug!(number, "fetching channel");
        self.get(&format!("channel/{number}")).await
    }

    /// Name, number and icon only.
    ///
    /// `GET /api/channel/description/{number}`
    pub async fn get_channel_info(&self, number: u32) -> Result<ChannelInfo, Error> {
        debug!(number, "fetching channel description");
        self.get(&format!("channel/description/{number}")).await
    }

    /// `GET /api/channelNumbers`
    pub async fn channel_numbers(&self) -> Result<Vec<u32>, Error> {
        debug!("listing channel numbers");
        self.get("channelNumbers").await
    }

    /// `PUT /api/channel`
    pub async fn add_channel(&self, channel: &Fields) -> Result<(), Error> {
        debug!("creating channel");
        self.put("channel", channel).await?;
        Ok(())
    }

    /// `POST /api/channel`
    pub async fn update_channel(&self, channel: &Fields) -> Result<(), Error> {
        debug!("updating channel");
        self.post("channel", channel).await?;
        Ok(())
    }

    /// `DELETE /api/channel` with `{"number": ...}`
    pub async fn delete_channel(&self, number: u32) -> Result<(), Error> {
        debug!(number, "deleting channel");
        self.delete("channel", &json!({ "number": number })).await?;
        Ok(())
    }
}
