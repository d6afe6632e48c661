// Server-level endpoints: version information.

use tracing::debug;

use crate::client::DizqueClient;
use crate::error::Error;
use crate::models::Version;

impl DizqueClient {
    /// dizqueTV, FFMPEG and Node.js versions.
    ///
    /// `GET /api/version`
    pub async fn version(&self) -> Result<Version, Error> {
        debug!("fetching version");
        self.get("version").await
    }
}
