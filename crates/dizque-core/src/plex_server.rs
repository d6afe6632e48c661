// ── Plex server mirror operations ──

use tracing::debug;

use crate::error::CoreError;
use crate::mirror::Mirror;
use crate::resources::PlexServerKind;

impl Mirror<PlexServerKind> {
    pub fn name(&self) -> &str {
        self.key()
    }

    /// Whether dizqueTV can reach this server.
    pub async fn status(&self) -> Result<bool, CoreError> {
        Ok(self.client().plex_server_status(self.name()).await?)
    }

    /// Whether the server is reachable through its configured public URI.
    pub async fn foreign_status(&self) -> Result<bool, CoreError> {
        Ok(self.client().plex_server_foreign_status(self.name()).await?)
    }

    /// Remove this server from dizqueTV, consuming the mirror.
    pub async fn delete(self) -> Result<(), CoreError> {
        debug!(name = self.name(), "deleting Plex server");
        self.client()
            .delete_plex_server(self.name())
            .await
            .map_err(|e| CoreError::from_api(e, "Plex server", &self.name()))
    }
}
