// Plex Media Server registrations
//
// dizqueTV identifies servers by name; writes carry the full server
// object and deletes carry `{ "name": ... }` in the body.

use serde_json::json;
use tracing::debug;

use crate::client::DizqueClient;
use crate::error::Error;
use crate::models::Fields;

impl DizqueClient {
    /// List every Plex server known to dizqueTV.
    ///
    /// `GET /api/plex-servers`
    pub async fn list_plex_servers(&self) -> Result<Vec<Fields>, Error> {
        debug!("listing plex servers");
        self.get("plex-servers").await
    }

    /// Ask dizqueTV whether it can reach the named server.
    ///
    /// `POST /api/plex-servers/status` with `{"name": ...}`
    pub async fn plex_server_status(&self, name: &str) -> Result<bool, Error> {
        debug!(name, "checking plex server status");
        self.status_probe("plex-servers/status", name).await
    }

    /// Ask dizqueTV whether the named server can reach dizqueTV back.
    ///
    /// `POST /api/plex-servers/foreignstatus` with `{"name": ...}`
    pub async fn plex_server_foreign_status(&self, name: &str) -> Result<bool, Error> {
        debug!(name, "checking plex server foreign status");
        self.status_probe("plex-servers/foreignstatus", name).await
    }

    /// Register a new server.
    ///
    /// `PUT /api/plex-servers`
    pub async fn add_plex_server(&self, server: &Fields) -> Result<(), Error> {
        debug!("adding plex server");
        self.put("plex-servers", server).await?;
        Ok(())
    }

    /// Replace an existing server's settings (matched by name server-side).
    ///
    /// `POST /api/plex-servers`
    pub async fn update_plex_server(&self, server: &Fields) -> Result<(), Error> {
        debug!("updating plex server");
        self.post("plex-servers", server).await?;
        Ok(())
    }

    /// `DELETE /api/plex-servers` with `{"name": ...}`
    pub async fn delete_plex_server(&self, name: &str) -> Result<(), Error> {
        debug!(name, "deleting plex server");
        self.delete("plex-servers", &json!({ "name": name })).await?;
        Ok(())
    }

    /// The status endpoints answer `{"status": 1}` when healthy and
    /// `{"status": -1}` otherwise. A rejected request counts as unreachable;
    /// transport failures still propagate.
    async fn status_probe(&self, endpoint: &str, name: &str) -> Result<bool, Error> {
        let body = match self.post(endpoint, &json!({ "name": name })).await {
            Ok(body) => body,
            Err(Error::Api { .. } | Error::NotFound { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };

        let healthy = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("status").and_then(serde_json::Value::as_i64))
            .is_none_or(|status| status == 1);
        Ok(healthy)
    }
}
