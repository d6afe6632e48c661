// dizqueTV HTTP client
//
// Wraps `reqwest::Client` with dizqueTV URL construction (`{base}/api/...`)
// and status handling. Endpoint groups (channels, settings, etc.) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for a dizqueTV server.
///
/// Every call is a single request/response; nothing is cached and nothing
/// is retried. Errors are returned, never folded into empty values.
#[derive(Debug, Clone)]
pub struct DizqueClient {
    http: reqwest::Client,
    base_url: Url,
    channels_timeout: Duration,
}

impl DizqueClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the server root, e.g. `http://localhost:8000`.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            channels_timeout: transport.channels_timeout,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            channels_timeout: crate::transport::DEFAULT_CHANNELS_TIMEOUT,
        })
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw.trim())?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&path);
        Ok(url)
    }

    /// The server root URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub(crate) fn channels_timeout(&self) -> Duration {
        self.channels_timeout
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{endpoint}`. A leading `/` on `endpoint` is optional.
    pub fn api_url(&self, endpoint: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/api/{}",
            self.base_url(),
            endpoint.trim_start_matches('/')
        );
        Ok(Url::parse(&full)?)
    }

    /// Build a URL outside the `/api` tree (images, etc.).
    pub fn asset_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, Error> {
        let body = self.get_text(endpoint).await?;
        decode(&body)
    }

    /// GET with a per-request timeout overriding the client default.
    pub(crate) async fn get_with_timeout<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<T, Error> {
        let url = self.api_url(endpoint)?;
        debug!("GET {url} timeout={timeout:?}");
        let body = self.send(self.http.get(url.clone()).timeout(timeout), &url).await?;
        decode(&body)
    }

    /// Send a GET request and return the raw body text.
    pub(crate) async fn get_text(&self, endpoint: &str) -> Result<String, Error> {
        let url = self.api_url(endpoint)?;
        debug!("GET {url}");
        self.send(self.http.get(url.clone()), &url).await
    }

    /// POST a JSON body, returning the raw response text.
    pub(crate) async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<String, Error> {
        self.write(Method::POST, endpoint, body).await
    }

    /// PUT a JSON body, returning the raw response text.
    pub(crate) async fn put<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<String, Error> {
        self.write(Method::PUT, endpoint, body).await
    }

    /// DELETE with a JSON body; dizqueTV identifies the target in the body,
    /// not the path.
    pub(crate) async fn delete<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<String, Error> {
        self.write(Method::DELETE, endpoint, body).await
    }

    async fn write<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<String, Error> {
        let url = self.api_url(endpoint)?;
        debug!("{method} {url}");
        let req = self.http.request(method, url.clone()).json(body);
        self.send(req, &url).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn send(&self, req: RequestBuilder, url: &Url) -> Result<String, Error> {
        let resp = req.send().await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.text().await?);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                path: url.path().to_owned(),
            });
        }

        let raw = resp.text().await.unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                raw
            },
        })
    }
}

/// Decode a JSON body, keeping a preview of it in the error.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}
