// ── Remote resource mirrors ──
//
// A `Mirror<K>` is a local snapshot of one server-side resource. The
// snapshot only changes on an explicit `reload`, `update` or `reset`;
// `write` sends a merged full-resource payload and leaves it alone.
//
// Resource kinds are zero-sized tags implementing `Resource`, so settings
// bundles, channels and Plex servers all share one write/read-back path.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use dizque_api::{DizqueClient, Fields};

use crate::error::CoreError;
use crate::fields::merge;

/// A kind of remote resource the client can mirror.
pub trait Resource: Send + Sync + 'static {
    /// What identifies one resource of this kind on the server.
    type Key: Clone + fmt::Debug + fmt::Display + PartialEq + Send + Sync;
    /// Typed view deserialized from the snapshot.
    type View: DeserializeOwned;

    /// Human-readable kind, used in errors and logs.
    const KIND: &'static str;
    /// Server-generated identifier field.
    const ID_FIELD: &'static str = "_id";
    /// Whether a write may change the key. Kinds the server looks up by
    /// the key itself cannot be renamed in place.
    const RENAMABLE: bool = true;

    /// Extract the key from a full field map.
    fn key_of(fields: &Fields) -> Result<Self::Key, CoreError>;

    /// Fetch the current full state of the resource.
    fn fetch(
        client: &DizqueClient,
        key: &Self::Key,
    ) -> impl Future<Output = Result<Fields, CoreError>> + Send;

    /// Replace the resource with `fields`.
    fn write(
        client: &DizqueClient,
        key: &Self::Key,
        fields: &Fields,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Resources the server can restore to factory defaults.
pub trait Resettable: Resource {
    fn reset(
        client: &DizqueClient,
        key: &Self::Key,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Local snapshot of one remote resource.
#[derive(Debug, Clone)]
pub struct Mirror<K: Resource> {
    client: Arc<DizqueClient>,
    key: K::Key,
    fields: Fields,
    _kind: PhantomData<K>,
}

impl<K: Resource> Mirror<K> {
    /// Wrap an already-fetched field map.
    pub fn from_fields(client: Arc<DizqueClient>, fields: Fields) -> Result<Self, CoreError> {
        let key = K::key_of(&fields)?;
        Ok(Self {
            client,
            key,
            fields,
            _kind: PhantomData,
        })
    }

    /// Fetch a resource by key.
    pub async fn fetch(client: Arc<DizqueClient>, key: K::Key) -> Result<Self, CoreError> {
        let fields = K::fetch(&client, &key).await?;
        Ok(Self {
            client,
            key,
            fields,
            _kind: PhantomData,
        })
    }

    pub fn key(&self) -> &K::Key {
        &self.key
    }

    /// The last-known full state.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// A single field of the snapshot.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Server-generated identifier, if the snapshot carries one.
    pub fn id(&self) -> Option<&str> {
        self.fields.get(K::ID_FIELD).and_then(Value::as_str)
    }

    /// Deserialize the snapshot into its typed view.
    pub fn view(&self) -> Result<K::View, CoreError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            CoreError::InvalidResource {
                kind: K::KIND.into(),
                message: e.to_string(),
            }
        })
    }

    pub(crate) fn client(&self) -> &Arc<DizqueClient> {
        &self.client
    }

    /// Replace the snapshot with the server's current state. On error the
    /// snapshot is left as it was.
    pub async fn reload(&mut self) -> Result<(), CoreError> {
        let fields = K::fetch(&self.client, &self.key).await?;
        self.fields = fields;
        Ok(())
    }

    /// Merge `partial` onto the snapshot and write the full result.
    ///
    /// The snapshot is not touched; returns the key the resource has after
    /// the write, which differs from `key()` if `partial` renames it.
    /// Renaming a kind that is not [`Resource::RENAMABLE`] is rejected with
    /// [`CoreError::KeyChange`] before anything is sent.
    pub async fn write(&self, partial: &Fields) -> Result<K::Key, CoreError> {
        let merged = merge(partial, &self.fields);
        let new_key = K::key_of(&merged)?;
        if !K::RENAMABLE && new_key != self.key {
            return Err(CoreError::KeyChange {
                kind: K::KIND.into(),
                from: self.key.to_string(),
                to: new_key.to_string(),
            });
        }
        debug!(kind = K::KIND, key = %self.key, "writing resource");
        K::write(&self.client, &self.key, &merged).await?;
        Ok(new_key)
    }

    /// Write `partial`, then reload so the snapshot matches the server.
    ///
    /// A failed read-back after an accepted write is reported as
    /// [`CoreError::ReadBack`]; the snapshot then still holds the
    /// pre-write state.
    pub async fn update(&mut self, partial: &Fields) -> Result<(), CoreError> {
        let new_key = self.write(partial).await?;
        self.read_back(new_key).await
    }

    async fn read_back(&mut self, key: K::Key) -> Result<(), CoreError> {
        match K::fetch(&self.client, &key).await {
            Ok(fields) => {
                self.key = key;
                self.fields = fields;
                Ok(())
            }
            Err(source) => Err(CoreError::ReadBack {
                kind: K::KIND.into(),
                key: key.to_string(),
                source: Box::new(source),
            }),
        }
    }
}

impl<K: Resettable> Mirror<K> {
    /// Restore server defaults, then reload.
    pub async fn reset(&mut self) -> Result<(), CoreError> {
        debug!(kind = K::KIND, key = %self.key, "resetting resource");
        K::reset(&self.client, &self.key).await?;
        let key = self.key.clone();
        self.read_back(key).await
    }
}
