// ── Channel mirror operations ──
//
// Programs and fillers live inside the channel document, so each edit is a
// full channel write of the modified array followed by a read-back.

use serde_json::{Value, json};
use tracing::{debug, info};

use dizque_api::Fields;
use dizque_api::models::{Filler, Program, to_fields};

use crate::defaults::total_duration;
use crate::error::CoreError;
use crate::mirror::Mirror;
use crate::resources::ChannelKind;

const PROGRAMS: &str = "programs";
const FILLERS: &str = "fillerContent";

impl Mirror<ChannelKind> {
    pub fn number(&self) -> u32 {
        *self.key()
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Sum of program durations as last reported by the server.
    pub fn duration(&self) -> u64 {
        self.get("duration").and_then(Value::as_u64).unwrap_or(0)
    }

    pub fn programs(&self) -> Result<Vec<Program>, CoreError> {
        self.typed_array(PROGRAMS)
    }

    pub fn fillers(&self) -> Result<Vec<Filler>, CoreError> {
        self.typed_array(FILLERS)
    }

    // ── Programs ─────────────────────────────────────────────────────

    /// Append programs to the end of the schedule.
    pub async fn add_programs(&mut self, programs: &[Program]) -> Result<(), CoreError> {
        let mut current = self.raw_array(PROGRAMS);
        for program in programs {
            current.push(Value::Object(encode(program)?));
        }
        info!(channel = self.number(), added = programs.len(), "adding programs");
        self.replace_programs(current).await
    }

    /// Merge `partial` into the program at `index`.
    pub async fn update_program(&mut self, index: usize, partial: &Fields) -> Result<(), CoreError> {
        let mut current = self.raw_array(PROGRAMS);
        let slot = current
            .get_mut(index)
            .ok_or_else(|| CoreError::not_found("program", index))?;
        match slot {
            Value::Object(program) => {
                for (key, value) in partial {
                    program.insert(key.clone(), value.clone());
                }
            }
            other => *other = Value::Object(partial.clone()),
        }
        self.replace_programs(current).await
    }

    pub async fn delete_program(&mut self, index: usize) -> Result<(), CoreError> {
        let mut current = self.raw_array(PROGRAMS);
        if index >= current.len() {
            return Err(CoreError::not_found("program", index));
        }
        current.remove(index);
        self.replace_programs(current).await
    }

    pub async fn delete_all_programs(&mut self) -> Result<(), CoreError> {
        info!(channel = self.number(), "deleting all programs");
        self.replace_programs(Vec::new()).await
    }

    async fn replace_programs(&mut self, programs: Vec<Value>) -> Result<(), CoreError> {
        let duration = total_duration(&programs)?;
        let mut partial = Fields::new();
        partial.insert(PROGRAMS.into(), Value::Array(programs));
        partial.insert("duration".into(), json!(duration));
        self.update(&partial).await
    }

    // ── Fillers ──────────────────────────────────────────────────────

    pub async fn add_fillers(&mut self, fillers: &[Filler]) -> Result<(), CoreError> {
        let mut current = self.raw_array(FILLERS);
        for filler in fillers {
            current.push(Value::Object(encode(filler)?));
        }
        info!(channel = self.number(), added = fillers.len(), "adding fillers");
        self.replace_fillers(current).await
    }

    pub async fn delete_filler(&mut self, index: usize) -> Result<(), CoreError> {
        let mut current = self.raw_array(FILLERS);
        if index >= current.len() {
            return Err(CoreError::not_found("filler", index));
        }
        current.remove(index);
        self.replace_fillers(current).await
    }

    pub async fn delete_all_fillers(&mut self) -> Result<(), CoreError> {
        self.replace_fillers(Vec::new()).await
    }

    async fn replace_fillers(&mut self, fillers: Vec<Value>) -> Result<(), CoreError> {
        let mut partial = Fields::new();
        partial.insert(FILLERS.into(), Value::Array(fillers));
        self.update(&partial).await
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Delete this channel on the server, consuming the mirror.
    pub async fn delete(self) -> Result<(), CoreError> {
        let number = self.number();
        debug!(number, "deleting channel");
        self.client()
            .delete_channel(number)
            .await
            .map_err(|e| CoreError::from_api(e, "channel", &number))
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn raw_array(&self, field: &str) -> Vec<Value> {
        self.get(field)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    fn typed_array<T: serde::de::DeserializeOwned>(&self, field: &str) -> Result<Vec<T>, CoreError> {
        serde_json::from_value(Value::Array(self.raw_array(field))).map_err(|e| {
            CoreError::InvalidResource {
                kind: "channel".into(),
                message: format!("`{field}`: {e}"),
            }
        })
    }
}

fn encode<T: serde::Serialize>(item: &T) -> Result<Fields, CoreError> {
    to_fields(item).map_err(|e| CoreError::Internal(e.to_string()))
}
