// ── Field merging and required-field templates ──
//
// Every dizqueTV write replaces the whole resource, so partial updates are
// merged onto the last known full state first. Creation payloads are
// checked against a template of required keys before anything is sent.

use std::borrow::Cow;

use serde_json::{Value, json};

use dizque_api::Fields;

use crate::error::CoreError;

/// Merge `partial` onto `full` without touching either input.
///
/// The result agrees with `full` on every key absent from `partial`, and
/// with `partial` on every key it contains. Keys only in `partial` are
/// added, so newly introduced server fields can still be set.
pub fn merge(partial: &Fields, full: &Fields) -> Fields {
    let mut merged = full.clone();
    for (key, value) in partial {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// The set of keys a resource payload must carry before it is written.
#[derive(Debug, Clone)]
pub struct Template<'a> {
    pub kind: &'a str,
    /// Generated server-side, so never required.
    pub id_field: &'a str,
    pub keys: Cow<'a, [&'a str]>,
}

impl<'a> Template<'a> {
    /// Build a template from an example of a complete resource.
    pub fn from_example(kind: &'a str, id_field: &'a str, example: &'a Fields) -> Self {
        Self {
            kind,
            id_field,
            keys: Cow::Owned(example.keys().map(String::as_str).collect()),
        }
    }

    /// Template keys other than the identifier.
    pub fn required(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.keys
            .iter()
            .copied()
            .filter(move |k| *k != self.id_field)
    }

    /// Required keys absent from `candidate`, in template order.
    pub fn missing(&self, candidate: &Fields) -> Vec<String> {
        self.required()
            .filter(|k| !candidate.contains_key(*k))
            .map(str::to_owned)
            .collect()
    }

    /// Succeeds iff every required key is present in `candidate`.
    pub fn validate(&self, candidate: &Fields) -> Result<(), CoreError> {
        let missing = self.missing(candidate);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::MissingFields {
                kind: self.kind.to_owned(),
                missing,
            })
        }
    }
}

const PLEX_SERVER_KEYS: &[&str] = &[
    "name",
    "uri",
    "accessToken",
    "index",
    "arChannels",
    "arGuide",
    "_id",
];

const CHANNEL_KEYS: &[&str] = &[
    "programs",
    "fillerRepeatCooldown",
    "fillerContent",
    "fallback",
    "icon",
    "disableFillerOverlay",
    "iconWidth",
    "iconDuration",
    "iconPosition",
    "startTime",
    "offlinePicture",
    "offlineSoundtrack",
    "offlineMode",
    "number",
    "name",
    "duration",
    "_id",
];

pub const PLEX_SERVER_TEMPLATE: Template<'static> = Template {
    kind: "Plex server",
    id_field: "_id",
    keys: Cow::Borrowed(PLEX_SERVER_KEYS),
};

pub const CHANNEL_TEMPLATE: Template<'static> = Template {
    kind: "channel",
    id_field: "_id",
    keys: Cow::Borrowed(CHANNEL_KEYS),
};

/// Server-side defaults for a new channel, used beneath caller fields.
pub fn channel_defaults() -> Fields {
    match json!({
        "programs": [],
        "fillerRepeatCooldown": 1_800_000,
        "fillerContent": [],
        "fallback": [],
        "disableFillerOverlay": true,
        "iconWidth": 120,
        "iconDuration": 60,
        "iconPosition": "2",
        "offlineSoundtrack": "",
        "offlineMode": "pic",
        "stealth": false,
        "groupTitle": "dizqueTV",
    }) {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

/// Convert an arbitrary JSON value into a field map, if it is an object.
pub fn as_fields(value: Value) -> Option<Fields> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
