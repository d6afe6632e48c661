// ── Channel creation defaults ──
//
// A new channel only strictly needs programs. Everything else (number,
// name, start time, artwork) is derived here before template validation.
// `duration` is always recomputed from the programs.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde_json::{Value, json};
use tracing::warn;

use dizque_api::models::{Program, to_fields};
use dizque_api::{DizqueClient, Fields};

use crate::config::ErrorHandling;
use crate::error::CoreError;
use crate::fields::{channel_defaults, merge};

/// Length of the placeholder program used for an empty lenient channel.
pub const PLACEHOLDER_PROGRAM_MS: u64 = 600_000;

/// Inputs for deriving a new channel's missing settings.
#[derive(Debug, Clone)]
pub struct ChannelDraft<'a> {
    pub existing_numbers: &'a [u32],
    /// Resolves default artwork against the server root.
    pub server: &'a DizqueClient,
    pub now: DateTime<Utc>,
    pub mode: ErrorHandling,
}

impl ChannelDraft<'_> {
    /// Fill in derived defaults and merge over the server defaults.
    pub fn fill_defaults(&self, mut fields: Fields) -> Result<Fields, CoreError> {
        let has_programs = fields
            .get("programs")
            .and_then(Value::as_array)
            .is_some_and(|p| !p.is_empty());
        if !has_programs {
            match self.mode {
                ErrorHandling::Strict => {
                    return Err(creation_error(
                        "You must include at least one program when creating a channel.",
                    ));
                }
                ErrorHandling::Lenient => {
                    warn!("no programs given, adding a placeholder offline program");
                    let placeholder = to_fields(&Program::offline(PLACEHOLDER_PROGRAM_MS))
                        .map_err(|e| CoreError::Internal(e.to_string()))?;
                    fields.insert("programs".into(), json!([placeholder]));
                }
            }
        }

        if let Some(requested) = fields.get("number").cloned() {
            self.check_requested_number(&requested)?;
            if !self.number_is_usable(&requested) {
                warn!(%requested, "discarding unusable channel number");
                fields.remove("number");
            }
        }

        let number = match fields.get("number").and_then(as_channel_number) {
            Some(n) => n,
            None => {
                let n = next_channel_number(self.existing_numbers);
                fields.insert("number".into(), json!(n));
                n
            }
        };

        fields
            .entry("name")
            .or_insert_with(|| json!(format!("Channel {number}")));
        if !fields.contains_key("startTime") {
            let start = next_half_hour(self.now)?;
            fields.insert("startTime".into(), json!(format_start_time(start)));
        }
        fields
            .entry("icon")
            .or_insert_with(|| json!(self.server.asset_url("images/dizquetv.png")));
        fields
            .entry("offlinePicture")
            .or_insert_with(|| json!(self.server.asset_url("images/generic-offline-screen.png")));

        let programs = fields
            .get("programs")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice);
        let duration = total_duration(programs)?;
        fields.insert("duration".into(), json!(duration));

        Ok(merge(&fields, &channel_defaults()))
    }

    fn number_is_usable(&self, requested: &Value) -> bool {
        as_channel_number(requested).is_some_and(|n| !self.existing_numbers.contains(&n))
    }

    /// In strict mode, a taken or malformed number is an error.
    fn check_requested_number(&self, requested: &Value) -> Result<(), CoreError> {
        if self.mode == ErrorHandling::Lenient || self.number_is_usable(requested) {
            return Ok(());
        }
        match as_channel_number(requested) {
            Some(n) => Err(creation_error(format!("Channel #{n} already exists."))),
            None => Err(creation_error(format!(
                "Invalid channel number {requested}."
            ))),
        }
    }
}

fn creation_error(message: impl Into<String>) -> CoreError {
    CoreError::ChannelCreation {
        message: message.into(),
    }
}

fn as_channel_number(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|n| u32::try_from(n).ok())
}

/// One past the highest existing channel number, or 1 for an empty server.
pub fn next_channel_number(existing: &[u32]) -> u32 {
    existing.iter().max().map_or(1, |m| m.saturating_add(1))
}

/// Sum of program durations in milliseconds.
pub fn total_duration(programs: &[Value]) -> Result<u64, CoreError> {
    programs
        .iter()
        .enumerate()
        .map(|(i, p)| {
            p.get("duration")
                .and_then(Value::as_u64)
                .ok_or_else(|| creation_error(format!("Program #{i} has no duration.")))
        })
        .sum()
}

/// Round up to the next :00 or :30 UTC wall-clock mark. Instants already on
/// a mark are returned unchanged.
pub fn next_half_hour(now: DateTime<Utc>) -> Result<DateTime<Utc>, CoreError> {
    let half_hour = TimeDelta::minutes(30);
    let floor = now
        .duration_trunc(half_hour)
        .map_err(|e| CoreError::Internal(format!("cannot round start time: {e}")))?;
    Ok(if floor == now { now } else { floor + half_hour })
}

/// dizqueTV's start time format, e.g. `2024-01-01T10:30:00.000Z`.
pub fn format_start_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fields::{CHANNEL_TEMPLATE, as_fields};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, h, m, s)
            .single()
            .expect("valid time")
    }

    // Mounted below a path prefix, so artwork must keep it.
    static SERVER: LazyLock<DizqueClient> = LazyLock::new(|| {
        DizqueClient::with_client("http://tv.local:8000/dizque/", reqwest::Client::new())
            .expect("client")
    });

    fn draft(existing: &[u32], mode: ErrorHandling) -> ChannelDraft<'_> {
        ChannelDraft {
            existing_numbers: existing,
            server: &SERVER,
            now: at(10, 7, 12),
            mode,
        }
    }

    fn obj(value: Value) -> Fields {
        as_fields(value).expect("object")
    }

    #[test]
    fn half_hour_rounding() {
        assert_eq!(next_half_hour(at(10, 7, 12)).expect("round"), at(10, 30, 0));
        assert_eq!(next_half_hour(at(10, 30, 1)).expect("round"), at(11, 0, 0));
        assert_eq!(next_half_hour(at(10, 30, 0)).expect("round"), at(10, 30, 0));
        assert_eq!(next_half_hour(at(23, 45, 0)).expect("round"), {
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0)
                .single()
                .expect("valid time")
        });
    }

    #[test]
    fn start_time_format() {
        assert_eq!(format_start_time(at(10, 30, 0)), "2024-03-09T10:30:00.000Z");
    }

    #[test]
    fn offline_only_channel_gets_every_default() {
        let existing = [1, 4, 2];
        let filled = draft(&existing, ErrorHandling::Strict)
            .fill_defaults(obj(json!({
                "programs": [{ "duration": 600_000, "isOffline": true }]
            })))
            .expect("filled");

        assert_eq!(filled["number"], json!(5));
        assert_eq!(filled["name"], json!("Channel 5"));
        assert_eq!(filled["duration"], json!(600_000));
        assert_eq!(filled["startTime"], json!("2024-03-09T10:30:00.000Z"));
        assert_eq!(
            filled["icon"],
            json!("http://tv.local:8000/dizque/images/dizquetv.png")
        );
        assert_eq!(
            filled["offlinePicture"],
            json!("http://tv.local:8000/dizque/images/generic-offline-screen.png")
        );
        assert!(CHANNEL_TEMPLATE.validate(&filled).is_ok());
    }

    #[test]
    fn duration_is_always_recomputed() {
        let filled = draft(&[], ErrorHandling::Strict)
            .fill_defaults(obj(json!({
                "duration": 1,
                "programs": [{ "duration": 1000 }, { "duration": 2500 }]
            })))
            .expect("filled");
        assert_eq!(filled["duration"], json!(3500));
        assert_eq!(filled["number"], json!(1));
    }

    #[test]
    fn caller_fields_win_over_defaults() {
        let filled = draft(&[1], ErrorHandling::Strict)
            .fill_defaults(obj(json!({
                "number": 10,
                "name": "Westerns",
                "startTime": "2020-01-01T00:00:00.000Z",
                "offlineMode": "clip",
                "programs": [{ "duration": 5 }]
            })))
            .expect("filled");
        assert_eq!(filled["number"], json!(10));
        assert_eq!(filled["name"], json!("Westerns"));
        assert_eq!(filled["startTime"], json!("2020-01-01T00:00:00.000Z"));
        assert_eq!(filled["offlineMode"], json!("clip"));
        assert_eq!(filled["fillerRepeatCooldown"], json!(1_800_000));
    }

    #[test]
    fn strict_duplicate_number_is_an_error() {
        let result = draft(&[1, 2, 3], ErrorHandling::Strict)
            .fill_defaults(obj(json!({ "number": 2, "programs": [{ "duration": 5 }] })));
        match result {
            Err(CoreError::ChannelCreation { message }) => {
                assert_eq!(message, "Channel #2 already exists.");
            }
            other => panic!("expected ChannelCreation, got {other:?}"),
        }
    }

    #[test]
    fn lenient_duplicate_number_is_reassigned() {
        let filled = draft(&[1, 2, 3], ErrorHandling::Lenient)
            .fill_defaults(obj(json!({ "number": 2, "programs": [{ "duration": 5 }] })))
            .expect("filled");
        assert_eq!(filled["number"], json!(4));
        assert_eq!(filled["name"], json!("Channel 4"));
    }

    #[test]
    fn strict_empty_programs_is_an_error() {
        let result = draft(&[], ErrorHandling::Strict).fill_defaults(obj(json!({ "programs": [] })));
        assert!(matches!(result, Err(CoreError::ChannelCreation { .. })));
    }

    #[test]
    fn lenient_empty_programs_gets_placeholder() {
        let filled = draft(&[], ErrorHandling::Lenient)
            .fill_defaults(Fields::new())
            .expect("filled");
        assert_eq!(
            filled["programs"],
            json!([{ "duration": PLACEHOLDER_PROGRAM_MS, "isOffline": true }])
        );
        assert_eq!(filled["duration"], json!(PLACEHOLDER_PROGRAM_MS));
    }

    #[test]
    fn program_without_duration_is_rejected() {
        let result = draft(&[], ErrorHandling::Lenient)
            .fill_defaults(obj(json!({ "programs": [{ "duration": 5 }, { "title": "?" }] })));
        match result {
            Err(CoreError::ChannelCreation { message }) => {
                assert_eq!(message, "Program #1 has no duration.");
            }
            other => panic!("expected ChannelCreation, got {other:?}"),
        }
    }

    #[test]
    fn malformed_number_strict_vs_lenient() {
        let fields = obj(json!({ "number": "seven", "programs": [{ "duration": 5 }] }));
        assert!(
            draft(&[7], ErrorHandling::Strict)
                .fill_defaults(fields.clone())
                .is_err()
        );
        let filled = draft(&[7], ErrorHandling::Lenient)
            .fill_defaults(fields)
            .expect("filled");
        assert_eq!(filled["number"], json!(8));
    }

    #[test]
    fn next_number_on_empty_server() {
        assert_eq!(next_channel_number(&[]), 1);
        assert_eq!(next_channel_number(&[3, 9, 4]), 10);
    }
}
