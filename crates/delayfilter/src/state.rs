//! Parameter persistence.
//!
//! State format: a JSON object tagged with the tree type, holding every
//! parameter under its string ID. Choices are stored as their index.
//!
//! ```json
//! {"type": "Parameters", "version": 1, "params": {"filterType": 3, "mix": 0.25, "taps": 4}}
//! ```
//!
//! Loading accepts a number or, for choices, a label (`"Phaser"`). Unknown
//! keys and values of any other JSON type are skipped and missing keys keep
//! their current value. The whole blob is validated before the first
//! parameter is written, so a rejected blob changes nothing.
//!
//! Only parameters are persisted. Delay line contents, filter memories and
//! LFO phase start fresh on the next `prepare`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::StateError;
use crate::params::{DESCRIPTORS, ParameterSet};

/// Root `type` tag.
pub const STATE_TYPE: &str = "Parameters";
/// Format version written by [`ParameterSet::save_state`].
pub const STATE_VERSION: u32 = 1;

#[derive(Serialize)]
struct SavedState<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    version: u32,
    params: BTreeMap<&'a str, SavedValue>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum SavedValue {
    Index(usize),
    Value(f32),
}

impl ParameterSet {
    /// Serializes every parameter to a JSON blob.
    pub fn save_state(&self) -> Result<Vec<u8>, StateError> {
        let params = DESCRIPTORS
            .iter()
            .enumerate()
            .filter_map(|(i, desc)| {
                let value = self.get(i)?;
                let saved = if desc.is_choice() {
                    SavedValue::Index(value as usize)
                } else {
                    SavedValue::Value(value)
                };
                Some((desc.string_id, saved))
            })
            .collect();

        let state = SavedState {
            kind: STATE_TYPE,
            version: STATE_VERSION,
            params,
        };
        let json = serde_json::to_vec(&state).map_err(StateError::Serialize)?;

        tracing::debug!(bytes = json.len(), "state saved");
        Ok(json)
    }

    /// Restores parameters from a blob written by [`save_state`](Self::save_state).
    ///
    /// Returns the number of parameters restored.
    pub fn try_load_state(&self, data: &[u8]) -> Result<usize, StateError> {
        let staged = parse_state(data)?;
        for &(index, value) in &staged {
            self.set(index, value);
        }

        tracing::debug!(restored = staged.len(), "state loaded");
        Ok(staged.len())
    }
}

/// Parses and validates `data` into `(index, value)` pairs without touching
/// any parameter.
fn parse_state(data: &[u8]) -> Result<Vec<(usize, f32)>, StateError> {
    let root: Value = serde_json::from_slice(data).map_err(StateError::Parse)?;
    let Some(root) = root.as_object() else {
        return Err(StateError::NotAnObject);
    };

    match root.get("type").and_then(Value::as_str) {
        Some(STATE_TYPE) => {}
        other => {
            return Err(StateError::WrongType {
                found: other.unwrap_or("<missing>").to_owned(),
            });
        }
    }

    let version = root.get("version").and_then(Value::as_u64);
    if version.is_some_and(|v| v != u64::from(STATE_VERSION)) {
        tracing::debug!(?version, "loading state written by another format version");
    }

    let Some(params) = root.get("params").and_then(Value::as_object) else {
        return Err(StateError::MissingParams);
    };

    let mut staged = Vec::with_capacity(params.len());
    for (key, value) in params {
        let Some(index) = DESCRIPTORS.iter().position(|d| d.string_id == key) else {
            tracing::debug!(key = key.as_str(), "skipping unknown parameter");
            continue;
        };
        let desc = &DESCRIPTORS[index];

        let parsed = match value {
            Value::Number(n) => n.as_f64().map(|v| v as f32),
            Value::String(label) => desc.label_index(label).map(|i| i as f32),
            _ => None,
        };
        match parsed {
            Some(v) => staged.push((index, v)),
            None => tracing::debug!(key = key.as_str(), "skipping unreadable value"),
        }
    }
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{FILTER_TYPE, FilterType, IIR_TYPE, IirType, MIX, TAPS};

    #[test]
    fn saved_blob_shape() {
        let params = ParameterSet::new();
        params.set_filter_type(FilterType::Phaser);
        params.set(MIX, 0.25);

        let json: Value = serde_json::from_slice(&params.save_state().unwrap()).unwrap();
        assert_eq!(json["type"], "Parameters");
        assert_eq!(json["version"], 1);
        assert_eq!(json["params"]["filterType"], 3);
        assert_eq!(json["params"]["mix"], 0.25);
        assert_eq!(json["params"].as_object().unwrap().len(), DESCRIPTORS.len());
    }

    #[test]
    fn round_trip() {
        let source = ParameterSet::new();
        source.set_filter_type(FilterType::Flanger);
        source.set_iir_type(IirType::BandPass);
        source.set(MIX, 0.123);
        source.set(TAPS, 9.0);
        source.set_by_name("iirQ", 3.3);
        source.set_by_name("lfoDepth", 7.77);

        let blob = source.save_state().unwrap();
        let target = ParameterSet::new();
        assert_eq!(target.try_load_state(&blob).unwrap(), DESCRIPTORS.len());

        for i in 0..DESCRIPTORS.len() {
            assert_eq!(target.get(i), source.get(i), "param {}", DESCRIPTORS[i].string_id);
        }
    }

    #[test]
    fn labels_accepted_for_choices() {
        let params = ParameterSet::new();
        let blob = br#"{"type": "Parameters", "params": {"filterType": "phaser", "iirType": "High-pass"}}"#;
        assert_eq!(params.try_load_state(blob).unwrap(), 2);
        assert_eq!(params.get(FILTER_TYPE), Some(3.0));
        assert_eq!(params.get(IIR_TYPE), Some(1.0));
    }

    #[test]
    fn unknown_and_unreadable_keys_skipped() {
        let params = ParameterSet::new();
        let blob = br#"{"type": "Parameters", "version": 1,
            "params": {"gain": 4.0, "mix": "loud", "feedback": [1], "delayMs": 250.0}}"#;
        assert_eq!(params.try_load_state(blob).unwrap(), 1);
        assert_eq!(params.get_by_name("delayMs"), Some(250.0));
        assert_eq!(params.get(MIX), Some(0.5));
    }

    #[test]
    fn loaded_values_are_clamped() {
        let params = ParameterSet::new();
        let blob = br#"{"type": "Parameters", "params": {"mix": 9.0, "taps": 2.6}}"#;
        params.try_load_state(blob).unwrap();
        assert_eq!(params.get(MIX), Some(1.0));
        assert_eq!(params.get(TAPS), Some(3.0));
    }

    #[test]
    fn rejects_bad_blobs() {
        let params = ParameterSet::new();
        params.set(MIX, 0.7);

        assert!(matches!(params.try_load_state(b""), Err(StateError::Parse(_))));
        assert!(matches!(
            params.try_load_state(b"{\"type\": \"Parameters\", \"params\": {\"mix\": 0."),
            Err(StateError::Parse(_))
        ));
        assert!(matches!(params.try_load_state(b"[1, 2]"), Err(StateError::NotAnObject)));
        assert!(matches!(
            params.try_load_state(br#"{"type": "Preset", "params": {}}"#),
            Err(StateError::WrongType { found }) if found == "Preset"
        ));
        assert!(matches!(
            params.try_load_state(br#"{"params": {"mix": 0.1}}"#),
            Err(StateError::WrongType { found }) if found == "<missing>"
        ));
        assert!(matches!(
            params.try_load_state(br#"{"type": "Parameters"}"#),
            Err(StateError::MissingParams)
        ));

        assert_eq!(params.get(MIX), Some(0.7));
    }
}
