//! Per-layer metadata and audio payload.

use crate::error::LayerError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_ID_LEN: usize = 256;
const MAX_META_LEN: usize = 4096;

fn default_gain() -> f32 {
    1.0
}

/// JSON-encoded layer metadata. `position`, `kind`, and `gain` are the
/// fields the decoder relies on; everything else round-trips through
/// `extra` so a writer never has to know about fields it didn't set.
/// `gain` defaults to `1.0` when absent from the JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayerMeta {
    #[serde(rename = "type")]
    pub kind: String,
    pub position: [f32; 3],
    #[serde(default = "default_gain")]
    pub gain: f32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl LayerMeta {
    pub fn new(kind: impl Into<String>, position: [f32; 3]) -> Self {
        Self {
            kind: kind.into(),
            position,
            gain: default_gain(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    pub fn to_json_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("LayerMeta always serializes")
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, LayerError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| LayerError::InvalidMetadata(e.to_string()))?;
        let value: Value =
            serde_json::from_str(text).map_err(|e| LayerError::InvalidMetadata(e.to_string()))?;

        let position_values = value
            .get("position")
            .and_then(Value::as_array)
            .filter(|arr| arr.len() == 3)
            .ok_or(LayerError::InvalidPosition)?;
        let mut position = [0.0f32; 3];
        for (slot, v) in position.iter_mut().zip(position_values) {
            *slot = v.as_f64().ok_or(LayerError::InvalidPosition)? as f32;
        }

        if !position.iter().all(|c| c.is_finite()) {
            return Err(LayerError::InvalidPosition);
        }

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(LayerError::MissingType)?
            .to_string();

        let gain = match value.get("gain") {
            None => default_gain(),
            Some(v) => {
                let g = v.as_f64().ok_or(LayerError::InvalidGain)? as f32;
                if !g.is_finite() {
                    return Err(LayerError::InvalidGain);
                }
                g
            }
        };

        let mut extra = value
            .as_object()
            .cloned()
            .ok_or_else(|| LayerError::InvalidMetadata("metadata is not a JSON object".into()))?;
        extra.remove("type");
        extra.remove("position");
        extra.remove("gain");

        Ok(LayerMeta {
            kind,
            position,
            gain,
            extra,
        })
    }
}

/// One ambisonic layer: an identifier, its metadata, and the interleaved
/// ambisonic audio for the file's shared sample count and channel count.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: String,
    pub meta: LayerMeta,
    /// Interleaved `[sample][channel]`, length `sample_count * channel_count`.
    pub samples: Vec<f32>,
}

impl Layer {
    pub fn new(id: impl Into<String>, meta: LayerMeta, samples: Vec<f32>) -> Result<Self, LayerError> {
        let id = id.into();
        let id_len = id.as_bytes().len();
        if id_len == 0 || id_len > MAX_ID_LEN {
            return Err(LayerError::InvalidLayerId(id_len));
        }
        let meta_len = meta.to_json_bytes().len();
        if meta_len == 0 || meta_len > MAX_META_LEN {
            return Err(LayerError::MetadataTooLarge(meta_len));
        }
        Ok(Self { id, meta, samples })
    }
}

pub(crate) fn validate_meta_len(len: usize) -> Result<(), LayerError> {
    if len == 0 || len > MAX_META_LEN {
        return Err(LayerError::MetadataTooLarge(len));
    }
    Ok(())
}

pub(crate) fn validate_id_len(len: usize) -> Result<(), LayerError> {
    if len == 0 || len > MAX_ID_LEN {
        return Err(LayerError::InvalidLayerId(len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_round_trips_through_json() {
        let meta = LayerMeta::new("point", [1.0, 2.0, 3.0]);
        let bytes = meta.to_json_bytes();
        let parsed = LayerMeta::from_json_bytes(&bytes).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let mut meta = LayerMeta::new("point", [0.0, 0.0, 1.0]);
        meta.extra.insert("gain_db".into(), Value::from(-3.0));
        let bytes = meta.to_json_bytes();
        let parsed = LayerMeta::from_json_bytes(&bytes).unwrap();
        assert_eq!(parsed.extra.get("gain_db").and_then(Value::as_f64), Some(-3.0));
    }

    #[test]
    fn missing_type_is_rejected() {
        let bytes = br#"{"position": [0.0, 0.0, 1.0]}"#;
        assert_eq!(
            LayerMeta::from_json_bytes(bytes).unwrap_err(),
            LayerError::MissingType
        );
    }

    #[test]
    fn non_finite_position_is_rejected() {
        let bytes = br#"{"type": "point", "position": [0.0, 0.0, "nan"]}"#;
        assert_eq!(
            LayerMeta::from_json_bytes(bytes).unwrap_err(),
            LayerError::InvalidPosition
        );
    }

    #[test]
    fn layer_id_must_be_nonempty() {
        let meta = LayerMeta::new("point", [0.0, 0.0, 1.0]);
        let err = Layer::new("", meta, vec![]).unwrap_err();
        assert_eq!(err, LayerError::InvalidLayerId(0));
    }

    #[test]
    fn gain_defaults_to_one_when_absent() {
        let bytes = br#"{"type": "point", "position": [0.0, 0.0, 1.0]}"#;
        let parsed = LayerMeta::from_json_bytes(bytes).unwrap();
        assert_eq!(parsed.gain, 1.0);
    }

    #[test]
    fn gain_round_trips_through_json() {
        let meta = LayerMeta::new("point", [0.0, 0.0, 1.0]).with_gain(0.5);
        let bytes = meta.to_json_bytes();
        let parsed = LayerMeta::from_json_bytes(&bytes).unwrap();
        assert_eq!(parsed.gain, 0.5);
    }

    #[test]
    fn non_finite_gain_is_rejected() {
        let bytes = br#"{"type": "point", "position": [0.0, 0.0, 1.0], "gain": "loud"}"#;
        assert_eq!(
            LayerMeta::from_json_bytes(bytes).unwrap_err(),
            LayerError::InvalidGain
        );
    }
}
