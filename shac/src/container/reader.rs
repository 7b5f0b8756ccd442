//! `.shac` file parsing.

use crate::container::header::{Header, HEADER_LEN};
use crate::container::layer::{Layer, LayerMeta};
use crate::error::{LayerError, ShacError};
use crate::sphharm::num_channels;
use std::collections::HashSet;

/// A fully parsed `.shac` file: its header plus every layer's metadata and
/// audio.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub header: Header,
    pub layers: Vec<Layer>,
}

/// Parses and fully validates a `.shac` file from `bytes`.
pub fn parse(bytes: &[u8]) -> Result<Container, ShacError> {
    let header = Header::parse(bytes)?;
    let channel_count = header.channel_count as usize;
    let sample_count = header.sample_count as usize;
    let expected_audio_bytes = sample_count * channel_count * 4;

    let mut cursor = HEADER_LEN;
    let mut layers = Vec::with_capacity(header.layer_count as usize);
    let mut seen_ids = HashSet::new();

    for layer_index in 0..header.layer_count as usize {
        if cursor + 6 > bytes.len() {
            return Err(LayerError::TruncatedLayerHeader { layer_index }.into());
        }
        let id_len = u16::from_le_bytes([bytes[cursor], bytes[cursor + 1]]) as usize;
        let meta_len = u32::from_le_bytes([
            bytes[cursor + 2],
            bytes[cursor + 3],
            bytes[cursor + 4],
            bytes[cursor + 5],
        ]) as usize;
        cursor += 6;

        if cursor + id_len > bytes.len() {
            return Err(LayerError::TruncatedLayerHeader { layer_index }.into());
        }
        let id = std::str::from_utf8(&bytes[cursor..cursor + id_len])
            .map_err(|e| LayerError::InvalidMetadata(e.to_string()))?
            .to_string();
        cursor += id_len;

        if cursor + meta_len > bytes.len() {
            return Err(LayerError::TruncatedLayerHeader { layer_index }.into());
        }
        let meta = LayerMeta::from_json_bytes(&bytes[cursor..cursor + meta_len])?;
        cursor += meta_len;

        if cursor + expected_audio_bytes > bytes.len() {
            return Err(LayerError::TruncatedData {
                layer_index,
                expected: expected_audio_bytes,
                actual: bytes.len() - cursor,
            }
            .into());
        }
        let samples = parse_interleaved_f32(&bytes[cursor..cursor + expected_audio_bytes]);
        cursor += expected_audio_bytes;

        if !seen_ids.insert(id.clone()) {
            return Err(LayerError::DuplicateLayerId(id).into());
        }

        layers.push(Layer {
            id,
            meta,
            samples,
        });
    }

    Ok(Container { header, layers })
}

/// Reads little-endian `f32` samples out of a byte slice, passing non-finite
/// values (`NaN`/`Inf`) through unchanged rather than rejecting the file:
/// the decoder is responsible for scrubbing these at render time.
fn parse_interleaved_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

impl Container {
    pub fn channel_count(&self) -> usize {
        num_channels(self.header.order as usize)
    }
}
