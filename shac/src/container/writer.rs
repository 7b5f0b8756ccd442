//! `.shac` file writer.

use crate::container::header::{validate_order, validate_sample_rate, Header};
use crate::container::layer::{validate_id_len, validate_meta_len, Layer};
use crate::error::{LayerError, ShacError};
use crate::sphharm::{num_channels, Normalization};
use crate::wire::WriteLe;
use std::collections::HashSet;

/// Builds a `.shac` file in memory, one ambisonic layer at a time.
#[derive(Debug)]
pub struct Writer {
    order: usize,
    normalization: Normalization,
    sample_rate: u32,
    sample_count: u32,
    layers: Vec<Layer>,
    seen_ids: HashSet<String>,
}

impl Writer {
    /// Fails immediately, before any layer is appended or any byte is
    /// emitted, if `order` or `sample_rate` fall outside what
    /// [`Header::parse`] would later accept from a reader.
    pub fn new(
        order: usize,
        normalization: Normalization,
        sample_rate: u32,
        sample_count: u32,
    ) -> Result<Self, ShacError> {
        validate_order(order)?;
        validate_sample_rate(sample_rate)?;
        Ok(Self {
            order,
            normalization,
            sample_rate,
            sample_count,
            layers: Vec::new(),
            seen_ids: HashSet::new(),
        })
    }

    /// Appends a layer, validating its id, metadata size, and that its
    /// interleaved sample buffer matches this writer's channel and sample
    /// counts exactly.
    pub fn add_layer(&mut self, layer: Layer) -> Result<(), ShacError> {
        validate_id_len(layer.id.as_bytes().len())?;
        validate_meta_len(layer.meta.to_json_bytes().len())?;

        if self.seen_ids.contains(&layer.id) {
            return Err(LayerError::DuplicateLayerId(layer.id).into());
        }

        let expected_channels = num_channels(self.order);
        let expected_samples = self.sample_count as usize;
        let actual_len = layer.samples.len();
        if actual_len != expected_samples * expected_channels {
            return Err(LayerError::ShapeMismatch {
                expected_samples,
                expected_channels,
                actual_samples: if expected_channels == 0 {
                    0
                } else {
                    actual_len / expected_channels
                },
                actual_channels: expected_channels,
            }
            .into());
        }

        self.seen_ids.insert(layer.id.clone());
        self.layers.push(layer);
        Ok(())
    }

    /// Serializes the header and every appended layer into a single byte
    /// buffer, header first, in append order.
    pub fn write(&self) -> Result<Vec<u8>, ShacError> {
        if self.layers.is_empty() {
            return Err(LayerError::InvalidLayerId(0).into());
        }

        let header = Header::new(
            self.order,
            self.normalization,
            self.sample_rate,
            self.sample_count,
            self.layers.len() as u16,
        );

        let mut out = Vec::new();
        header.write(&mut out);

        for layer in &self.layers {
            let id_bytes = layer.id.as_bytes();
            let meta_bytes = layer.meta.to_json_bytes();

            (id_bytes.len() as u16).write_le(&mut out);
            (meta_bytes.len() as u32).write_le(&mut out);
            out.extend_from_slice(id_bytes);
            out.extend_from_slice(&meta_bytes);
            layer.samples.write_le(&mut out);
        }

        Ok(out)
    }
}
