//! Binaural decode data: either a per-channel scalar gain pair or a full
//! impulse-response convolution table.

use crate::error::HrtfError;
use crate::sphharm::num_channels;

/// Binaural rendering data for one ambisonic order. The scalar form is a
/// cheap approximation (one `[left, right]` gain per ACN channel); the
/// convolution form carries a full impulse response per channel per ear for
/// higher-fidelity rendering.
#[derive(Debug, Clone)]
pub enum HrtfTable {
    Scalar {
        /// One `[left, right]` gain pair per ACN channel.
        gains: Vec<[f32; 2]>,
    },
    Convolution {
        /// One impulse response per ACN channel, left ear.
        left: Vec<Vec<f32>>,
        /// One impulse response per ACN channel, right ear.
        right: Vec<Vec<f32>>,
    },
}

impl HrtfTable {
    /// Builds a scalar HRTF table from per-channel `[left, right]` gains,
    /// validating the channel count against `order`.
    pub fn scalar(order: usize, gains: Vec<[f32; 2]>) -> Result<Self, HrtfError> {
        let expected = num_channels(order);
        if gains.len() != expected {
            return Err(HrtfError::ChannelCountMismatch {
                expected,
                actual: gains.len(),
            });
        }
        Ok(HrtfTable::Scalar { gains })
    }

    /// Builds a convolution HRTF table from per-channel impulse responses,
    /// validating channel counts and that every impulse response is
    /// nonempty.
    pub fn convolution(
        order: usize,
        left: Vec<Vec<f32>>,
        right: Vec<Vec<f32>>,
    ) -> Result<Self, HrtfError> {
        let expected = num_channels(order);
        if left.len() != expected {
            return Err(HrtfError::ChannelCountMismatch {
                expected,
                actual: left.len(),
            });
        }
        if right.len() != expected {
            return Err(HrtfError::ChannelCountMismatch {
                expected,
                actual: right.len(),
            });
        }
        if left.iter().chain(right.iter()).any(|ir| ir.is_empty()) {
            return Err(HrtfError::EmptyImpulseResponse);
        }
        Ok(HrtfTable::Convolution { left, right })
    }

    pub fn num_channels(&self) -> usize {
        match self {
            HrtfTable::Scalar { gains } => gains.len(),
            HrtfTable::Convolution { left, .. } => left.len(),
        }
    }

    /// Length, in samples, of the longest impulse response (1 for a scalar
    /// table, since a scalar gain is a one-tap filter).
    pub fn max_latency_samples(&self) -> usize {
        match self {
            HrtfTable::Scalar { .. } => 1,
            HrtfTable::Convolution { left, right } => left
                .iter()
                .chain(right.iter())
                .map(|ir| ir.len())
                .max()
                .unwrap_or(1),
        }
    }

    /// Builds a flat, uniform scalar table (every channel has the same
    /// `[left, right]` gain) -- a placeholder/test fixture, not a real HRTF.
    pub fn flat(order: usize, left_gain: f32, right_gain: f32) -> Self {
        let gains = vec![[left_gain, right_gain]; num_channels(order)];
        HrtfTable::Scalar { gains }
    }
}
