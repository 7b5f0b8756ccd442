//! Mono-to-ambisonic encoding.

use crate::coord::{to_spherical, Cartesian};
use crate::sphharm::{num_channels, Normalization, SphHarm};

/// Minimum distance used when computing the 1/r distance gain, preventing
/// the gain from blowing up for sources at or near the listener.
pub const MIN_DISTANCE: f32 = 0.1;

/// Encoder configuration: ambisonic order, normalization scheme, and whether
/// distance attenuation is baked into the encoded signal at encode time.
#[derive(Debug, Clone, Copy)]
pub struct EncoderConfig {
    pub order: usize,
    pub normalization: Normalization,
    pub apply_distance_gain: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            order: 3,
            normalization: Normalization::Sn3d,
            apply_distance_gain: true,
        }
    }
}

/// Encodes one mono source at a fixed position into `num_channels(order)`
/// ambisonic channels, interleaved per sample.
pub struct Encoder {
    config: EncoderConfig,
    sh: SphHarm,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        let sh = SphHarm::new(config.order, config.normalization);
        Self { config, sh }
    }

    pub fn order(&self) -> usize {
        self.config.order
    }

    pub fn num_channels(&self) -> usize {
        num_channels(self.config.order)
    }

    /// Encodes `mono` (source position fixed for the whole buffer) into
    /// `out`, interleaved `[sample0_ch0, sample0_ch1, ..., sample1_ch0, ...]`.
    /// `out.len()` must equal `mono.len() * self.num_channels()`.
    pub fn encode_mono(&self, mono: &[f32], position: Cartesian, out: &mut [f32]) {
        let n = self.num_channels();
        debug_assert_eq!(out.len(), mono.len() * n);

        let spherical = to_spherical(position);
        let mut coeffs = vec![0.0f32; n];
        self.sh.eval_all(spherical.azimuth, spherical.elevation, &mut coeffs);

        let gain = if self.config.apply_distance_gain {
            1.0 / spherical.distance.max(MIN_DISTANCE)
        } else {
            1.0
        };

        for (sample_idx, &sample) in mono.iter().enumerate() {
            let base = sample_idx * n;
            let scaled = sample * gain;
            for (ch, &coeff) in coeffs.iter().enumerate() {
                out[base + ch] = scaled * coeff;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omni_channel_carries_full_signal_at_unit_distance() {
        let encoder = Encoder::new(EncoderConfig {
            apply_distance_gain: false,
            ..EncoderConfig::default()
        });
        let mono = [0.5f32, -0.25, 1.0];
        let mut out = vec![0.0f32; mono.len() * encoder.num_channels()];
        encoder.encode_mono(&mono, Cartesian::new(0.0, 0.0, 1.0), &mut out);

        let n = encoder.num_channels();
        for (i, &sample) in mono.iter().enumerate() {
            assert!((out[i * n] - sample).abs() < 1e-6);
        }
    }

    #[test]
    fn distance_gain_attenuates_far_sources() {
        let encoder = Encoder::new(EncoderConfig::default());
        let mono = [1.0f32];
        let mut near = vec![0.0f32; encoder.num_channels()];
        let mut far = vec![0.0f32; encoder.num_channels()];
        encoder.encode_mono(&mono, Cartesian::new(0.0, 0.0, 1.0), &mut near);
        encoder.encode_mono(&mono, Cartesian::new(0.0, 0.0, 10.0), &mut far);

        assert!(far[0].abs() < near[0].abs());
    }

    #[test]
    fn distance_gain_is_clamped_near_the_listener() {
        let encoder = Encoder::new(EncoderConfig::default());
        let mono = [1.0f32];
        let mut at_min = vec![0.0f32; encoder.num_channels()];
        let mut closer = vec![0.0f32; encoder.num_channels()];
        encoder.encode_mono(&mono, Cartesian::new(0.0, 0.0, MIN_DISTANCE), &mut at_min);
        encoder.encode_mono(&mono, Cartesian::new(0.0, 0.0, MIN_DISTANCE / 10.0), &mut closer);

        assert!((at_min[0] - closer[0]).abs() < 1e-6);
    }

    #[test]
    fn silent_source_encodes_to_silence() {
        let encoder = Encoder::new(EncoderConfig::default());
        let mono = [0.0f32; 8];
        let mut out = vec![1.0f32; mono.len() * encoder.num_channels()];
        encoder.encode_mono(&mono, Cartesian::new(1.0, 2.0, 3.0), &mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn encode_mono_preserves_frame_count() {
        let encoder = Encoder::new(EncoderConfig::default());
        let mono = vec![0.1f32; 512];
        let mut out = vec![0.0f32; mono.len() * encoder.num_channels()];
        encoder.encode_mono(&mono, Cartesian::new(2.0, 0.0, 0.0), &mut out);
        assert_eq!(out.len(), mono.len() * encoder.num_channels());
    }
}
