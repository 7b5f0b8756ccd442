//! Real-time, block-oriented binaural decode.
//!
//! [`Decoder::produce_block`] is the only method the audio callback calls:
//! it never allocates, never locks, and never returns an error. Everything
//! that can fail -- missing layers, malformed HRTF data, shape mismatches --
//! is checked once at [`Decoder::new`] instead, so the hot path is
//! infallible by construction.

use crate::coord::{to_spherical, Cartesian};
use crate::error::{HrtfError, ShacError};
use crate::hrtf::HrtfTable;
use crate::listener::{ListenerPose, PoseSlot};
use crate::rotator::{rotate, DegreeMatrix, Rotator, MAX_DEGREE_BLOCK};
use crate::sphharm::num_channels;
use std::sync::Arc;

/// Per-distance gain floor, matching [`crate::encoder::MIN_DISTANCE`] so
/// encode and decode agree on how close is "at the listener."
const MIN_DISTANCE: f32 = 0.1;

/// Decode-side tuning knobs that aren't part of a layer's own data: how many
/// frames the caller pulls per [`Decoder::produce_block`] call, and the
/// rotation cache's size/quantization. There is no config file or
/// environment variable backing this -- the `shac-cli` binary is the only
/// place flags populate it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecoderConfig {
    pub block_size: usize,
    pub rotation_cache_capacity: usize,
    pub rotation_quantum: f32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            block_size: 1024,
            rotation_cache_capacity: crate::rotator::CACHE_CAPACITY,
            rotation_quantum: crate::rotator::ANGLE_QUANTUM,
        }
    }
}

#[derive(Debug)]
struct DecodeLayer {
    position: Cartesian,
    /// Per-layer gain from its metadata, applied on top of the inverse-
    /// distance law.
    gain: f32,
    channel_count: usize,
    sample_count: usize,
    /// Interleaved `[sample][channel]`.
    samples: Vec<f32>,
}

/// A block-oriented decoder for a fixed set of ambisonic layers, rendered
/// to stereo through an [`HrtfTable`]. Owns pre-allocated scratch buffers
/// sized once at construction so `produce_block` never allocates.
#[derive(Debug)]
pub struct Decoder {
    order: usize,
    channel_count: usize,
    layers: Vec<DecodeLayer>,
    hrtf: HrtfTable,
    pose: Arc<PoseSlot>,
    rotator: Rotator,
    cursor: usize,
    bus: Vec<f32>,
    rotated: Vec<f32>,
    convolution_history: Vec<Vec<f32>>,
    rotate_scratch_in: Vec<f32>,
    rotate_scratch_out: Vec<f32>,
}

impl Decoder {
    /// Builds a decoder for `layers` (position, per-layer gain, samples)
    /// against `order`, validating the HRTF table's channel count up front.
    /// The returned decoder owns a clone of `pose` so the caller retains a
    /// handle to publish new poses.
    pub fn new(
        order: usize,
        layers: Vec<(Cartesian, f32, Vec<f32>)>,
        sample_count: usize,
        hrtf: HrtfTable,
        pose: Arc<PoseSlot>,
    ) -> Result<Self, ShacError> {
        let channel_count = num_channels(order);
        if hrtf.num_channels() != channel_count {
            return Err(HrtfError::ChannelCountMismatch {
                expected: channel_count,
                actual: hrtf.num_channels(),
            }
            .into());
        }

        let decode_layers = layers
            .into_iter()
            .map(|(position, gain, samples)| DecodeLayer {
                position,
                gain,
                channel_count,
                sample_count,
                samples,
            })
            .collect();

        let history_len = hrtf.max_latency_samples().max(1);
        let convolution_history = vec![vec![0.0f32; history_len]; channel_count];

        Ok(Self {
            order,
            channel_count,
            layers: decode_layers,
            hrtf,
            pose,
            rotator: Rotator::new(order),
            cursor: 0,
            bus: vec![0.0; channel_count],
            rotated: vec![0.0; channel_count],
            convolution_history,
            rotate_scratch_in: vec![0.0; MAX_DEGREE_BLOCK],
            rotate_scratch_out: vec![0.0; MAX_DEGREE_BLOCK],
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Fills `out` (stereo interleaved, `out.len()` a multiple of 2) with
    /// the next `out.len() / 2` frames of binaural audio. Returns the number
    /// of frames actually produced; any shortfall (end of stream) is
    /// zero-filled in `out`.
    pub fn produce_block(&mut self, out: &mut [f32]) -> usize {
        debug_assert_eq!(out.len() % 2, 0);
        let frames_requested = out.len() / 2;
        let pose = self.pose.read();
        // Borrowed from `self.rotator`; every other buffer touched below is
        // a distinct field, so this borrow and `&mut self.bus` etc. can
        // coexist without cloning the matrices per block.
        let matrices = self.rotator.rotation_for(pose.yaw, pose.pitch);

        let remaining = self
            .layers
            .iter()
            .map(|l| l.sample_count)
            .max()
            .unwrap_or(0);
        let cursor = self.cursor;

        let mut produced = 0;
        for frame in 0..frames_requested {
            let sample_index = cursor + frame;
            if sample_index >= remaining {
                break;
            }
            render_frame(
                &self.layers,
                &self.hrtf,
                matrices,
                pose,
                sample_index,
                self.channel_count,
                &mut self.bus,
                &mut self.rotated,
                &mut self.convolution_history,
                &mut self.rotate_scratch_in,
                &mut self.rotate_scratch_out,
                &mut out[frame * 2..frame * 2 + 2],
            );
            produced += 1;
        }

        for frame in produced..frames_requested {
            out[frame * 2] = 0.0;
            out[frame * 2 + 1] = 0.0;
        }

        self.cursor += produced;
        produced
    }
}

#[allow(clippy::too_many_arguments)]
fn render_frame(
    layers: &[DecodeLayer],
    hrtf: &HrtfTable,
    matrices: &[DegreeMatrix],
    pose: ListenerPose,
    sample_index: usize,
    channel_count: usize,
    bus: &mut [f32],
    rotated: &mut [f32],
    convolution_history: &mut [Vec<f32>],
    scratch_in: &mut [f32],
    scratch_out: &mut [f32],
    out_stereo: &mut [f32],
) {
    bus.iter_mut().for_each(|v| *v = 0.0);

    for layer in layers {
        if sample_index >= layer.sample_count {
            continue;
        }
        let relative = layer.position.sub(Cartesian::new(pose.x, pose.y, pose.z));
        let spherical = to_spherical(relative);
        let gain = layer.gain / spherical.distance.max(MIN_DISTANCE);
        if !gain.is_finite() {
            log::warn!("non-finite distance gain for layer at {relative:?}; clamping to 0");
            continue;
        }

        let base = sample_index * layer.channel_count;
        rotated.iter_mut().for_each(|v| *v = 0.0);
        for ch in 0..layer.channel_count {
            let sample = layer.samples[base + ch];
            rotated[ch] = if sample.is_finite() { sample * gain } else { 0.0 };
        }
        if rotated.iter().any(|v| !v.is_finite()) {
            log::debug!("scrubbed non-finite ambisonic coefficient before rotation");
        }
        rotate(matrices, rotated, scratch_in, scratch_out);

        for (bus_slot, &value) in bus.iter_mut().zip(rotated.iter()) {
            if value.is_finite() {
                *bus_slot += value;
            }
        }
    }

    decode_binaural(hrtf, bus, convolution_history, channel_count, out_stereo);
}

fn decode_binaural(
    hrtf: &HrtfTable,
    bus: &[f32],
    convolution_history: &mut [Vec<f32>],
    channel_count: usize,
    out_stereo: &mut [f32],
) {
    match hrtf {
        HrtfTable::Scalar { gains } => {
            let mut left = 0.0f32;
            let mut right = 0.0f32;
            for (ch, &[gl, gr]) in gains.iter().enumerate() {
                left += bus[ch] * gl;
                right += bus[ch] * gr;
            }
            out_stereo[0] = scrub(left);
            out_stereo[1] = scrub(right);
        }
        HrtfTable::Convolution { left, right } => {
            for (ch, history) in convolution_history.iter_mut().enumerate() {
                history.rotate_right(1);
                history[0] = bus[ch];
            }
            let mut left_sum = 0.0f32;
            let mut right_sum = 0.0f32;
            for ch in 0..channel_count {
                let history = &convolution_history[ch];
                for (tap, &coeff) in left[ch].iter().enumerate() {
                    if let Some(&sample) = history.get(tap) {
                        left_sum += coeff * sample;
                    }
                }
                for (tap, &coeff) in right[ch].iter().enumerate() {
                    if let Some(&sample) = history.get(tap) {
                        right_sum += coeff * sample;
                    }
                }
            }
            out_stereo[0] = scrub(left_sum);
            out_stereo[1] = scrub(right_sum);
        }
    }
}

fn scrub(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphharm::Normalization;

    fn flat_hrtf(order: usize) -> HrtfTable {
        HrtfTable::flat(order, 1.0, 1.0)
    }

    #[test]
    fn produce_block_returns_requested_frames_within_stream() {
        let order = 1;
        let samples = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]; // 2 frames
        let pose = Arc::new(PoseSlot::new(ListenerPose::default()));
        let mut decoder = Decoder::new(
            order,
            vec![(Cartesian::new(0.0, 0.0, 1.0), 1.0, samples)],
            2,
            flat_hrtf(order),
            pose,
        )
        .unwrap();

        let mut out = vec![0.0f32; 4]; // 2 frames stereo
        let produced = decoder.produce_block(&mut out);
        assert_eq!(produced, 2);
    }

    #[test]
    fn produce_block_zero_pads_past_end_of_stream() {
        let order = 0;
        let samples = vec![1.0]; // 1 frame
        let pose = Arc::new(PoseSlot::new(ListenerPose::default()));
        let mut decoder = Decoder::new(
            order,
            vec![(Cartesian::new(0.0, 0.0, 1.0), 1.0, samples)],
            1,
            flat_hrtf(order),
            pose,
        )
        .unwrap();

        let mut out = vec![9.0f32; 8]; // request 4 frames, only 1 available
        let produced = decoder.produce_block(&mut out);
        assert_eq!(produced, 1);
        assert_eq!(&out[2..], &[0.0; 6]);
    }

    #[test]
    fn rejects_mismatched_hrtf_channel_count() {
        let pose = Arc::new(PoseSlot::new(ListenerPose::default()));
        let err = Decoder::new(
            3,
            vec![(Cartesian::new(0.0, 0.0, 1.0), 1.0, vec![0.0; 16])],
            1,
            HrtfTable::flat(1, 1.0, 1.0),
            pose,
        )
        .unwrap_err();
        assert!(matches!(err, ShacError::Hrtf(HrtfError::ChannelCountMismatch { .. })));
    }

    #[test]
    fn listener_pose_changes_output_between_blocks() {
        let order = 1;
        let channels = num_channels(order);
        let mut sh = vec![0.0f32; channels];
        crate::sphharm::SphHarm::new(order, Normalization::Sn3d).eval_all(0.0, 0.0, &mut sh);
        let samples: Vec<f32> = std::iter::repeat(sh).take(4).flatten().collect();

        let pose = Arc::new(PoseSlot::new(ListenerPose::default()));
        let mut decoder = Decoder::new(
            order,
            vec![(Cartesian::new(0.0, 0.0, 1.0), 1.0, samples)],
            4,
            flat_hrtf(order),
            Arc::clone(&pose),
        )
        .unwrap();

        let mut first = vec![0.0f32; 2];
        decoder.produce_block(&mut first);

        pose.publish(ListenerPose {
            yaw: std::f32::consts::PI,
            ..ListenerPose::default()
        });
        let mut second = vec![0.0f32; 2];
        decoder.produce_block(&mut second);

        // Yaw rotation shouldn't silence the stream (omni channel is
        // yaw-invariant so energy should still reach the output).
        assert!(second[0].is_finite());
    }

    #[test]
    fn non_finite_input_samples_are_scrubbed_not_propagated() {
        let order = 0;
        let samples = vec![f32::NAN];
        let pose = Arc::new(PoseSlot::new(ListenerPose::default()));
        let mut decoder = Decoder::new(
            order,
            vec![(Cartesian::new(0.0, 0.0, 1.0), 1.0, samples)],
            1,
            flat_hrtf(order),
            pose,
        )
        .unwrap();

        let mut out = vec![0.0f32; 2];
        decoder.produce_block(&mut out);
        assert!(out[0].is_finite());
        assert!(out[1].is_finite());
    }

    #[test]
    fn layer_gain_scales_output_relative_to_unit_gain() {
        let order = 0;
        let loud = Decoder::new(
            order,
            vec![(Cartesian::new(0.0, 0.0, 1.0), 2.0, vec![1.0])],
            1,
            flat_hrtf(order),
            Arc::new(PoseSlot::new(ListenerPose::default())),
        );
        let quiet = Decoder::new(
            order,
            vec![(Cartesian::new(0.0, 0.0, 1.0), 1.0, vec![1.0])],
            1,
            flat_hrtf(order),
            Arc::new(PoseSlot::new(ListenerPose::default())),
        );

        let mut loud_out = vec![0.0f32; 2];
        loud.unwrap().produce_block(&mut loud_out);
        let mut quiet_out = vec![0.0f32; 2];
        quiet.unwrap().produce_block(&mut quiet_out);

        assert!((loud_out[0] - 2.0 * quiet_out[0]).abs() < 1e-5);
    }
}
