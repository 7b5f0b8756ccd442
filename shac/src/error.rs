//! Error taxonomy for the container and codec core.
//!
//! One enum per concern (header, layer, HRTF), aggregated into
//! [`ShacError`] for callers that don't need to match on the narrower type.

use thiserror::Error;

/// Errors raised while parsing or validating the fixed 26-byte header.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeaderError {
    #[error("invalid magic bytes: expected 'SHAC', read {0:02X?}")]
    InvalidMagic([u8; 4]),

    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u16),

    #[error("ambisonic order must be in 1..=7, read {0}")]
    InvalidOrder(u16),

    #[error("channel count mismatch: order {order} requires {expected} channels, read {actual}")]
    ChannelMismatch {
        order: u16,
        expected: u16,
        actual: u16,
    },

    #[error("bit depth must be 32, read {0}")]
    InvalidBitDepth(u32),

    #[error("sample rate {0} Hz outside the supported 8000..=192000 range")]
    InvalidSampleRate(u32),

    #[error("samples-per-channel must be nonzero")]
    InvalidSampleCount,

    #[error("layer count must be >= 1, read {0}")]
    InvalidLayerCount(u16),

    #[error("normalization tag must be 1 (SN3D) or 2 (N3D), read {0}")]
    InvalidNormalization(u16),

    #[error("file is empty")]
    EmptyFile,

    #[error("header truncated: need 26 bytes, found {0}")]
    TruncatedHeader(usize),
}

/// Errors raised while parsing, validating, or appending a single layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerError {
    #[error("layer id must be 1..=256 UTF-8 bytes, read {0}")]
    InvalidLayerId(usize),

    #[error("duplicate layer id: {0:?}")]
    DuplicateLayerId(String),

    #[error("layer metadata must serialize to 1..=4096 bytes, read {0}")]
    MetadataTooLarge(usize),

    #[error("layer metadata is not valid JSON: {0}")]
    InvalidMetadata(String),

    #[error("layer metadata missing or malformed `position`: expected 3 finite numbers")]
    InvalidPosition,

    #[error("layer metadata missing `type` string")]
    MissingType,

    #[error("layer metadata `gain` must be a finite number")]
    InvalidGain,

    #[error(
        "ambisonic block shape mismatch: expected {expected_samples} samples x {expected_channels} channels, got {actual_samples} x {actual_channels}"
    )]
    ShapeMismatch {
        expected_samples: usize,
        expected_channels: usize,
        actual_samples: usize,
        actual_channels: usize,
    },

    #[error(
        "layer audio payload truncated: expected {expected} bytes, found {actual} for layer {layer_index}"
    )]
    TruncatedData {
        layer_index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("layer header truncated while reading layer {layer_index}")]
    TruncatedLayerHeader { layer_index: usize },
}

/// Errors raised constructing or looking up an HRTF table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HrtfError {
    #[error("HRTF table has {actual} channels, expected {expected} for this order")]
    ChannelCountMismatch { expected: usize, actual: usize },

    #[error("HRTF impulse responses must be nonempty")]
    EmptyImpulseResponse,
}

/// The union of everything that can go wrong opening or writing a `.shac`
/// container. The real-time decode path never returns
/// this type once a [`crate::decoder::Decoder`] has been successfully
/// opened; all of its failure handling happens at open time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShacError {
    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error(transparent)]
    Layer(#[from] LayerError),

    #[error(transparent)]
    Hrtf(#[from] HrtfError),
}
