//! SHAC: a spherical-harmonic ambisonic audio container.
//!
//! Modules are organized bottom-up, each one grounded in a single section
//! of the format and math:
//!
//! - [`sphharm`] -- real spherical harmonics, the math core everything else
//!   builds on.
//! - [`coord`] -- Cartesian/spherical conversions shared by the encoder and
//!   decoder.
//! - [`rotator`] -- per-order ambisonic rotation from listener yaw/pitch.
//! - [`encoder`] -- mono source -> ambisonic channel encoding.
//! - [`hrtf`] -- binaural rendering data (scalar gains or impulse
//!   responses).
//! - [`listener`] -- the lock-free pose transport the decoder reads each
//!   block.
//! - [`container`] -- the `.shac` binary file format: header, layers,
//!   reader, writer.
//! - [`decoder`] -- the real-time, allocation-free block decode path.
//! - [`error`] -- the error taxonomy every fallible operation in this crate
//!   returns into.
//! - [`wire`] -- little-endian primitive serialization shared by the
//!   container writer.

pub mod container;
pub mod coord;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod hrtf;
pub mod listener;
pub mod rotator;
pub mod sphharm;
pub mod wire;

pub use coord::{Cartesian, Spherical};
pub use decoder::{Decoder, DecoderConfig};
pub use encoder::{Encoder, EncoderConfig};
pub use error::ShacError;
pub use hrtf::HrtfTable;
pub use listener::{ListenerPose, PoseSlot};
pub use rotator::Rotator;
pub use sphharm::{Normalization, SphHarm};
