//! The `.shac` binary container: fixed header, JSON-described layers,
//! interleaved ambisonic audio.

pub mod header;
pub mod layer;
pub mod reader;
pub mod writer;

pub use header::Header;
pub use layer::{Layer, LayerMeta};
pub use reader::{parse, Container};
pub use writer::Writer;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphharm::Normalization;

    /// A minimal single-layer, order-1 file has an exact expected byte
    /// sequence: magic, version=1, order=1, channels=4, sample_rate=48000,
    /// bit_depth=32, sample_count=4, layer_count=1, normalization=1 (SN3D).
    #[test]
    fn trivial_file_has_exact_byte_sequence() {
        let mut writer = Writer::new(1, Normalization::Sn3d, 48_000, 4).unwrap();
        writer
            .add_layer(
                Layer::new("a", LayerMeta::new("point", [0.0, 0.0, 1.0]), vec![1.0; 16]).unwrap(),
            )
            .unwrap();
        let bytes = writer.write().unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(b"SHAC");
        expected.extend_from_slice(&1u16.to_le_bytes()); // version
        expected.extend_from_slice(&1u16.to_le_bytes()); // order
        expected.extend_from_slice(&4u16.to_le_bytes()); // channel_count
        expected.extend_from_slice(&48_000u32.to_le_bytes()); // sample_rate
        expected.extend_from_slice(&32u32.to_le_bytes()); // bit_depth
        expected.extend_from_slice(&4u32.to_le_bytes()); // sample_count
        expected.extend_from_slice(&1u16.to_le_bytes()); // layer_count
        expected.extend_from_slice(&1u16.to_le_bytes()); // normalization

        assert_eq!(&bytes[..header::HEADER_LEN], &expected[..]);

        let id_len = u16::from_le_bytes([
            bytes[header::HEADER_LEN],
            bytes[header::HEADER_LEN + 1],
        ]);
        assert_eq!(id_len, 1);
    }

    /// Byte-exact check against the literal scenario 1 header hex: a
    /// single order-1, 4-sample layer at 48 kHz, SN3D normalization.
    #[test]
    fn trivial_file_matches_literal_reference_header_bytes() {
        let header = header::Header::new(1, Normalization::Sn3d, 48_000, 4, 1);
        let mut bytes = Vec::new();
        header.write(&mut bytes);

        let expected: [u8; header::HEADER_LEN] = [
            0x53, 0x48, 0x41, 0x43, // "SHAC"
            0x01, 0x00, // version
            0x01, 0x00, // order
            0x04, 0x00, // channel_count
            0x80, 0xBB, 0x00, 0x00, // sample_rate = 48000
            0x20, 0x00, 0x00, 0x00, // bit_depth = 32
            0x04, 0x00, 0x00, 0x00, // sample_count = 4
            0x01, 0x00, // layer_count
            0x01, 0x00, // normalization
        ];
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn corrupted_magic_is_rejected_end_to_end() {
        let mut writer = Writer::new(1, Normalization::Sn3d, 48_000, 1).unwrap();
        writer
            .add_layer(Layer::new("a", LayerMeta::new("point", [0.0, 0.0, 1.0]), vec![0.0; 4]).unwrap())
            .unwrap();
        let mut bytes = writer.write().unwrap();
        bytes[0] = b'X';

        assert!(parse(&bytes).is_err());
    }
}
