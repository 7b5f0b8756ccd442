//! Minimal RIFF/WAVE reader and writer for 32-bit float PCM, used by the CLI
//! demonstration commands. Adapted from the library's own W64 writer, but
//! standard RIFF instead of Sony Wave64, and IEEE float instead of 24-bit
//! PCM, since the CLI only ever moves `f32` samples to and from `shac`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

const FORMAT_IEEE_FLOAT: u16 = 3;

/// A writer for RIFF/WAVE files containing interleaved `f32` PCM.
pub struct WavWriter {
    writer: BufWriter<File>,
    riff_size_position: u64,
    data_size_position: u64,
    data_written_bytes: u64,
    sample_rate: u32,
    channels: u16,
}

impl WavWriter {
    pub fn create(path: &Path, sample_rate: u32, channels: u16) -> io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = Self {
            writer: BufWriter::new(file),
            riff_size_position: 0,
            data_size_position: 0,
            data_written_bytes: 0,
            sample_rate,
            channels,
        };
        writer.write_header()?;
        Ok(writer)
    }

    fn write_header(&mut self) -> io::Result<()> {
        self.writer.write_all(b"RIFF")?;
        self.riff_size_position = self.writer.stream_position()?;
        self.writer.write_all(&0u32.to_le_bytes())?;
        self.writer.write_all(b"WAVE")?;

        self.writer.write_all(b"fmt ")?;
        self.writer.write_all(&16u32.to_le_bytes())?;
        self.writer.write_all(&FORMAT_IEEE_FLOAT.to_le_bytes())?;
        self.writer.write_all(&self.channels.to_le_bytes())?;
        self.writer.write_all(&self.sample_rate.to_le_bytes())?;
        let block_align = self.channels as u32 * 4;
        let byte_rate = self.sample_rate * block_align;
        self.writer.write_all(&byte_rate.to_le_bytes())?;
        self.writer.write_all(&(block_align as u16).to_le_bytes())?;
        self.writer.write_all(&32u16.to_le_bytes())?;

        self.writer.write_all(b"data")?;
        self.data_size_position = self.writer.stream_position()?;
        self.writer.write_all(&0u32.to_le_bytes())?;

        Ok(())
    }

    pub fn write_samples(&mut self, samples: &[f32]) -> io::Result<()> {
        for &sample in samples {
            self.writer.write_all(&sample.to_le_bytes())?;
        }
        self.data_written_bytes += (samples.len() * 4) as u64;
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.writer.flush()?;
        let end_position = self.writer.stream_position()?;

        self.writer.seek(SeekFrom::Start(self.data_size_position))?;
        self.writer.write_all(&(self.data_written_bytes as u32).to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(self.riff_size_position))?;
        let riff_size = (end_position - 8) as u32;
        self.writer.write_all(&riff_size.to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(end_position))?;
        self.writer.flush()
    }
}

/// A fully decoded RIFF/WAVE file: format parameters plus interleaved
/// `f32` samples.
pub struct WavData {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

/// Reads a RIFF/WAVE file containing either 16-bit integer or 32-bit float
/// PCM, normalizing integer samples to `[-1.0, 1.0]`.
pub fn read(path: &Path) -> io::Result<WavData> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut riff_tag = [0u8; 4];
    reader.read_exact(&mut riff_tag)?;
    if &riff_tag != b"RIFF" {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "not a RIFF file"));
    }
    reader.seek(SeekFrom::Current(4))?;
    let mut wave_tag = [0u8; 4];
    reader.read_exact(&mut wave_tag)?;
    if &wave_tag != b"WAVE" {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "not a WAVE file"));
    }

    let mut sample_rate = 0u32;
    let mut channels = 0u16;
    let mut bits_per_sample = 0u16;
    let mut format_tag = 0u16;
    let mut samples = Vec::new();

    loop {
        let mut chunk_id = [0u8; 4];
        if reader.read_exact(&mut chunk_id).is_err() {
            break;
        }
        let mut size_bytes = [0u8; 4];
        reader.read_exact(&mut size_bytes)?;
        let size = u32::from_le_bytes(size_bytes) as usize;

        match &chunk_id {
            b"fmt " => {
                let mut fmt = vec![0u8; size];
                reader.read_exact(&mut fmt)?;
                format_tag = u16::from_le_bytes([fmt[0], fmt[1]]);
                channels = u16::from_le_bytes([fmt[2], fmt[3]]);
                sample_rate = u32::from_le_bytes([fmt[4], fmt[5], fmt[6], fmt[7]]);
                bits_per_sample = u16::from_le_bytes([fmt[14], fmt[15]]);
            }
            b"data" => {
                let mut data = vec![0u8; size];
                reader.read_exact(&mut data)?;
                samples = decode_pcm(&data, format_tag, bits_per_sample)?;
            }
            _ => {
                reader.seek(SeekFrom::Current(size as i64))?;
            }
        }
        if size % 2 == 1 {
            reader.seek(SeekFrom::Current(1))?;
        }
    }

    Ok(WavData {
        sample_rate,
        channels,
        samples,
    })
}

fn decode_pcm(data: &[u8], format_tag: u16, bits_per_sample: u16) -> io::Result<Vec<f32>> {
    match (format_tag, bits_per_sample) {
        (FORMAT_IEEE_FLOAT, 32) => Ok(data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()),
        (1, 16) => Ok(data
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]) as f32 / i16::MAX as f32)
            .collect()),
        (tag, bits) => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported WAV format tag {tag} at {bits} bits per sample"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    #[test]
    fn round_trips_float_samples() {
        let path = temp_dir().join("shac_wav_write_test.wav");
        let samples = [0.5f32, -0.5, 0.25, -0.25];
        let writer = WavWriter::create(&path, 48_000, 2).unwrap();
        let mut writer = writer;
        writer.write_samples(&samples).unwrap();
        writer.finish().unwrap();

        let data = read(&path).unwrap();
        assert_eq!(data.sample_rate, 48_000);
        assert_eq!(data.channels, 2);
        assert_eq!(data.samples, samples);

        std::fs::remove_file(&path).ok();
    }
}
