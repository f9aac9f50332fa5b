//! WAV encoding using hound
//!
//! Writes an [`AudioBuffer`] back to disk with the sample rate, channel
//! count and sample encoding recorded at decode time.

use crate::error::Result;
use crate::AudioEncoder;
use leveler_core::{AudioBuffer, LevelerError, SampleEncoding};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Result of a successful encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeReport {
    /// Samples that exceeded full scale and were clamped
    pub clipped_samples: usize,
}

/// WAV encoder
///
/// Output is first written to a `.part` sibling and renamed into place once
/// the header is finalized, so an interrupted run never leaves a truncated
/// file at the destination path.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavEncoder;

impl WavEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self
    }

    fn spec_for(buffer: &AudioBuffer) -> hound::WavSpec {
        let format = &buffer.format;
        hound::WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate.as_hz(),
            bits_per_sample: format.bits_per_sample(),
            sample_format: if format.encoding.is_float() {
                hound::SampleFormat::Float
            } else {
                hound::SampleFormat::Int
            },
        }
    }

    fn write_file(path: &Path, spec: hound::WavSpec, buffer: &AudioBuffer) -> Result<usize> {
        let file = BufWriter::new(File::create(path)?);
        let mut writer = hound::WavWriter::new(file, spec)?;
        let clipped = Self::write_samples(&mut writer, buffer)?;
        writer.finalize()?;
        Ok(clipped)
    }

    fn write_samples<W>(writer: &mut hound::WavWriter<W>, buffer: &AudioBuffer) -> Result<usize>
    where
        W: std::io::Write + std::io::Seek,
    {
        let encoding = buffer.format.encoding;
        let mut clipped = 0;

        for &sample in &buffer.samples {
            if sample.abs() > 1.0 {
                clipped += 1;
            }
            match encoding {
                SampleEncoding::Float32 => writer.write_sample(sample)?,
                SampleEncoding::Int8 => writer.write_sample(quantize(sample, 8) as i8)?,
                SampleEncoding::Int16 => writer.write_sample(quantize(sample, 16) as i16)?,
                SampleEncoding::Int24 => writer.write_sample(quantize(sample, 24))?,
                SampleEncoding::Int32 => writer.write_sample(quantize(sample, 32))?,
            }
        }

        Ok(clipped)
    }
}

/// Temporary path used while a file is being written
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Convert a float sample to a signed integer code of the given bit depth
///
/// Values outside [-1.0, 1.0] are clamped to the integer range.
pub fn quantize(sample: f32, bits: u32) -> i32 {
    let scale = f64::from(1_u32 << (bits - 1));
    let code = (f64::from(sample) * scale).round();
    code.clamp(-scale, scale - 1.0) as i32
}

impl AudioEncoder for WavEncoder {
    fn encode(&self, path: &Path, buffer: &AudioBuffer) -> Result<EncodeReport> {
        if buffer.format.channels == 0 {
            return Err(LevelerError::invalid_buffer("cannot encode zero channels").into());
        }

        let spec = Self::spec_for(buffer);
        let tmp_path = partial_path(path);

        let clipped_samples = match Self::write_file(&tmp_path, spec, buffer) {
            Ok(clipped) => clipped,
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                return Err(e);
            }
        };

        fs::rename(&tmp_path, path)?;

        if clipped_samples > 0 && !buffer.format.encoding.is_float() {
            tracing::warn!(
                path = %path.display(),
                clipped_samples,
                "Samples exceeded full scale and were clamped"
            );
        }

        Ok(EncodeReport { clipped_samples })
    }
}
