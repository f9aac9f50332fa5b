/// Audio decoder implementation using Symphonia
use crate::error::{AudioError, Result};
use crate::AudioDecoder;
use leveler_core::{AudioBuffer, AudioFormat, SampleEncoding, SampleRate};
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{
    CodecParameters, DecoderOptions, CODEC_TYPE_NULL, CODEC_TYPE_PCM_ALAW,
    CODEC_TYPE_PCM_F32BE, CODEC_TYPE_PCM_F32LE, CODEC_TYPE_PCM_F64BE, CODEC_TYPE_PCM_F64LE,
    CODEC_TYPE_PCM_MULAW,
};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Codecs that decode to floating point samples
const FLOAT_CODECS: [symphonia::core::codecs::CodecType; 4] = [
    CODEC_TYPE_PCM_F32LE,
    CODEC_TYPE_PCM_F32BE,
    CODEC_TYPE_PCM_F64LE,
    CODEC_TYPE_PCM_F64BE,
];

/// Full-file audio decoder using Symphonia
///
/// The format registry only contains readers the workspace can write back
/// (WAV with PCM codecs). Whatever the probe does not recognize is reported
/// as [`AudioError::UnrecognizedFormat`]; no file extension is consulted.
///
/// Channels are kept as they are (no downmix). Samples are converted to
/// interleaved f32 using symmetric scaling for signed integers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }

    /// Convert one decoded packet to interleaved f32 and append it to `out`
    fn append_buffer(decoded: AudioBufferRef<'_>, out: &mut Vec<f32>) {
        match decoded {
            AudioBufferRef::F32(buf) => Self::interleave(&buf, out, |s| s),
            AudioBufferRef::F64(buf) => Self::interleave(&buf, out, |s| s as f32),
            // Symmetric scaling: divide by 2^(N-1) so that -1.0 is reachable
            AudioBufferRef::S32(buf) => Self::interleave(&buf, out, |s| s as f32 / 2147483648.0),
            AudioBufferRef::S24(buf) => {
                Self::interleave(&buf, out, |s| s.inner() as f32 / 8388608.0);
            }
            AudioBufferRef::S16(buf) => Self::interleave(&buf, out, |s| s as f32 / 32768.0),
            AudioBufferRef::S8(buf) => Self::interleave(&buf, out, |s| s as f32 / 128.0),
            // Unsigned PCM is centered on the mid code
            AudioBufferRef::U32(buf) => {
                Self::interleave(&buf, out, |s| (s as f64 / 2147483648.0 - 1.0) as f32);
            }
            AudioBufferRef::U24(buf) => {
                Self::interleave(&buf, out, |s| s.inner() as f32 / 8388608.0 - 1.0);
            }
            AudioBufferRef::U16(buf) => Self::interleave(&buf, out, |s| s as f32 / 32768.0 - 1.0),
            AudioBufferRef::U8(buf) => Self::interleave(&buf, out, |s| s as f32 / 128.0 - 1.0),
        }
    }

    /// Interleave the planes of a Symphonia buffer, converting each sample
    fn interleave<T, F>(
        buf: &symphonia::core::audio::AudioBuffer<T>,
        out: &mut Vec<f32>,
        convert: F,
    ) where
        T: symphonia::core::sample::Sample + Copy,
        F: Fn(T) -> f32,
    {
        let channels = buf.spec().channels.count();
        let frames = buf.frames();
        let planes: Vec<&[T]> = (0..channels).map(|ch| buf.chan(ch)).collect();

        out.reserve(frames * channels);
        for frame in 0..frames {
            for plane in &planes {
                out.push(convert(plane[frame]));
            }
        }
    }

    /// Work out the on-disk encoding from the codec parameters
    ///
    /// 64-bit float sources are written back as 32-bit float.
    fn source_encoding(params: &CodecParameters) -> Result<SampleEncoding> {
        if FLOAT_CODECS.contains(&params.codec) {
            return Ok(SampleEncoding::Float32);
        }
        if params.codec == CODEC_TYPE_PCM_ALAW || params.codec == CODEC_TYPE_PCM_MULAW {
            return Ok(SampleEncoding::Int16);
        }
        match params.bits_per_sample {
            Some(bits) => Ok(SampleEncoding::from_int_bits(bits)?),
            None => Err(AudioError::DecodeError(
                "bits per sample not reported by the container".to_string(),
            )),
        }
    }
}

/// Map a Symphonia error raised while probing or building the decoder
///
/// Format recognition happens here, so anything the library rejects at
/// this stage means "not an audio file we can handle".
fn classify_open_error(err: SymphoniaError) -> AudioError {
    match err {
        SymphoniaError::Unsupported(msg) => AudioError::UnrecognizedFormat(msg.to_string()),
        SymphoniaError::DecodeError(msg) | SymphoniaError::LimitError(msg) => {
            AudioError::UnrecognizedFormat(msg.to_string())
        }
        // Files shorter than any known header run out of bytes while probing
        SymphoniaError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            AudioError::UnrecognizedFormat("unexpected end of file while probing".to_string())
        }
        SymphoniaError::IoError(e) => AudioError::Io(e),
        other => AudioError::DecodeError(other.to_string()),
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, path: &Path) -> Result<AudioBuffer> {
        if !path.exists() {
            return Err(AudioError::FileNotFound(path.display().to_string()));
        }

        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // No extension hint: recognition is left to the probe alone
        let probed = symphonia::default::get_probe()
            .format(
                &Hint::new(),
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(classify_open_error)?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::UnrecognizedFormat("no audio track found".to_string()))?;

        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| AudioError::DecodeError("missing sample rate".to_string()))?;
        let channels = track
            .codec_params
            .channels
            .map(|c| c.count())
            .ok_or_else(|| AudioError::DecodeError("missing channel layout".to_string()))?;
        let encoding = Self::source_encoding(&track.codec_params)?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(classify_open_error)?;

        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => {
                    return Err(AudioError::DecodeError(format!(
                        "error reading packet: {e}"
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => Self::append_buffer(decoded, &mut samples),
                // A corrupt packet is skipped; the rest of the stream is still usable
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!(path = %path.display(), "Skipping corrupt packet: {}", e);
                }
                Err(e) => return Err(AudioError::DecodeError(e.to_string())),
            }
        }

        let format = AudioFormat::new(SampleRate::new(sample_rate), channels as u16, encoding);
        tracing::debug!(
            path = %path.display(),
            frames = samples.len() / channels.max(1),
            "Decoded {} ({}, {} ch, {})",
            path.display(),
            format.sample_rate,
            format.channels,
            format.encoding
        );

        Ok(AudioBuffer::try_new(samples, format)?)
    }
}
