//! Gain helpers for peak and loudness normalization
//!
//! Both normalizations are plain gain changes: they scale every sample by
//! the same factor and never reshape the signal.

use leveler_core::AudioBuffer;

/// Convert a gain in dB to a linear factor
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Copy of `buffer` with `gain_db` applied
#[must_use]
pub fn apply_gain_db(buffer: &AudioBuffer, gain_db: f64) -> AudioBuffer {
    buffer.scaled(db_to_linear(gain_db) as f32)
}

/// Gain that moves a measured loudness onto a target loudness
pub fn loudness_gain_db(current_lufs: f64, target_lufs: f64) -> f64 {
    target_lufs - current_lufs
}

/// Peak-normalize `buffer` so its true peak lands on `ceiling_dbtp`
///
/// Returns the new buffer together with the gain that was applied.
pub fn peak_normalize(
    buffer: &AudioBuffer,
    true_peak_dbtp: f64,
    ceiling_dbtp: f64,
) -> (AudioBuffer, f64) {
    let gain_db = ceiling_dbtp - true_peak_dbtp;
    (apply_gain_db(buffer, gain_db), gain_db)
}

/// Loudness-normalize `buffer` from `current_lufs` to `target_lufs`
pub fn loudness_normalize(
    buffer: &AudioBuffer,
    current_lufs: f64,
    target_lufs: f64,
) -> AudioBuffer {
    apply_gain_db(buffer, loudness_gain_db(current_lufs, target_lufs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use leveler_core::{AudioFormat, SampleEncoding, SampleRate};

    fn buffer(samples: Vec<f32>) -> AudioBuffer {
        AudioBuffer::new(
            samples,
            AudioFormat::new(SampleRate::DVD_QUALITY, 1, SampleEncoding::Float32),
        )
    }

    #[test]
    fn test_db_to_linear() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-12);
        assert!((db_to_linear(-20.0) - 0.1).abs() < 1e-12);
        assert!((db_to_linear(6.0206) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_peak_normalize_hits_ceiling() {
        let source = buffer(vec![0.25, -0.5, 0.1]);
        // Peak of 0.5 is about -6.02 dB
        let (normalized, gain_db) = peak_normalize(&source, -6.0206, -1.0);

        assert!((gain_db - 5.0206).abs() < 1e-9);
        let expected_peak = db_to_linear(-1.0) as f32;
        assert!((normalized.sample_peak() - expected_peak).abs() < 1e-4);
        // Relative levels untouched
        assert!((normalized.samples[0] / normalized.samples[1] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_loudness_normalize_direction() {
        let source = buffer(vec![0.5, -0.5]);
        let quieter = loudness_normalize(&source, -10.0, -30.0);
        assert!((quieter.samples[0] - 0.05).abs() < 1e-6);

        let louder = loudness_normalize(&source, -30.0, -24.0);
        assert!(louder.samples[0] > 0.99);
    }
}
