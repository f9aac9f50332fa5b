//! Two-pass engine tests
//!
//! Tests include:
//! - Collection scenarios (quiet + loud, mixed sample rates, silent records)
//! - Property-based tests with proptest

use leveler_core::{AudioBuffer, AudioFormat, DecodedRecord, SampleEncoding, SampleRate};
use leveler_loudness::{
    EngineSettings, LoudnessEngine, LoudnessError, TargetPolicy, TARGET_TOLERANCE_LU,
};
use proptest::prelude::*;
use std::path::PathBuf;

// ========== Helper Functions ==========

/// Mono or multi-channel 1 kHz sine
fn sine(sample_rate: u32, channels: u16, amplitude: f32, duration_secs: f32) -> AudioBuffer {
    let frames = (sample_rate as f32 * duration_secs) as usize;
    let mut samples = Vec::with_capacity(frames * channels as usize);
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let s = amplitude * (2.0 * std::f32::consts::PI * 1000.0 * t).sin();
        for _ in 0..channels {
            samples.push(s);
        }
    }
    AudioBuffer::new(
        samples,
        AudioFormat::new(SampleRate::new(sample_rate), channels, SampleEncoding::Int16),
    )
}

/// Quiet sine with a single loud click: high crest factor, so it stays quiet
/// after peak normalization
fn quiet_with_click(sample_rate: u32) -> AudioBuffer {
    let mut buffer = sine(sample_rate, 1, 0.05, 3.0);
    buffer.samples[sample_rate as usize] = 0.9;
    buffer
}

fn record(name: &str, audio: AudioBuffer) -> DecodedRecord {
    DecodedRecord::new(
        PathBuf::from("/in").join(name),
        PathBuf::from(name),
        audio,
    )
}

fn engine() -> LoudnessEngine {
    LoudnessEngine::new(EngineSettings::default()).unwrap()
}

// ========== Scenarios ==========

#[test]
fn test_quiet_file_sets_collection_target() {
    let mut engine = engine();
    let pass = engine.measure(vec![
        record("a/quiet.wav", quiet_with_click(48000)),
        record("b/loud.wav", sine(48000, 1, 0.5, 3.0)),
    ]);

    assert!(pass.failures.is_empty());
    assert_eq!(pass.measured.len(), 2);

    let quiet = &pass.measured[0].measurement;
    let loud = &pass.measured[1].measurement;
    assert!(
        quiet.peak_normalized_lufs < loud.peak_normalized_lufs - 15.0,
        "quiet {:.2} vs loud {:.2}",
        quiet.peak_normalized_lufs,
        loud.peak_normalized_lufs
    );
    assert_eq!(pass.target_lufs, Some(quiet.peak_normalized_lufs));

    // The loud sine lands 1 dB below full scale after peak normalization
    assert!((loud.true_peak_dbtp - (-6.02)).abs() < 0.3);
    assert!((loud.peak_gain_db - (-1.0 - loud.true_peak_dbtp)).abs() < 1e-9);

    let target = pass.target_lufs.unwrap();
    let normalized = engine.normalize(pass.measured, target);
    assert!(normalized.failures.is_empty());
    assert_eq!(normalized.normalized.len(), 2);

    for record in &normalized.normalized {
        assert!(
            (record.achieved_lufs - target).abs() < TARGET_TOLERANCE_LU,
            "{}: achieved {:.2}, target {:.2}",
            record.relative.display(),
            record.achieved_lufs,
            target
        );
        assert_eq!(record.target_lufs, target);
        assert_eq!(record.audio.format.sample_rate, SampleRate::new(48000));
    }

    // The loud file was turned down by roughly the gap between the two
    let loud_out = &normalized.normalized[1];
    assert!(loud_out.delta_db() < -15.0);
    let expected_delta = loud_out.achieved_lufs - loud_out.original_lufs;
    assert!((loud_out.delta_db() - expected_delta).abs() < 1e-12);
}

#[test]
fn test_target_is_minimum_over_collection() {
    let mut engine = engine();
    let pass = engine.measure(vec![
        record("one.wav", sine(48000, 1, 0.3, 2.0)),
        record("two.wav", quiet_with_click(48000)),
        record("three.wav", sine(48000, 2, 0.1, 2.0)),
    ]);

    let minimum = pass
        .measured
        .iter()
        .map(|r| r.measurement.peak_normalized_lufs)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(pass.target_lufs, Some(minimum));
    assert_eq!(pass.collection_minimum, Some(minimum));
}

#[test]
fn test_one_meter_per_sample_rate() {
    let mut engine = engine();
    let pass = engine.measure(vec![
        record("a.wav", sine(44100, 1, 0.2, 2.0)),
        record("b.wav", sine(48000, 2, 0.2, 2.0)),
        record("c.wav", sine(44100, 2, 0.4, 2.0)),
    ]);
    assert_eq!(pass.measured.len(), 3);
    assert_eq!(engine.meters().len(), 2);

    let target = pass.target_lufs.unwrap();
    let normalized = engine.normalize(pass.measured, target);
    let rates: Vec<u32> = normalized
        .normalized
        .iter()
        .map(|r| r.audio.format.sample_rate.as_hz())
        .collect();
    assert_eq!(rates, vec![44100, 48000, 44100]);
    for record in &normalized.normalized {
        assert!((record.achieved_lufs - target).abs() < TARGET_TOLERANCE_LU);
    }
}

#[test]
fn test_silent_record_is_reported_not_dropped() {
    let mut engine = engine();
    let silent = AudioBuffer::new(
        vec![0.0; 48000 * 2],
        AudioFormat::new(SampleRate::new(48000), 1, SampleEncoding::Int16),
    );
    let pass = engine.measure(vec![
        record("silence.wav", silent),
        record("tone.wav", sine(48000, 1, 0.2, 2.0)),
    ]);

    assert_eq!(pass.measured.len(), 1);
    assert_eq!(pass.failures.len(), 1);
    assert_eq!(pass.failures[0].relative, PathBuf::from("silence.wav"));
    assert!(matches!(pass.failures[0].error, LoudnessError::SilentAudio));
    // The failure does not poison the target
    assert_eq!(
        pass.target_lufs,
        Some(pass.measured[0].measurement.peak_normalized_lufs)
    );
}

#[test]
fn test_sentinel_floor_matches_true_minimum_for_real_audio() {
    let records = || {
        vec![
            record("quiet.wav", quiet_with_click(48000)),
            record("loud.wav", sine(48000, 1, 0.5, 2.0)),
        ]
    };

    let mut sentinel = LoudnessEngine::new(EngineSettings {
        target_policy: TargetPolicy::SentinelFloor,
        ..EngineSettings::default()
    })
    .unwrap();
    let mut minimum = engine();

    // Peak-normalized audio is always below 0 LUFS, so both policies agree
    let a = sentinel.measure(records()).target_lufs.unwrap();
    let b = minimum.measure(records()).target_lufs.unwrap();
    assert!(a < 0.0);
    assert!((a - b).abs() < 1e-9);
}

#[test]
fn test_target_override() {
    let mut engine = LoudnessEngine::new(EngineSettings {
        target_override_lufs: Some(-23.0),
        ..EngineSettings::default()
    })
    .unwrap();
    let pass = engine.measure(vec![record("tone.wav", sine(48000, 1, 0.5, 2.0))]);

    assert_eq!(pass.target_lufs, Some(-23.0));
    assert!(pass.collection_minimum.unwrap() > -23.0);

    let normalized = engine.normalize(pass.measured, -23.0);
    assert!((normalized.normalized[0].achieved_lufs - (-23.0)).abs() < TARGET_TOLERANCE_LU);
}

#[test]
fn test_ceiling_only_affects_ranking() {
    let tone = || vec![record("tone.wav", sine(48000, 1, 0.25, 2.0))];

    let mut at_minus_one = engine();
    let mut at_minus_six = LoudnessEngine::new(EngineSettings {
        peak_ceiling_dbtp: -6.0,
        ..EngineSettings::default()
    })
    .unwrap();

    let a = at_minus_one.measure(tone());
    let b = at_minus_six.measure(tone());

    let a_m = a.measured[0].measurement;
    let b_m = b.measured[0].measurement;
    assert!((a_m.original_lufs - b_m.original_lufs).abs() < 1e-9);
    assert!((a_m.peak_normalized_lufs - b_m.peak_normalized_lufs - 5.0).abs() < 0.05);
}

// ========== Property-Based Tests ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Peak-normalized loudness does not depend on the input level
    #[test]
    fn peak_normalized_loudness_is_level_independent(
        amplitude in 0.02_f32..0.95_f32,
    ) {
        let mut engine = engine();
        let reference = engine
            .measure_record(&record("ref.wav", sine(48000, 1, 0.5, 1.0)))
            .unwrap();
        let scaled = engine
            .measure_record(&record("x.wav", sine(48000, 1, amplitude, 1.0)))
            .unwrap();

        prop_assert!(
            (reference.peak_normalized_lufs - scaled.peak_normalized_lufs).abs() < 0.1,
            "reference {:.3}, amplitude {} gives {:.3}",
            reference.peak_normalized_lufs,
            amplitude,
            scaled.peak_normalized_lufs
        );
    }

    /// Normalization lands on any reasonable target
    #[test]
    fn normalization_reaches_target(
        amplitude in 0.05_f32..0.9_f32,
        target in -40.0_f64..-10.0_f64,
    ) {
        let mut engine = engine();
        let pass = engine.measure(vec![record("x.wav", sine(48000, 1, amplitude, 1.0))]);
        let normalized = engine.normalize(pass.measured, target);

        prop_assert_eq!(normalized.normalized.len(), 1);
        let achieved = normalized.normalized[0].achieved_lufs;
        prop_assert!((achieved - target).abs() < TARGET_TOLERANCE_LU);
    }
}
