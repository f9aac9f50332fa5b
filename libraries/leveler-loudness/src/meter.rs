//! Per-sample-rate loudness meters
//!
//! A meter is bound to one sample rate and reused for every buffer at that
//! rate. The registry creates meters lazily, at most one per rate.

use crate::analyzer::{LoudnessAnalyzer, LoudnessInfo};
use crate::error::{LoudnessError, Result};
use leveler_core::{AudioBuffer, SampleRate};
use std::collections::BTreeMap;

/// Loudness meter bound to a single sample rate
#[derive(Debug)]
pub struct Meter {
    analyzer: LoudnessAnalyzer,
    measurements: usize,
}

impl Meter {
    /// Create a meter for `sample_rate`, initially configured for `channels`
    pub fn new(sample_rate: SampleRate, channels: u16) -> Result<Self> {
        Ok(Self {
            analyzer: LoudnessAnalyzer::new(sample_rate.as_hz(), u32::from(channels))?,
            measurements: 0,
        })
    }

    /// Sample rate this meter measures
    pub fn sample_rate(&self) -> SampleRate {
        SampleRate::new(self.analyzer.sample_rate())
    }

    /// Number of buffers measured so far
    pub fn measurements(&self) -> usize {
        self.measurements
    }

    /// Measure a whole buffer
    ///
    /// State from earlier buffers is discarded first, so every call behaves
    /// like a fresh meter.
    pub fn measure(&mut self, buffer: &AudioBuffer) -> Result<LoudnessInfo> {
        let rate = buffer.format.sample_rate;
        if rate != self.sample_rate() {
            return Err(LoudnessError::SampleRateMismatch {
                meter: self.sample_rate().as_hz(),
                buffer: rate.as_hz(),
            });
        }

        self.analyzer.set_channels(u32::from(buffer.format.channels))?;
        self.analyzer.add_frames(&buffer.samples)?;
        self.measurements += 1;
        self.analyzer.summary()
    }
}

/// Lazily-populated map from sample rate to meter
#[derive(Debug, Default)]
pub struct MeterRegistry {
    meters: BTreeMap<SampleRate, Meter>,
}

impl MeterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the meter for `buffer`'s sample rate, creating it on first use
    pub fn meter_for(&mut self, buffer: &AudioBuffer) -> Result<&mut Meter> {
        let rate = buffer.format.sample_rate;
        if !self.meters.contains_key(&rate) {
            tracing::debug!("Creating loudness meter for {}", rate);
            let meter = Meter::new(rate, buffer.format.channels)?;
            self.meters.insert(rate, meter);
        }
        self.meters
            .get_mut(&rate)
            .ok_or_else(|| LoudnessError::AnalysisError(format!("no meter for {rate}")))
    }

    /// Measure `buffer` with the meter for its sample rate
    pub fn measure(&mut self, buffer: &AudioBuffer) -> Result<LoudnessInfo> {
        self.meter_for(buffer)?.measure(buffer)
    }

    /// Number of distinct sample rates seen
    pub fn len(&self) -> usize {
        self.meters.len()
    }

    /// Whether no meter has been created yet
    pub fn is_empty(&self) -> bool {
        self.meters.is_empty()
    }

    /// Sample rates with a meter, in ascending order
    pub fn rates(&self) -> impl Iterator<Item = SampleRate> + '_ {
        self.meters.keys().copied()
    }

    /// Meter for a rate, if one exists
    pub fn get(&self, rate: SampleRate) -> Option<&Meter> {
        self.meters.get(&rate)
    }
}
