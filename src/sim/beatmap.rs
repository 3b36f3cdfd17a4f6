//! Beatmap generation
//!
//! A beatmap is the list of spawn timestamps for one pass through the track.
//! It is derived purely from tempo, so the same inputs always give the same
//! chart.

use serde::{Deserialize, Serialize};

/// Upper bound on whole beats per pass; absurd tempos are truncated here
pub const MAX_BEATS: u64 = 100_000;

/// Ordered, strictly increasing spawn timestamps (seconds from round start)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Beatmap {
    times: Vec<f64>,
}

impl Beatmap {
    /// Spawn on every even beat (2, 4, 6, ... up to the last whole beat).
    ///
    /// Non-positive or non-finite tempo/duration gives an empty beatmap.
    pub fn generate(bpm: f64, lead_in_secs: f64, duration_secs: f64) -> Self {
        if !(bpm > 0.0 && bpm.is_finite() && duration_secs > 0.0 && duration_secs.is_finite()) {
            log::warn!(
                "Empty beatmap: bpm={} duration={}s must both be positive",
                bpm,
                duration_secs
            );
            return Self::default();
        }

        let beat_interval = 60.0 / bpm;
        let mut total_beats = (duration_secs / beat_interval).floor() as u64;
        if total_beats > MAX_BEATS {
            log::warn!("{} beats at {} BPM, truncating to {}", total_beats, bpm, MAX_BEATS);
            total_beats = MAX_BEATS;
        }
        let lead_in = lead_in_secs.max(0.0);

        let times = (2..=total_beats)
            .step_by(2)
            .map(|beat| lead_in + beat as f64 * beat_interval)
            .collect();

        Self { times }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.times.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.times
    }
}
