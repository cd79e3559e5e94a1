use serde::{Deserialize, Serialize};

/// One detected heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatRecord {
    /// Offset of the beat within its recording (seconds)
    pub time_sec: f64,
    /// RR interval ending at this beat (milliseconds)
    pub interval_ms: f64,
    /// Beat classification symbol, e.g. `N` or `V`
    pub annotation_code: String,
    pub recording_id: String,
}

impl BeatRecord {
    pub fn new(
        time_sec: f64,
        interval_ms: f64,
        annotation_code: impl Into<String>,
        recording_id: impl Into<String>,
    ) -> Self {
        Self {
            time_sec,
            interval_ms,
            annotation_code: annotation_code.into(),
            recording_id: recording_id.into(),
        }
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.annotation_code == code
    }
}

/// Automatically detected run of notable beats, anchored at its first beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeEvent {
    pub time_sec: f64,
    pub label: String,
}

/// Inclusive `(min, max)` of `time_sec` over an ordered beat sequence.
pub fn time_extent(beats: &[BeatRecord]) -> Option<(f64, f64)> {
    match (beats.first(), beats.last()) {
        (Some(first), Some(last)) => Some((first.time_sec, last.time_sec)),
        _ => None,
    }
}

/// Inclusive `(min, max)` of `interval_ms`, ignoring order.
pub fn interval_extent(beats: &[BeatRecord]) -> Option<(f64, f64)> {
    if beats.is_empty() {
        return None;
    }
    let min = beats
        .iter()
        .map(|b| b.interval_ms)
        .fold(f64::INFINITY, f64::min);
    let max = beats
        .iter()
        .map(|b| b.interval_ms)
        .fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}
