use crate::beat::BeatRecord;
use crate::error::{ExploreError, ExploreResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Immutable collection of beats grouped by recording id.
///
/// Each recording's beats are stored sorted ascending by `time_sec`, whatever
/// order they arrived in. Nothing hands out mutable access after construction.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    recordings: BTreeMap<String, Vec<BeatRecord>>,
    codes: Vec<String>,
}

/// Share of one annotation code across the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCount {
    pub code: String,
    pub count: usize,
    /// Fraction of all beats, `0.0..=1.0`
    pub fraction: f64,
}

impl Dataset {
    /// Group a flat list of beats by their `recording_id`.
    pub fn from_records(records: Vec<BeatRecord>) -> Self {
        let mut groups: BTreeMap<String, Vec<BeatRecord>> = BTreeMap::new();
        for beat in records {
            groups
                .entry(beat.recording_id.clone())
                .or_default()
                .push(beat);
        }
        Self::from_groups(groups)
    }

    /// Build from pre-grouped beats. Recordings may be empty.
    pub fn from_groups<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<BeatRecord>)>,
    {
        let mut recordings = BTreeMap::new();
        let mut codes = BTreeSet::new();
        for (id, beats) in groups {
            for beat in &beats {
                codes.insert(beat.annotation_code.clone());
            }
            recordings
                .entry(id)
                .or_insert_with(Vec::new)
                .extend(beats);
        }
        for beats in recordings.values_mut() {
            // stable: equal timestamps keep arrival order
            beats.sort_by(|a, b| a.time_sec.total_cmp(&b.time_sec));
        }
        Self {
            recordings,
            codes: codes.into_iter().collect(),
        }
    }

    /// Distinct recording ids, lexicographically sorted.
    pub fn recording_ids(&self) -> Vec<String> {
        self.recordings.keys().cloned().collect()
    }

    /// Distinct annotation codes across every recording, sorted.
    pub fn annotation_codes(&self) -> &[String] {
        &self.codes
    }

    /// Beats of one recording, ascending by `time_sec`.
    pub fn beats_for(&self, recording_id: &str) -> ExploreResult<&[BeatRecord]> {
        self.recordings
            .get(recording_id)
            .map(Vec::as_slice)
            .ok_or_else(|| ExploreError::NotFound(recording_id.to_string()))
    }

    pub fn contains(&self, recording_id: &str) -> bool {
        self.recordings.contains_key(recording_id)
    }

    pub fn first_recording_id(&self) -> Option<&str> {
        self.recordings.keys().next().map(String::as_str)
    }

    pub fn recording_count(&self) -> usize {
        self.recordings.len()
    }

    /// Every beat, recording by recording.
    pub fn beats(&self) -> impl Iterator<Item = &BeatRecord> {
        self.recordings.values().flatten()
    }

    pub fn beat_count(&self) -> usize {
        self.recordings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    /// Per-code counts over all recordings, most common first; ties by code.
    pub fn code_counts(&self) -> Vec<CodeCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for beat in self.beats() {
            *counts.entry(beat.annotation_code.as_str()).or_default() += 1;
        }
        let total = self.beat_count();
        let mut out: Vec<CodeCount> = counts
            .into_iter()
            .map(|(code, count)| CodeCount {
                code: code.to_string(),
                count,
                fraction: if total > 0 {
                    count as f64 / total as f64
                } else {
                    0.0
                },
            })
            .collect();
        out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.code.cmp(&b.code)));
        out
    }
}
