use crate::dataset::Dataset;
use crate::error::{ExploreError, ExploreResult};
use serde::Serialize;
use std::collections::BTreeSet;

/// Validated brush window. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeWindow {
    start: f64,
    end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> ExploreResult<Self> {
        if start.is_nan() || end.is_nan() || start > end {
            return Err(ExploreError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Intersection with a recording's `(min, max)` extent; `None` when disjoint.
    pub fn clip_to(&self, extent: (f64, f64)) -> Option<(f64, f64)> {
        let lo = self.start.max(extent.0);
        let hi = self.end.min(extent.1);
        (lo <= hi).then_some((lo, hi))
    }
}

/// The analyst's current selection: one recording, an optional window, and
/// the annotation codes that are toggled on.
///
/// Every mutator validates before it writes, so a rejected call leaves the
/// previous selection untouched.
#[derive(Debug, Clone)]
pub struct SelectionState {
    recording_id: String,
    window: Option<TimeWindow>,
    active_codes: BTreeSet<String>,
}

/// Owned copy of a [`SelectionState`] handed to derivation and rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionSnapshot {
    pub recording_id: String,
    pub window: Option<TimeWindow>,
    pub active_codes: BTreeSet<String>,
}

impl SelectionSnapshot {
    pub fn window_start(&self) -> Option<f64> {
        self.window.map(|w| w.start())
    }

    pub fn window_end(&self) -> Option<f64> {
        self.window.map(|w| w.end())
    }

    pub fn is_code_active(&self, code: &str) -> bool {
        self.active_codes.contains(code)
    }
}

impl SelectionState {
    /// Defaults: first recording in sorted order, full extent, every code on.
    pub fn new(dataset: &Dataset) -> ExploreResult<Self> {
        let recording_id = dataset
            .first_recording_id()
            .ok_or(ExploreError::EmptyDataset)?
            .to_string();
        Ok(Self {
            recording_id,
            window: None,
            active_codes: dataset.annotation_codes().iter().cloned().collect(),
        })
    }

    pub fn recording_id(&self) -> &str {
        &self.recording_id
    }

    pub fn window(&self) -> Option<TimeWindow> {
        self.window
    }

    /// Switch recording. The window goes back to full extent; codes stay.
    pub fn set_recording(&mut self, dataset: &Dataset, recording_id: &str) -> ExploreResult<()> {
        if !dataset.contains(recording_id) {
            return Err(ExploreError::NotFound(recording_id.to_string()));
        }
        self.recording_id = recording_id.to_string();
        self.window = None;
        Ok(())
    }

    /// Set the brush window. Bounds outside the recording are kept as given;
    /// clipping happens when the detail subset is derived.
    pub fn set_window(&mut self, start: f64, end: f64) -> ExploreResult<()> {
        self.window = Some(TimeWindow::new(start, end)?);
        Ok(())
    }

    pub fn clear_window(&mut self) {
        self.window = None;
    }

    /// Flip one code on or off. Returns whether it is now active.
    pub fn toggle_code(&mut self, code: &str) -> bool {
        if self.active_codes.remove(code) {
            false
        } else {
            self.active_codes.insert(code.to_string());
            true
        }
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            recording_id: self.recording_id.clone(),
            window: self.window,
            active_codes: self.active_codes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beat::BeatRecord;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            BeatRecord::new(0.0, 800.0, "N", "101"),
            BeatRecord::new(1.0, 780.0, "V", "101"),
            BeatRecord::new(0.0, 820.0, "N", "100"),
            BeatRecord::new(1.0, 640.0, "/", "100"),
        ])
    }

    #[test]
    fn defaults_come_from_dataset() {
        let ds = dataset();
        let state = SelectionState::new(&ds).expect("non-empty dataset");
        let snap = state.snapshot();
        assert_eq!(snap.recording_id, "100");
        assert_eq!(snap.window, None);
        let codes: Vec<&str> = snap.active_codes.iter().map(String::as_str).collect();
        assert_eq!(codes, vec!["/", "N", "V"]);
    }

    #[test]
    fn empty_dataset_has_no_selection() {
        let ds = Dataset::default();
        assert_eq!(
            SelectionState::new(&ds).err(),
            Some(ExploreError::EmptyDataset)
        );
    }

    #[test]
    fn switching_recording_resets_window() {
        let ds = dataset();
        let mut state = SelectionState::new(&ds).expect("state");
        state.set_window(10.0, 20.0).expect("valid window");
        state.toggle_code("N");
        state.set_recording(&ds, "101").expect("known id");
        let snap = state.snapshot();
        assert_eq!(snap.recording_id, "101");
        assert_eq!(snap.window_start(), None);
        assert_eq!(snap.window_end(), None);
        assert!(!snap.is_code_active("N"));
    }

    #[test]
    fn unknown_recording_keeps_previous_state() {
        let ds = dataset();
        let mut state = SelectionState::new(&ds).expect("state");
        state.set_window(0.5, 0.7).expect("valid window");
        let before = state.snapshot();
        let err = state.set_recording(&ds, "999").unwrap_err();
        assert_eq!(err, ExploreError::NotFound("999".into()));
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn inverted_window_is_rejected_without_change() {
        let ds = dataset();
        let mut state = SelectionState::new(&ds).expect("state");
        state.set_window(1.0, 2.0).expect("valid window");
        let err = state.set_window(5.0, 4.0).unwrap_err();
        assert_eq!(err, ExploreError::InvalidRange { start: 5.0, end: 4.0 });
        assert_eq!(state.window(), Some(TimeWindow::new(1.0, 2.0).unwrap()));
        assert!(state.set_window(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn window_outside_extent_is_accepted() {
        let ds = dataset();
        let mut state = SelectionState::new(&ds).expect("state");
        state.set_window(-5.0, 1e6).expect("accepted as-is");
        assert_eq!(state.snapshot().window_start(), Some(-5.0));
        state.set_window(3.0, 3.0).expect("zero-width window");
    }

    #[test]
    fn toggle_flips_membership_for_any_string() {
        let ds = dataset();
        let mut state = SelectionState::new(&ds).expect("state");
        assert!(!state.toggle_code("V"));
        assert!(state.toggle_code("V"));
        assert!(state.toggle_code("not-a-code"));
        assert!(state.snapshot().is_code_active("not-a-code"));
    }

    #[test]
    fn snapshot_is_detached_from_live_state() {
        let ds = dataset();
        let mut state = SelectionState::new(&ds).expect("state");
        let snap = state.snapshot();
        state.toggle_code("N");
        assert!(snap.is_code_active("N"));
        assert!(!state.snapshot().is_code_active("N"));
    }

    #[test]
    fn clip_handles_disjoint_window() {
        let w = TimeWindow::new(10.0, 20.0).unwrap();
        assert_eq!(w.clip_to((0.0, 15.0)), Some((10.0, 15.0)));
        assert_eq!(w.clip_to((0.0, 5.0)), None);
    }
}
