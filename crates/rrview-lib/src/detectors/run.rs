use crate::beat::{BeatRecord, NarrativeEvent};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RUN_LENGTH: usize = 3;
pub const DEFAULT_NOTABLE_CODE: &str = "V";
pub const DEFAULT_RUN_LABEL: &str = "Run of ventricular ectopy";

/// Parameters for consecutive-run detection over a detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDetectorConfig {
    /// Number of consecutive notable beats that make a run.
    pub run_length_threshold: usize,
    /// Annotation code the run must consist of.
    pub notable_code: String,
    /// Text attached to the emitted narrative event.
    pub label: String,
}

impl Default for RunDetectorConfig {
    fn default() -> Self {
        Self {
            run_length_threshold: DEFAULT_RUN_LENGTH,
            notable_code: DEFAULT_NOTABLE_CODE.into(),
            label: DEFAULT_RUN_LABEL.into(),
        }
    }
}

/// Find the earliest window of `run_length_threshold` consecutive beats that
/// all carry the notable code and anchor an event at its first beat.
///
/// Only the first qualifying run is reported. Each window is checked on its
/// own; runs are short enough that a rolling counter buys nothing.
pub fn detect_run(beats: &[BeatRecord], cfg: &RunDetectorConfig) -> Option<NarrativeEvent> {
    let len = cfg.run_length_threshold.max(1);
    beats
        .windows(len)
        .find(|window| window.iter().all(|b| b.has_code(&cfg.notable_code)))
        .map(|window| NarrativeEvent {
            time_sec: window[0].time_sec,
            label: cfg.label.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beats(codes: &[&str]) -> Vec<BeatRecord> {
        codes
            .iter()
            .enumerate()
            .map(|(i, code)| BeatRecord::new(i as f64 * 0.8, 800.0, *code, "100"))
            .collect()
    }

    #[test]
    fn run_in_middle_is_anchored_at_first_beat() {
        let seq = beats(&["N", "N", "V", "V", "V", "N"]);
        let event = detect_run(&seq, &RunDetectorConfig::default()).expect("run present");
        assert_eq!(event.time_sec, seq[2].time_sec);
        assert_eq!(event.label, "Run of ventricular ectopy");
    }

    #[test]
    fn broken_runs_do_not_qualify() {
        let seq = beats(&["V", "V", "N", "V", "V"]);
        assert_eq!(detect_run(&seq, &RunDetectorConfig::default()), None);
    }

    #[test]
    fn only_first_run_is_reported() {
        let seq = beats(&["V", "V", "V", "N", "V", "V", "V", "V"]);
        let event = detect_run(&seq, &RunDetectorConfig::default()).expect("run present");
        assert_eq!(event.time_sec, 0.0);
    }

    #[test]
    fn short_sequences_produce_nothing() {
        let cfg = RunDetectorConfig::default();
        assert_eq!(detect_run(&beats(&["V", "V"]), &cfg), None);
        assert_eq!(detect_run(&[], &cfg), None);
    }

    #[test]
    fn threshold_and_code_are_configurable() {
        let cfg = RunDetectorConfig {
            run_length_threshold: 2,
            notable_code: "A".into(),
            label: "Atrial couplet".into(),
        };
        let seq = beats(&["N", "A", "V", "A", "A"]);
        let event = detect_run(&seq, &cfg).expect("couplet present");
        assert_eq!(event.time_sec, seq[3].time_sec);
        assert_eq!(event.label, "Atrial couplet");
    }

    #[test]
    fn zero_threshold_behaves_as_single_beat() {
        let cfg = RunDetectorConfig {
            run_length_threshold: 0,
            ..RunDetectorConfig::default()
        };
        let seq = beats(&["N", "V"]);
        assert_eq!(
            detect_run(&seq, &cfg).map(|e| e.time_sec),
            Some(seq[1].time_sec)
        );
    }
}
