use crate::beat::BeatRecord;
use crate::vocabulary::{is_beat_symbol, symbol_for_code};
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Simple WFDB annotation entry.
#[derive(Debug, Clone)]
pub struct WfdbAnnotation {
    pub sample: usize,
    pub code: u8,
}

impl WfdbAnnotation {
    pub fn symbol(&self) -> Option<&'static str> {
        symbol_for_code(self.code)
    }
}

/// Parse MIT annotation binary stream into samples & codes.
pub fn parse_wfdb_annotations(buf: &[u8]) -> Vec<WfdbAnnotation> {
    let mut out = Vec::new();
    let mut idx = 0;
    let mut sample: usize = 0;
    while idx + 2 <= buf.len() {
        let word = u16::from_le_bytes([buf[idx], buf[idx + 1]]);
        idx += 2;
        let code = (word >> 10) as u8;
        let diff = (word & 0x03FF) as usize;
        if code == 0 && diff == 0 {
            break;
        }
        match code {
            59 => {
                if idx + 4 > buf.len() {
                    break;
                }
                let high = u16::from_le_bytes([buf[idx], buf[idx + 1]]) as u32;
                let low = u16::from_le_bytes([buf[idx + 2], buf[idx + 3]]) as u32;
                idx += 4;
                let skip = (high << 16) | low;
                sample = sample.wrapping_add(skip as usize);
            }
            60..=62 => {
                // NUM/SUB/CHN: payload unused
                sample = sample.wrapping_add(diff);
            }
            63 => {
                idx += diff;
                if diff % 2 != 0 && idx < buf.len() {
                    idx += 1;
                }
            }
            _ => {
                sample = sample.wrapping_add(diff);
                out.push(WfdbAnnotation { sample, code });
            }
        }
    }
    out
}

/// Which annotations become beats when importing.
#[derive(Debug, Clone, Copy, Default)]
pub struct WfdbImportOptions {
    /// Drop rhythm, quality and waveform markers before computing intervals.
    pub beats_only: bool,
}

/// Turn an annotation stream into RR beats.
///
/// Beat *i* (for i >= 1) sits at `sample_i / fs` seconds, carries the interval
/// since annotation *i-1* in milliseconds, and takes annotation *i*'s symbol.
/// The first annotation only anchors the first interval. Annotations sharing a
/// sample with their predecessor give no beat.
pub fn beats_from_annotations(
    annotations: &[WfdbAnnotation],
    fs: f64,
    recording_id: &str,
    options: WfdbImportOptions,
) -> Result<Vec<BeatRecord>> {
    if !(fs.is_finite() && fs > 0.0) {
        anyhow::bail!("sampling frequency must be positive, got {}", fs);
    }
    let kept: Vec<(usize, &'static str)> = annotations
        .iter()
        .filter_map(|ann| ann.symbol().map(|symbol| (ann.sample, symbol)))
        .filter(|(_, symbol)| !options.beats_only || is_beat_symbol(symbol))
        .collect();
    let beats: Vec<BeatRecord> = kept
        .windows(2)
        .filter(|w| w[1].0 > w[0].0)
        .map(|w| {
            let t0 = w[0].0 as f64 / fs;
            let t1 = w[1].0 as f64 / fs;
            BeatRecord::new(t1, (t1 - t0) * 1000.0, w[1].1, recording_id)
        })
        .collect();
    if beats.len() + 1 < kept.len() {
        debug!(
            "{}: dropped {} zero-length intervals",
            recording_id,
            kept.len() - 1 - beats.len()
        );
    }
    Ok(beats)
}

/// Sampling frequency declared in a WFDB header.
pub fn read_header_fs(header_path: &Path) -> Result<f64> {
    let (header, _signals) = wfdb_rust::parse_wfdb(header_path);
    header
        .record
        .sampling_frequency
        .map(|f| f as f64)
        .with_context(|| format!("{} declares no sampling frequency", header_path.display()))
}

fn read_exact(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Read an annotation file (ATR) and convert it to beats of one recording.
pub fn load_wfdb_beats(
    atr_path: &Path,
    fs: f64,
    recording_id: &str,
    options: WfdbImportOptions,
) -> Result<Vec<BeatRecord>> {
    let buf = read_exact(atr_path)?;
    beats_from_annotations(&parse_wfdb_annotations(&buf), fs, recording_id, options)
        .with_context(|| format!("converting {}", atr_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(code: u16, diff: u16) -> [u8; 2] {
        ((code << 10) | diff).to_le_bytes()
    }

    #[test]
    fn parses_simple_annotation_stream() {
        let mut bytes = vec![];
        // code 1, diff=5 -> sample=5
        bytes.extend(&word(1, 5));
        // code 2, diff=10 -> sample=15
        bytes.extend(&word(2, 10));
        // SKIP 5000 samples
        bytes.extend(&(59u16 << 10).to_le_bytes());
        bytes.extend(&0x0000u16.to_le_bytes());
        bytes.extend(&0x1388u16.to_le_bytes());
        bytes.extend(&0u16.to_le_bytes());

        let annotations = parse_wfdb_annotations(&bytes);
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].sample, 5);
        assert_eq!(annotations[1].sample, 15);
        assert_eq!(annotations[1].symbol(), Some("L"));
    }

    #[test]
    fn intervals_take_the_later_symbol() {
        let anns = vec![
            WfdbAnnotation { sample: 360, code: 1 },
            WfdbAnnotation { sample: 720, code: 5 },
            WfdbAnnotation { sample: 900, code: 28 },
            WfdbAnnotation { sample: 1080, code: 1 },
        ];
        let beats = beats_from_annotations(&anns, 360.0, "100", WfdbImportOptions::default())
            .expect("valid fs");
        assert_eq!(beats.len(), 3);
        assert_eq!(beats[0].time_sec, 2.0);
        assert!((beats[0].interval_ms - 1000.0).abs() < 1e-9);
        assert_eq!(beats[0].annotation_code, "V");
        assert_eq!(beats[1].annotation_code, "+");
        assert!(beats.iter().all(|b| b.recording_id == "100"));
    }

    #[test]
    fn beats_only_skips_rhythm_markers() {
        let anns = vec![
            WfdbAnnotation { sample: 0, code: 28 },
            WfdbAnnotation { sample: 360, code: 1 },
            WfdbAnnotation { sample: 540, code: 28 },
            WfdbAnnotation { sample: 720, code: 1 },
        ];
        let beats =
            beats_from_annotations(&anns, 360.0, "100", WfdbImportOptions { beats_only: true })
                .unwrap();
        assert_eq!(beats.len(), 1);
        assert!((beats[0].interval_ms - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_annotations_give_no_zero_interval() {
        let anns = vec![
            WfdbAnnotation { sample: 360, code: 1 },
            WfdbAnnotation { sample: 720, code: 1 },
            WfdbAnnotation { sample: 720, code: 28 },
            WfdbAnnotation { sample: 1080, code: 5 },
        ];
        let beats = beats_from_annotations(&anns, 360.0, "100", WfdbImportOptions::default())
            .unwrap();
        let codes: Vec<&str> = beats.iter().map(|b| b.annotation_code.as_str()).collect();
        assert_eq!(codes, vec!["N", "V"]);
        assert!(beats.iter().all(|b| b.interval_ms > 0.0));
    }

    #[test]
    fn rejects_non_positive_fs() {
        assert!(beats_from_annotations(&[], 0.0, "100", WfdbImportOptions::default()).is_err());
    }
}
