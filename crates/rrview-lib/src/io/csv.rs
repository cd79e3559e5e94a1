use crate::beat::BeatRecord;
use crate::dataset::Dataset;
use anyhow::{Context, Result};
use ::csv::{ReaderBuilder, Trim, WriterBuilder};
use log::info;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// Column layout of the RR interval table.
#[derive(Debug, Serialize, Deserialize)]
struct BeatRow {
    time_sec: f64,
    rr_ms: f64,
    annotation: String,
    record_id: String,
}

impl From<&BeatRecord> for BeatRow {
    fn from(beat: &BeatRecord) -> Self {
        Self {
            time_sec: beat.time_sec,
            rr_ms: beat.interval_ms,
            annotation: beat.annotation_code.clone(),
            record_id: beat.recording_id.clone(),
        }
    }
}

/// Parse `time_sec,rr_ms,annotation,record_id` rows. Any malformed number,
/// non-finite value, negative time or non-positive interval aborts the load
/// with the offending line.
pub fn parse_beats_csv<R: Read>(reader: R) -> Result<Vec<BeatRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut beats = Vec::new();
    for (idx, row) in reader.deserialize::<BeatRow>().enumerate() {
        // header is line 1
        let line = idx + 2;
        let row = row.with_context(|| format!("line {} is not a valid beat row", line))?;
        if !row.time_sec.is_finite() || row.time_sec < 0.0 {
            anyhow::bail!("line {}: time_sec must be finite and non-negative", line);
        }
        if !row.rr_ms.is_finite() || row.rr_ms <= 0.0 {
            anyhow::bail!("line {}: rr_ms must be finite and positive", line);
        }
        beats.push(BeatRecord {
            time_sec: row.time_sec,
            interval_ms: row.rr_ms,
            annotation_code: row.annotation,
            recording_id: row.record_id,
        });
    }
    Ok(beats)
}

pub fn read_beats_csv(path: &Path) -> Result<Vec<BeatRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_beats_csv(file).with_context(|| format!("parsing {}", path.display()))
}

/// Load and group the RR table into a [`Dataset`].
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let beats = read_beats_csv(path)?;
    let dataset = Dataset::from_records(beats);
    info!(
        "loaded {} beats across {} recordings from {}",
        dataset.beat_count(),
        dataset.recording_count(),
        path.display()
    );
    Ok(dataset)
}

pub fn write_beats_csv<W: Write>(writer: W, beats: &[BeatRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for beat in beats {
        writer
            .serialize(BeatRow::from(beat))
            .context("writing beat row")?;
    }
    writer.flush().context("flushing beat table")?;
    Ok(())
}

pub fn write_beats_file(path: &Path, beats: &[BeatRecord]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_beats_csv(file, beats)
}
