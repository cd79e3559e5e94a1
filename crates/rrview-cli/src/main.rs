mod svg;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use log::{debug, warn};
use rrview_lib::{
    beat::{time_extent, NarrativeEvent},
    config::{load_config, ExplorerConfig},
    coordinator::{Interaction, ViewCoordinator},
    dataset::CodeCount,
    io::{
        csv::{load_dataset, write_beats_file},
        wfdb::{load_wfdb_beats, read_header_fs, WfdbImportOptions},
    },
    plot::{
        histogram::DEFAULT_BINS, histogram_figure, palette::CATEGORY10, rr_histogram, Color,
        FigureRenderer, Palette, PlotBackend,
    },
    vocabulary::label_for,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use svg::SvgFigureBackend;

#[derive(Parser)]
#[command(
    name = "rrview",
    version,
    about = "rrview: overview/detail exploration of annotated RR interval recordings"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recordings and annotation codes in an RR table
    Records {
        #[arg(long)]
        input: PathBuf,
    },
    /// Count beats per annotation code, most common first
    Counts {
        #[arg(long)]
        input: PathBuf,
    },
    /// Replay a selection (record, window, hidden codes) and report the derived views
    Explore {
        #[arg(long)]
        input: PathBuf,
        /// TOML file with detector/heatmap settings
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        record: Option<String>,
        #[arg(long, num_args = 2, value_names = ["T0", "T1"], allow_negative_numbers = true)]
        window: Option<Vec<f64>>,
        /// Annotation code to hide (repeatable)
        #[arg(long = "hide")]
        hide: Vec<String>,
        #[arg(long)]
        threshold: Option<usize>,
        #[arg(long)]
        notable_code: Option<String>,
        /// Write overview/heatmap/detail SVGs here
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// RR interval histogram, over all beats or one annotation code
    Histogram {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        code: Option<String>,
        #[arg(long, default_value_t = DEFAULT_BINS)]
        bins: usize,
        /// Write the histogram as SVG
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Convert a WFDB annotation file into the RR table format
    ImportWfdb {
        #[arg(long)]
        atr: PathBuf,
        /// Header to read the sampling frequency from
        #[arg(long)]
        header: Option<PathBuf>,
        /// Sampling frequency (Hz), used when no header is given
        #[arg(long)]
        fs: Option<f64>,
        #[arg(long)]
        record_id: String,
        #[arg(long)]
        out: PathBuf,
        /// Keep only beat annotations
        #[arg(long, default_value_t = false)]
        beats_only: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Records { input } => cmd_records(&input)?,
        Commands::Counts { input } => cmd_counts(&input)?,
        Commands::Explore {
            input,
            config,
            record,
            window,
            hide,
            threshold,
            notable_code,
            out_dir,
        } => {
            let mut cfg = match config {
                Some(path) => load_config(&path)?,
                None => ExplorerConfig::default(),
            };
            if let Some(threshold) = threshold {
                cfg.run_length_threshold = threshold;
            }
            if let Some(code) = notable_code {
                cfg.notable_code = code;
            }
            cfg.validate()?;
            let window = window.map(|w| (w[0], w[1]));
            cmd_explore(&input, &cfg, record, window, &hide, out_dir.as_deref())?
        }
        Commands::Histogram {
            input,
            code,
            bins,
            out,
        } => cmd_histogram(&input, code.as_deref(), bins, out.as_deref())?,
        Commands::ImportWfdb {
            atr,
            header,
            fs,
            record_id,
            out,
            beats_only,
        } => cmd_import_wfdb(&atr, header.as_deref(), fs, &record_id, &out, beats_only)?,
    }
    Ok(())
}

#[derive(Serialize)]
struct RecordingSummary {
    id: String,
    beats: usize,
    start_sec: Option<f64>,
    end_sec: Option<f64>,
}

#[derive(Serialize)]
struct CodeSummary {
    code: String,
    label: Option<&'static str>,
    color: String,
}

#[derive(Serialize)]
struct RecordsOutput {
    recordings: Vec<RecordingSummary>,
    codes: Vec<CodeSummary>,
}

fn cmd_records(input: &Path) -> Result<()> {
    let dataset = load_dataset(input)?;
    let mut recordings = Vec::new();
    for id in dataset.recording_ids() {
        let beats = dataset.beats_for(&id)?;
        let extent = time_extent(beats);
        recordings.push(RecordingSummary {
            beats: beats.len(),
            start_sec: extent.map(|e| e.0),
            end_sec: extent.map(|e| e.1),
            id,
        });
    }
    let codes = Palette::new(dataset.annotation_codes())
        .legend()
        .into_iter()
        .map(|(code, color)| CodeSummary {
            label: label_for(&code),
            code,
            color: color.hex(),
        })
        .collect();
    let out = RecordsOutput { recordings, codes };
    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}

#[derive(Serialize)]
struct CountsOutput {
    total: usize,
    counts: Vec<LabelledCount>,
}

#[derive(Serialize)]
struct LabelledCount {
    #[serde(flatten)]
    count: CodeCount,
    label: Option<&'static str>,
}

fn cmd_counts(input: &Path) -> Result<()> {
    let dataset = load_dataset(input)?;
    let counts = dataset
        .code_counts()
        .into_iter()
        .map(|count| LabelledCount {
            label: label_for(&count.code),
            count,
        })
        .collect();
    let out = CountsOutput {
        total: dataset.beat_count(),
        counts,
    };
    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}

#[derive(Serialize)]
struct ExploreOutput {
    recording_id: String,
    window_start: Option<f64>,
    window_end: Option<f64>,
    active_codes: Vec<String>,
    overview_len: usize,
    detail_start: Option<f64>,
    detail_end: Option<f64>,
    detail_len: usize,
    event: Option<NarrativeEvent>,
    rejected: Vec<String>,
}

fn cmd_explore(
    input: &Path,
    cfg: &ExplorerConfig,
    record: Option<String>,
    window: Option<(f64, f64)>,
    hide: &[String],
    out_dir: Option<&Path>,
) -> Result<()> {
    let dataset = load_dataset(input)?;
    let renderer = FigureRenderer::new(cfg.max_overview_points);
    let mut coordinator = ViewCoordinator::new(dataset, cfg, renderer)?;

    let mut interactions = Vec::new();
    if let Some(id) = record {
        interactions.push(Interaction::RecordingChanged(id));
    }
    if let Some((t0, t1)) = window {
        interactions.push(Interaction::WindowChanged(t0, t1));
    }

    let mut rejected = Vec::new();
    for interaction in interactions {
        if let Err(err) = coordinator.handle(interaction) {
            rejected.push(err.to_string());
        }
    }
    // --hide never re-shows a code; repeats and codes outside the dataset are skipped
    for code in hide {
        if coordinator.selection().is_code_active(code) {
            coordinator.handle(Interaction::CodeToggled(code.clone()))?;
        } else {
            debug!("--hide {}: already hidden or not in the dataset", code);
        }
    }

    let views = coordinator
        .current()
        .ok_or_else(|| anyhow!("no views were derived"))?;
    let out = ExploreOutput {
        recording_id: views.selection.recording_id.clone(),
        window_start: views.selection.window_start(),
        window_end: views.selection.window_end(),
        active_codes: views.selection.active_codes.iter().cloned().collect(),
        overview_len: views.overview_len,
        detail_start: views.detail_domain.map(|d| d.0),
        detail_end: views.detail_domain.map(|d| d.1),
        detail_len: views.detail.len(),
        event: views.event.clone(),
        rejected,
    };

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)?;
        let figures = coordinator.into_renderer().into_figures();
        SvgFigureBackend::new(dir.join("overview.svg"), (960, 200)).draw(&figures.overview)?;
        SvgFigureBackend::new(dir.join("heatmap.svg"), (960, 80)).draw(&figures.heatmap)?;
        SvgFigureBackend::new(dir.join("detail.svg"), (960, 400)).draw(&figures.detail)?;
    }

    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}

#[derive(Serialize)]
struct HistogramOutput {
    code: Option<String>,
    n: usize,
    edges: Vec<f64>,
    counts: Vec<usize>,
}

fn cmd_histogram(input: &Path, code: Option<&str>, bins: usize, out: Option<&Path>) -> Result<()> {
    if bins == 0 {
        bail!("--bins must be at least 1");
    }
    let dataset = load_dataset(input)?;
    let hist = match rr_histogram(&dataset, code, bins) {
        Some(hist) => hist,
        None => bail!("no beats with code {} in {}", code.unwrap_or("*"), input.display()),
    };
    if let Some(path) = out {
        let color = match code {
            Some(code) => Palette::new(dataset.annotation_codes()).color_of(code),
            None => Color(CATEGORY10[0]),
        };
        SvgFigureBackend::new(path, (800, 400)).draw(&histogram_figure(&hist, color))?;
    }
    let out = HistogramOutput {
        n: hist.total(),
        code: hist.code,
        edges: hist.edges,
        counts: hist.counts,
    };
    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}

fn cmd_import_wfdb(
    atr: &Path,
    header: Option<&Path>,
    fs: Option<f64>,
    record_id: &str,
    out: &Path,
    beats_only: bool,
) -> Result<()> {
    let fs = match (header, fs) {
        (Some(header), _) => read_header_fs(header)?,
        (None, Some(fs)) => fs,
        (None, None) => return Err(anyhow!("either --header or --fs is required")),
    };
    let beats = load_wfdb_beats(atr, fs, record_id, WfdbImportOptions { beats_only })?;
    if beats.is_empty() {
        warn!("{} produced no intervals", atr.display());
    }
    write_beats_file(out, &beats)?;
    println!(
        "{}",
        serde_json::json!({ "record_id": record_id, "fs": fs, "beats": beats.len() })
    );
    Ok(())
}
