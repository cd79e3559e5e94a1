use super::{BarSeries, Color, Figure, Series};
use crate::dataset::Dataset;
use serde::Serialize;

pub const DEFAULT_BINS: usize = 50;
const BAR_OPACITY: f32 = 0.7;

/// Equal-width histogram of RR intervals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RrHistogram {
    /// Annotation code the beats were filtered to, `None` for all beats.
    pub code: Option<String>,
    /// `counts.len() + 1` ascending bin edges in ms.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl RrHistogram {
    /// Number of beats binned.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin every beat's RR interval, optionally only beats carrying `code`.
///
/// Bins span `[min, max]` of the selected intervals; the last bin is closed.
/// When every interval is equal the range is widened by half a millisecond on
/// each side. Returns `None` for zero bins or when no beat matches.
pub fn rr_histogram(dataset: &Dataset, code: Option<&str>, bins: usize) -> Option<RrHistogram> {
    if bins == 0 {
        return None;
    }
    let intervals: Vec<f64> = dataset
        .beats()
        .filter(|b| code.map_or(true, |c| b.annotation_code == c))
        .map(|b| b.interval_ms)
        .collect();
    if intervals.is_empty() {
        return None;
    }
    let mut lo = intervals.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = intervals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in intervals {
        let idx = (((value - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let edges = (0..=bins).map(|i| lo + width * i as f64).collect();
    Some(RrHistogram {
        code: code.map(str::to_string),
        edges,
        counts,
    })
}

/// Bar figure titled with the beat type and sample size.
pub fn histogram_figure(hist: &RrHistogram, color: Color) -> Figure {
    let title = match &hist.code {
        Some(code) => format!("RR Intervals for {} Beats (n={})", code, hist.total()),
        None => format!("Distribution of RR Intervals (n={})", hist.total()),
    };
    let mut fig = Figure::new(title).with_axes("RR interval (ms)", "Count");
    fig.add_series(Series::Bars(BarSeries {
        name: hist.code.clone().unwrap_or_else(|| "all".into()),
        edges: hist.edges.clone(),
        heights: hist.counts.iter().map(|&c| c as f64).collect(),
        color,
        opacity: BAR_OPACITY,
    }));
    fig
}
