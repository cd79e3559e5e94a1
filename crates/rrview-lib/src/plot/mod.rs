pub mod histogram;
pub mod palette;
pub mod render;

pub use histogram::{histogram_figure, rr_histogram, RrHistogram};
pub use palette::Palette;
pub use render::{FigureRenderer, ViewFigures};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub opacity: f32,
    pub color: Color,
}

/// `0xRRGGBB`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }

    /// CSS-style `#rrggbb`.
    pub fn hex(self) -> String {
        format!("#{:06x}", self.0 & 0xFF_FFFF)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

/// Points drawn individually, each with its own color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub colors: Vec<Color>,
    pub radius: f32,
}

/// One-dimensional strip of fixed-width cells along the x axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripSeries {
    pub name: String,
    pub cells: Vec<(f64, Color)>,
    pub cell_width: f64,
    pub opacity: f32,
}

/// Adjacent bars; bar `i` spans `edges[i]..edges[i + 1]` and rises from zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarSeries {
    pub name: String,
    pub edges: Vec<f64>,
    pub heights: Vec<f64>,
    pub color: Color,
    pub opacity: f32,
}

/// Text label with a marker pointing at `x`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Callout {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
    Scatter(ScatterSeries),
    Strip(StripSeries),
    Bars(BarSeries),
    Callout(Callout),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    /// Fixed x range; derived from the data when `None`.
    pub x_range: Option<(f64, f64)>,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis { label: None },
            y: Axis { label: None },
            x_range: None,
            series: Vec::new(),
        }
    }

    pub fn with_axes(mut self, x: &str, y: &str) -> Self {
        self.x.label = Some(x.into());
        self.y.label = Some(y.into());
        self
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|series| match series {
            Series::Line(line) => line.points.is_empty(),
            Series::Scatter(scatter) => scatter.points.is_empty(),
            Series::Strip(strip) => strip.cells.is_empty(),
            Series::Bars(bars) => bars.heights.is_empty(),
            Series::Callout(_) => false,
        })
    }

    /// Data bounds over every plotted coordinate, `((x_min, x_max), (y_min, y_max))`.
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for series in &self.series {
            match series {
                Series::Line(LineSeries { points, .. })
                | Series::Scatter(ScatterSeries { points, .. }) => {
                    xs.extend(points.iter().map(|p| p[0]));
                    ys.extend(points.iter().map(|p| p[1]));
                }
                Series::Strip(strip) => xs.extend(strip.cells.iter().map(|c| c.0)),
                Series::Bars(bars) => {
                    xs.extend(bars.edges.iter().copied());
                    ys.push(0.0);
                    ys.extend(bars.heights.iter().copied());
                }
                Series::Callout(callout) => {
                    xs.push(callout.x);
                    ys.push(callout.y);
                }
            }
        }
        let x = match self.x_range {
            Some(range) => range,
            None => min_max(&xs)?,
        };
        let y = min_max(&ys).unwrap_or((0.0, 1.0));
        Some((x, y))
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

pub trait PlotBackend {
    fn draw(&mut self, fig: &Figure) -> anyhow::Result<()>;
}

pub fn decimate_points(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if points.len() <= max_points {
        return points.to_vec();
    }
    let bucket_size = points.len() as f64 / max_points as f64;
    let mut result = Vec::with_capacity(max_points);
    for i in 0..max_points {
        let start = (i as f64 * bucket_size).floor() as usize;
        if start >= points.len() {
            break;
        }
        result.push(points[start]);
    }
    result
}
