use super::palette::{heatmap_color, HIGHLIGHT};
use super::{
    decimate_points, Callout, Color, Figure, LineSeries, ScatterSeries, Series, StripSeries, Style,
};
use crate::beat::{interval_extent, BeatRecord, NarrativeEvent};
use crate::coordinator::ViewRenderer;

const OVERVIEW_COLOR: u32 = 0x4682B4;
const HEATMAP_CELL_WIDTH: f64 = 2.0;
const HEATMAP_OPACITY: f32 = 0.6;
const DETAIL_POINT_RADIUS: f32 = 2.0;

/// Latest figure for each view.
#[derive(Debug, Clone)]
pub struct ViewFigures {
    pub overview: Figure,
    pub heatmap: Figure,
    pub detail: Figure,
}

fn overview_figure() -> Figure {
    Figure::new(Some("RR Interval Overview".to_string())).with_axes("Time (s)", "RR interval (ms)")
}

fn heatmap_figure() -> Figure {
    Figure::new(Some("Ectopy heatmap".to_string()))
}

fn detail_figure() -> Figure {
    Figure::new(Some("RR Interval Detail".to_string())).with_axes("Time (s)", "RR interval (ms)")
}

impl Default for ViewFigures {
    fn default() -> Self {
        Self {
            overview: overview_figure(),
            heatmap: heatmap_figure(),
            detail: detail_figure(),
        }
    }
}

/// [`ViewRenderer`] that turns each render call into a backend-neutral
/// [`Figure`]. Every call replaces the previous figure for that view.
#[derive(Debug, Clone)]
pub struct FigureRenderer {
    max_overview_points: usize,
    figures: ViewFigures,
    detail_domain: Option<(f64, f64)>,
    detail_rr_max: Option<f64>,
}

impl FigureRenderer {
    pub fn new(max_overview_points: usize) -> Self {
        Self {
            max_overview_points: max_overview_points.max(1),
            figures: ViewFigures::default(),
            detail_domain: None,
            detail_rr_max: None,
        }
    }

    pub fn figures(&self) -> &ViewFigures {
        &self.figures
    }

    pub fn into_figures(self) -> ViewFigures {
        self.figures
    }

    /// Narrative callout on the detail figure, if one is drawn.
    pub fn narrative(&self) -> Option<&Callout> {
        self.figures.detail.series.iter().find_map(|s| match s {
            Series::Callout(callout) => Some(callout),
            _ => None,
        })
    }
}

fn rr_points(points: &[BeatRecord]) -> Vec<[f64; 2]> {
    points.iter().map(|b| [b.time_sec, b.interval_ms]).collect()
}

impl ViewRenderer for FigureRenderer {
    fn render_overview(&mut self, points: &[BeatRecord]) {
        let mut fig = overview_figure();
        fig.add_series(Series::Line(LineSeries {
            name: "RR".into(),
            points: decimate_points(&rr_points(points), self.max_overview_points),
            style: Style {
                width: 1.0,
                opacity: 1.0,
                color: Color(OVERVIEW_COLOR),
            },
        }));
        self.figures.overview = fig;
    }

    fn render_heatmap(&mut self, points: &[BeatRecord], highlight_code: &str) {
        let mut fig = heatmap_figure();
        fig.add_series(Series::Strip(StripSeries {
            name: highlight_code.to_string(),
            cells: points
                .iter()
                .map(|b| (b.time_sec, heatmap_color(&b.annotation_code, highlight_code)))
                .collect(),
            cell_width: HEATMAP_CELL_WIDTH,
            opacity: HEATMAP_OPACITY,
        }));
        self.figures.heatmap = fig;
    }

    fn set_detail_domain(&mut self, domain: Option<(f64, f64)>) {
        self.detail_domain = domain;
    }

    fn render_detail(&mut self, points: &[BeatRecord], color_of: &dyn Fn(&str) -> Color) {
        let mut fig = detail_figure();
        fig.x_range = self.detail_domain;
        fig.add_series(Series::Scatter(ScatterSeries {
            name: "beats".into(),
            points: rr_points(points),
            colors: points.iter().map(|b| color_of(b.annotation_code.as_str())).collect(),
            radius: DETAIL_POINT_RADIUS,
        }));
        self.detail_rr_max = interval_extent(points).map(|(_, max)| max);
        self.figures.detail = fig;
    }

    fn render_narrative(&mut self, event: Option<&NarrativeEvent>) {
        self.figures
            .detail
            .series
            .retain(|s| !matches!(s, Series::Callout(_)));
        if let Some(event) = event {
            self.figures.detail.add_series(Series::Callout(Callout {
                x: event.time_sec,
                y: self.detail_rr_max.unwrap_or(0.0),
                text: event.label.clone(),
                color: HIGHLIGHT,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::palette::BACKGROUND_CELL;

    fn beats() -> Vec<BeatRecord> {
        vec![
            BeatRecord::new(0.0, 800.0, "N", "100"),
            BeatRecord::new(0.6, 600.0, "V", "100"),
            BeatRecord::new(1.9, 1300.0, "N", "100"),
        ]
    }

    #[test]
    fn heatmap_marks_highlighted_beats() {
        let mut r = FigureRenderer::new(16);
        r.render_heatmap(&beats(), "V");
        let Series::Strip(strip) = &r.figures().heatmap.series[0] else {
            panic!("expected strip series");
        };
        let colors: Vec<Color> = strip.cells.iter().map(|c| c.1).collect();
        assert_eq!(colors, vec![BACKGROUND_CELL, HIGHLIGHT, BACKGROUND_CELL]);
    }

    #[test]
    fn narrative_sits_above_detail_maximum_and_clears() {
        let mut r = FigureRenderer::new(16);
        r.render_detail(&beats(), &|_| Color(0));
        let event = NarrativeEvent {
            time_sec: 0.6,
            label: "Run of ventricular ectopy".into(),
        };
        r.render_narrative(Some(&event));
        let callout = r.narrative().expect("callout drawn");
        assert_eq!(callout.x, 0.6);
        assert_eq!(callout.y, 1300.0);
        r.render_narrative(None);
        assert!(r.narrative().is_none());
    }

    #[test]
    fn overview_is_decimated() {
        let many: Vec<BeatRecord> = (0..100)
            .map(|i| BeatRecord::new(i as f64, 800.0, "N", "100"))
            .collect();
        let mut r = FigureRenderer::new(10);
        r.render_overview(&many);
        let Series::Line(line) = &r.figures().overview.series[0] else {
            panic!("expected line series");
        };
        assert_eq!(line.points.len(), 10);
    }

    #[test]
    fn detail_axis_spans_the_domain_not_the_points() {
        let mut r = FigureRenderer::new(16);
        r.set_detail_domain(Some((0.0, 5.0)));
        r.render_detail(&beats()[..1], &|_| Color(0));
        assert_eq!(r.figures().detail.x_range, Some((0.0, 5.0)));
        assert_eq!(
            r.figures().detail.bounds(),
            Some(((0.0, 5.0), (800.0, 800.0)))
        );
    }

    #[test]
    fn empty_detail_yields_empty_figure() {
        let mut r = FigureRenderer::new(10);
        r.render_detail(&[], &|_| Color(0));
        r.render_narrative(None);
        assert!(r.figures().detail.is_empty());
    }
}
