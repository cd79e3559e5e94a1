use anyhow::Result;
use plotters::prelude::*;
use rrview_lib::plot::{Color as FigureColor, Figure, PlotBackend, Series};
use std::path::PathBuf;

/// Writes each figure it is given to one SVG file.
pub struct SvgFigureBackend {
    path: PathBuf,
    size: (u32, u32),
}

impl SvgFigureBackend {
    pub fn new(path: impl Into<PathBuf>, size: (u32, u32)) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

fn rgb(color: FigureColor) -> RGBColor {
    let (r, g, b) = color.rgb();
    RGBColor(r, g, b)
}

fn widen(range: (f64, f64)) -> (f64, f64) {
    if (range.1 - range.0).abs() < f64::EPSILON {
        (range.0 - 0.5, range.1 + 0.5)
    } else {
        range
    }
}

impl PlotBackend for SvgFigureBackend {
    fn draw(&mut self, fig: &Figure) -> Result<()> {
        let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE)?;
        let (x_range, y_range) = fig.bounds().unwrap_or(((0.0, 1.0), (0.0, 1.0)));
        let (x_min, x_max) = widen(x_range);
        let (y_min, y_max) = widen(y_range);
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(
                fig.title.clone().unwrap_or_else(|| "Plot".into()),
                ("sans-serif", 20),
            )
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
        chart
            .configure_mesh()
            .x_desc(fig.x.label.clone().unwrap_or_default())
            .y_desc(fig.y.label.clone().unwrap_or_default())
            .draw()?;

        // strip cells are sized in pixels, not data units
        let px_to_x = (x_max - x_min) / self.size.0.max(1) as f64;
        for series in &fig.series {
            match series {
                Series::Line(line) => {
                    chart.draw_series(LineSeries::new(
                        line.points.iter().map(|p| (p[0], p[1])),
                        rgb(line.style.color)
                            .mix(line.style.opacity as f64)
                            .stroke_width(line.style.width.max(1.0) as u32),
                    ))?;
                }
                Series::Scatter(scatter) => {
                    chart.draw_series(scatter.points.iter().zip(&scatter.colors).map(
                        |(p, color)| {
                            Circle::new((p[0], p[1]), scatter.radius as i32, rgb(*color).filled())
                        },
                    ))?;
                }
                Series::Strip(strip) => {
                    let width = strip.cell_width * px_to_x;
                    chart.draw_series(strip.cells.iter().map(|(x, color)| {
                        Rectangle::new(
                            [(*x, y_min), (*x + width, y_max)],
                            rgb(*color).mix(strip.opacity as f64).filled(),
                        )
                    }))?;
                }
                Series::Bars(bars) => {
                    let fill = rgb(bars.color).mix(bars.opacity as f64).filled();
                    chart.draw_series(bars.edges.windows(2).zip(&bars.heights).map(
                        |(edge, height)| Rectangle::new([(edge[0], 0.0), (edge[1], *height)], fill),
                    ))?;
                }
                Series::Callout(callout) => {
                    let color = rgb(callout.color);
                    chart.draw_series(std::iter::once(TriangleMarker::new(
                        (callout.x, callout.y),
                        6,
                        color.filled(),
                    )))?;
                    chart.draw_series(std::iter::once(Text::new(
                        callout.text.clone(),
                        (callout.x, callout.y),
                        ("sans-serif", 14).into_font().color(&color),
                    )))?;
                }
            }
        }
        root.present()?;
        Ok(())
    }
}
