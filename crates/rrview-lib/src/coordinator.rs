use crate::beat::{time_extent, BeatRecord, NarrativeEvent};
use crate::config::ExplorerConfig;
use crate::dataset::Dataset;
use crate::detectors::run::{detect_run, RunDetectorConfig};
use crate::error::ExploreResult;
use crate::plot::{Color, Palette};
use crate::selection::{SelectionSnapshot, SelectionState};
use log::{debug, warn};
use serde::Serialize;

/// Drawing surface fed by the coordinator. Implementations draw exactly the
/// points they are given and do no filtering of their own.
pub trait ViewRenderer {
    fn render_overview(&mut self, points: &[BeatRecord]);
    fn render_heatmap(&mut self, points: &[BeatRecord], highlight_code: &str);
    /// Time range the next detail render covers; `None` when it is empty.
    fn set_detail_domain(&mut self, _domain: Option<(f64, f64)>) {}
    fn render_detail(&mut self, points: &[BeatRecord], color_of: &dyn Fn(&str) -> Color);
    /// `None` clears any previously drawn callout.
    fn render_narrative(&mut self, event: Option<&NarrativeEvent>);
}

/// One analyst action, as emitted by the interaction surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    RecordingChanged(String),
    WindowChanged(f64, f64),
    /// Brush dismissed; detail goes back to the full extent.
    WindowCleared,
    CodeToggled(String),
}

/// Everything one recompute pass produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedViews {
    pub selection: SelectionSnapshot,
    pub overview_len: usize,
    pub detail_domain: Option<(f64, f64)>,
    pub detail: Vec<BeatRecord>,
    pub event: Option<NarrativeEvent>,
}

/// The full recording, independent of window and active codes.
pub fn overview_subset<'a>(
    dataset: &'a Dataset,
    selection: &SelectionSnapshot,
) -> ExploreResult<&'a [BeatRecord]> {
    dataset.beats_for(&selection.recording_id)
}

/// The window clipped to the recording's extent, or the whole extent when no
/// window is set. `None` for an empty recording or a disjoint window.
pub fn detail_domain(
    dataset: &Dataset,
    selection: &SelectionSnapshot,
) -> ExploreResult<Option<(f64, f64)>> {
    let beats = overview_subset(dataset, selection)?;
    let Some(extent) = time_extent(beats) else {
        return Ok(None);
    };
    Ok(match selection.window {
        Some(window) => window.clip_to(extent),
        None => Some(extent),
    })
}

/// Beats inside the clipped window whose code is active, in time order.
///
/// With no window the recording's own extent is used. A window that misses
/// the recording entirely yields an empty subset.
pub fn detail_subset(
    dataset: &Dataset,
    selection: &SelectionSnapshot,
) -> ExploreResult<Vec<BeatRecord>> {
    let beats = overview_subset(dataset, selection)?;
    let Some((lo, hi)) = detail_domain(dataset, selection)? else {
        return Ok(Vec::new());
    };
    Ok(beats
        .iter()
        .filter(|b| b.time_sec >= lo && b.time_sec <= hi)
        .filter(|b| selection.is_code_active(&b.annotation_code))
        .cloned()
        .collect())
}

/// Owns the session: dataset, selection and renderer.
///
/// Each interaction mutates the selection through one method and is followed
/// by one full recompute. Subsets are recomputed from scratch every time.
pub struct ViewCoordinator<R: ViewRenderer> {
    dataset: Dataset,
    state: SelectionState,
    detector: RunDetectorConfig,
    highlight_code: String,
    palette: Palette,
    renderer: R,
    last: Option<DerivedViews>,
}

impl<R: ViewRenderer> ViewCoordinator<R> {
    /// Start a session with default selection and draw the initial views.
    pub fn new(dataset: Dataset, config: &ExplorerConfig, renderer: R) -> ExploreResult<Self> {
        let state = SelectionState::new(&dataset)?;
        let palette = Palette::new(dataset.annotation_codes());
        let mut coordinator = Self {
            dataset,
            state,
            detector: config.detector(),
            highlight_code: config.highlight_code.clone(),
            palette,
            renderer,
            last: None,
        };
        coordinator.recompute()?;
        Ok(coordinator)
    }

    /// Apply one interaction and redraw. A rejected interaction leaves the
    /// selection and the drawn views exactly as they were.
    pub fn handle(&mut self, interaction: Interaction) -> ExploreResult<&DerivedViews> {
        let applied = match &interaction {
            Interaction::RecordingChanged(id) => self.state.set_recording(&self.dataset, id),
            Interaction::WindowChanged(start, end) => self.state.set_window(*start, *end),
            Interaction::WindowCleared => {
                self.state.clear_window();
                Ok(())
            }
            Interaction::CodeToggled(code) => {
                self.state.toggle_code(code);
                Ok(())
            }
        };
        if let Err(err) = applied {
            warn!("ignoring {:?}: {}", interaction, err);
            return Err(err);
        }
        self.recompute()
    }

    pub fn on_recording_change(&mut self, recording_id: &str) -> ExploreResult<&DerivedViews> {
        self.handle(Interaction::RecordingChanged(recording_id.to_string()))
    }

    pub fn on_window_change(&mut self, start: f64, end: f64) -> ExploreResult<&DerivedViews> {
        self.handle(Interaction::WindowChanged(start, end))
    }

    pub fn on_code_toggle(&mut self, code: &str) -> ExploreResult<&DerivedViews> {
        self.handle(Interaction::CodeToggled(code.to_string()))
    }

    /// Derive both subsets from the current selection, run detection and
    /// push everything to the renderer.
    pub fn recompute(&mut self) -> ExploreResult<&DerivedViews> {
        let selection = self.state.snapshot();
        let overview = overview_subset(&self.dataset, &selection)?;
        let domain = detail_domain(&self.dataset, &selection)?;
        let detail = detail_subset(&self.dataset, &selection)?;
        let event = detect_run(&detail, &self.detector);

        self.renderer.render_overview(overview);
        self.renderer.render_heatmap(overview, &self.highlight_code);
        self.renderer.set_detail_domain(domain);
        let palette = &self.palette;
        self.renderer
            .render_detail(&detail, &|code: &str| palette.color_of(code));
        self.renderer.render_narrative(event.as_ref());

        debug!(
            "recomputed recording={} window={:?} overview={} detail={} event={:?}",
            selection.recording_id,
            selection.window,
            overview.len(),
            detail.len(),
            event.as_ref().map(|e| e.time_sec)
        );

        let overview_len = overview.len();
        Ok(self.last.insert(DerivedViews {
            selection,
            overview_len,
            detail_domain: domain,
            detail,
            event,
        }))
    }

    pub fn selection(&self) -> SelectionSnapshot {
        self.state.snapshot()
    }

    /// Result of the most recent successful recompute.
    pub fn current(&self) -> Option<&DerivedViews> {
        self.last.as_ref()
    }

    pub fn event(&self) -> Option<&NarrativeEvent> {
        self.last.as_ref().and_then(|views| views.event.as_ref())
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
