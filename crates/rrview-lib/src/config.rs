use crate::detectors::run::{
    RunDetectorConfig, DEFAULT_NOTABLE_CODE, DEFAULT_RUN_LABEL, DEFAULT_RUN_LENGTH,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_OVERVIEW_POINTS: usize = 4096;

/// Session-wide settings for the exploration engine.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Consecutive notable beats needed before a narrative event is raised.
    pub run_length_threshold: usize,
    /// Annotation code the run detector looks for.
    pub notable_code: String,
    /// Annotation code painted red in the overview heatmap.
    pub highlight_code: String,
    pub narrative_label: String,
    /// Upper bound on points drawn for the overview line.
    pub max_overview_points: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            run_length_threshold: DEFAULT_RUN_LENGTH,
            notable_code: DEFAULT_NOTABLE_CODE.into(),
            highlight_code: DEFAULT_NOTABLE_CODE.into(),
            narrative_label: DEFAULT_RUN_LABEL.into(),
            max_overview_points: DEFAULT_MAX_OVERVIEW_POINTS,
        }
    }
}

impl ExplorerConfig {
    pub fn detector(&self) -> RunDetectorConfig {
        RunDetectorConfig {
            run_length_threshold: self.run_length_threshold,
            notable_code: self.notable_code.clone(),
            label: self.narrative_label.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.run_length_threshold == 0 {
            anyhow::bail!("run_length_threshold must be at least 1");
        }
        if self.max_overview_points == 0 {
            anyhow::bail!("max_overview_points must be at least 1");
        }
        Ok(())
    }
}

pub fn parse_config(text: &str) -> Result<ExplorerConfig> {
    let cfg: ExplorerConfig = toml::from_str(text).context("parsing explorer config")?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_config(path: &Path) -> Result<ExplorerConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_config(&text).with_context(|| format!("invalid config {}", path.display()))
}
