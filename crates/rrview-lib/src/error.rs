use thiserror::Error;

/// Contract violations raised synchronously by the selection engine.
///
/// Loader and configuration failures go through `anyhow` instead; these are
/// the only errors a live exploration session can produce.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExploreError {
    /// Recording id is not part of the dataset.
    #[error("recording not found: {0}")]
    NotFound(String),

    /// Window start lies after window end.
    #[error("invalid window: start {start} is after end {end}")]
    InvalidRange { start: f64, end: f64 },

    /// Dataset holds no recordings, so there is nothing to select.
    #[error("dataset contains no recordings")]
    EmptyDataset,
}

pub type ExploreResult<T> = std::result::Result<T, ExploreError>;
