pub mod beat;
pub mod config;
pub mod coordinator;
pub mod dataset;
pub mod detectors;
pub mod error;
pub mod io;
pub mod plot;
pub mod selection;
pub mod vocabulary;

pub use beat::*;
pub use coordinator::*;
pub use dataset::*;
pub use error::{ExploreError, ExploreResult};
pub use selection::*;
