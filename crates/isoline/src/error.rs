//! Error types for the marching squares pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while running the pipeline.
///
/// Every variant is fatal for the run: there is no partial output and no
/// retry.
#[derive(Error, Debug)]
pub enum MarchError {
    /// Invalid configuration or violated precondition.
    #[error("configuration error: {0}")]
    Config(String),

    /// The worker pool must have at least one worker.
    #[error("invalid worker count {0}: at least one worker is required")]
    InvalidWorkerCount(usize),

    /// A contour tile file is missing or could not be decoded.
    #[error("failed to load contour tile {code} from {}", path.display())]
    TileLoad {
        code: usize,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A contour tile does not fit inside one grid cell.
    #[error("contour tile {code} is {width}x{height}, larger than the {step}x{step} cell")]
    TileOversized {
        code: usize,
        width: u32,
        height: u32,
        step: usize,
    },

    /// A contour tile slot was read before any worker filled it.
    #[error("contour tile {0} is not loaded")]
    TileMissing(usize),

    /// The phase barrier was configured incorrectly.
    #[error("barrier error: {0}")]
    Barrier(String),

    /// Another worker failed and released this one from the barrier.
    #[error("barrier aborted by a failed worker")]
    BarrierAborted,

    /// A shared buffer lock was poisoned by a panicking worker.
    #[error("{0} lock poisoned")]
    Poisoned(&'static str),

    /// A worker thread panicked.
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),

    /// The operating system refused to create a worker thread.
    #[error("failed to spawn worker thread")]
    Spawn(#[source] std::io::Error),

    /// Image decode or encode error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file parse error.
    #[error("invalid configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl MarchError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error only reports that a peer worker failed first.
    pub fn is_secondary(&self) -> bool {
        matches!(self, Self::BarrierAborted)
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, MarchError>;
