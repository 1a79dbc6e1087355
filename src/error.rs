//! Error types for the tile grid workers and their controller.

/// Every failure the crate can produce.
///
/// Inside a worker these are recovered locally (logged and dropped); the
/// protocol has no error channel back to the controller.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A (column, row) pair outside the surface's grid.
    #[error("cell ({column}, {row}) is outside the grid")]
    CellOutOfRange { column: i64, row: i64 },

    /// A message arrived before the surface was initialised.
    #[error("surface not initialised")]
    UninitializedSurface,

    /// Undecodable or unrecognised wire message.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Bad `#rrggbb` literal.
    #[error("bad colour '{0}'")]
    BadColor(String),

    /// Surface geometry cannot hold a single cell.
    #[error("layout error: {0}")]
    Layout(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Worker event loop setup or dispatch failure.
    #[error("event loop error: {0}")]
    EventLoop(#[from] calloop::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No surface with this index was spawned.
    #[error("no surface {index} (have {count})")]
    NoSuchSurface { index: usize, count: usize },

    /// The worker thread for this surface is no longer receiving.
    #[error("worker for surface {0} is gone")]
    WorkerGone(usize),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, GridError>;
