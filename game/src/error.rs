use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Rejected engine construction. Nothing else in the engine fails: once a
/// game exists every command is either applied or ignored.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board dimensions {width}x{height} are out of range")]
    InvalidDimensions { width: usize, height: usize },

    #[error("board rows do not form a {width}x{height} grid ({rows} rows)")]
    MalformedBoard {
        width: usize,
        height: usize,
        rows: usize,
    },

    #[error("board {width}x{height} cannot fit a {shape_size}x{shape_size} piece")]
    BoardTooSmall {
        width: usize,
        height: usize,
        shape_size: usize,
    },

    #[error("drop interval must be non-zero")]
    ZeroDropInterval,

    #[error("piece pool is empty")]
    EmptyCatalog,

    #[error("shape matrix has no cells")]
    EmptyShape,

    #[error("shape matrix must be square, got {rows} rows with a {cols}-wide row")]
    NonSquareShape { rows: usize, cols: usize },

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
