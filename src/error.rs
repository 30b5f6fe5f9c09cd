use std::{fmt, io, path::PathBuf};

use crate::TermInt;

/// Failures the game core can report. All of them are fatal: they propagate
/// to `main`, which restores the terminal and exits.
#[derive(Debug)]
pub enum GameError {
    /// The terminal could not be put into raw mode / alternate screen.
    SurfaceInit(io::Error),
    /// A widget tried to write a cell outside the surface. Nothing is clipped.
    OutOfBounds { row: i32, col: i32, rows: TermInt, cols: TermInt },
    /// A text asset (title art) could not be read.
    AssetNotFound { path: PathBuf, source: io::Error },
    /// Terminal I/O failed after setup (flushing, reading keys).
    Io(io::Error),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::SurfaceInit(err) => write!(f, "terminal setup failed: {err}"),
            GameError::OutOfBounds { row, col, rows, cols } => {
                write!(f, "cell ({row}, {col}) is outside the {rows}x{cols} surface")
            }
            GameError::AssetNotFound { path, source } => {
                write!(f, "asset {} not found: {source}", path.display())
            }
            GameError::Io(err) => write!(f, "terminal i/o error: {err}"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::SurfaceInit(err) | GameError::Io(err) => Some(err),
            GameError::AssetNotFound { source, .. } => Some(source),
            GameError::OutOfBounds { .. } => None,
        }
    }
}

impl From<io::Error> for GameError {
    fn from(err: io::Error) -> Self {
        GameError::Io(err)
    }
}
