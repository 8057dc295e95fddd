use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::avl::GrowError;

/// Errors raised while building dictionaries and document vectors.
///
/// A file that cannot be opened or read during a directory scan is not an error:
/// the scanner logs it and moves on. Everything here aborts the operation in progress.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("out of memory while growing {what}")]
    Allocation {
        what: &'static str,
        #[source]
        source: GrowError,
    },

    #[error("failed to enumerate corpus directory {path}")]
    Directory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to open {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// More readable documents turned up than the dictionary recorded.
    #[error("corpus holds more documents than the {capacity} recorded by the dictionary")]
    CapacityExceeded { capacity: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = CorpusError> = std::result::Result<T, E>;
