//! The three pipeline stages.
//!
//! Each stage reads the previous stage's table from the database directory and
//! writes its own. A stage whose output already exists does nothing, so a
//! pipeline can be rerun after a partial failure without repeating work.

pub mod authors;
pub mod awards;
pub mod publications;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

/// How a stage invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The output table was written.
    Written {
        /// Output path
        path: PathBuf,
        /// Rows written
        rows: usize,
    },
    /// The output already existed; nothing was done.
    AlreadyExists(PathBuf),
    /// No row could be processed, so no output was written and a rerun
    /// starts over.
    NotWritten(PathBuf),
}

impl Completion {
    /// Output path in either case.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Written { path, .. } | Self::AlreadyExists(path) | Self::NotWritten(path) => path,
        }
    }

    /// Rows written, or `None` if nothing was written.
    #[must_use]
    pub const fn rows(&self) -> Option<usize> {
        match self {
            Self::Written { rows, .. } => Some(*rows),
            Self::AlreadyExists(_) | Self::NotWritten(_) => None,
        }
    }
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Written { path, rows } => write!(f, "wrote {rows} rows to {}", path.display()),
            Self::AlreadyExists(path) => write!(f, "{} already exists", path.display()),
            Self::NotWritten(path) => write!(f, "nothing processed, {} not written", path.display()),
        }
    }
}

/// `Some(AlreadyExists)` if the output is present, logging the skip.
fn existing_output(path: &Path) -> Option<Completion> {
    path.exists().then(|| {
        info!(path = %path.display(), "Output already exists, skipping");
        Completion::AlreadyExists(path.to_path_buf())
    })
}
