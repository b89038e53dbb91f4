//! Error types for dependency tree construction.
//!
//! Every failure is fatal to the run: the tree builder never hands back a
//! partially populated tree, so callers only ever see a complete forest or
//! one of these errors.

use std::path::PathBuf;
use thiserror::Error;

/// Stage of project acquisition that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionStage {
    /// Cloning or checking out the project repository.
    Checkout,
    /// Downloading module contents into the local cache.
    Download,
}

impl std::fmt::Display for AcquisitionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquisitionStage::Checkout => write!(f, "checkout"),
            AcquisitionStage::Download => write!(f, "download"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TreeError {
    /// Checkout or dependency materialization failed.
    #[error("{stage} failed: {message}")]
    Acquisition {
        stage: AcquisitionStage,
        message: String,
    },

    /// The module graph oracle failed, printed something unparsable, or
    /// reported a structurally inconsistent listing.
    #[error("`{command}` failed in {}:\n{diagnostic}", dir.display())]
    Oracle {
        dir: PathBuf,
        command: String,
        diagnostic: String,
    },

    /// A module transitively depends on one of its own ancestors.
    #[error("dependency cycle detected: {}", chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    /// A configuration file could not be read or parsed.
    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TreeError {
    pub fn oracle(
        dir: impl Into<PathBuf>,
        command: impl Into<String>,
        diagnostic: impl Into<String>,
    ) -> Self {
        TreeError::Oracle {
            dir: dir.into(),
            command: command.into(),
            diagnostic: diagnostic.into(),
        }
    }

    pub fn acquisition(stage: AcquisitionStage, message: impl Into<String>) -> Self {
        TreeError::Acquisition {
            stage,
            message: message.into(),
        }
    }

    pub fn is_oracle(&self) -> bool {
        matches!(self, TreeError::Oracle { .. })
    }
}

pub type Result<T, E = TreeError> = std::result::Result<T, E>;
