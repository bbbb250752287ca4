//! Errors raised while loading a scenario or setting up a run.

use std::path::PathBuf;

use fluidsim_kernel::{ConfigError, SeedError};

/// Everything that can go wrong between a scenario file and a running simulation.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The scenario file could not be read.
    #[error("failed to read scenario file {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The scenario parsed but describes something that cannot run.
    #[error("invalid scenario: {0}")]
    Invalid(String),

    /// The physical configuration was rejected by the kernel.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The initial particle set was rejected by the kernel.
    #[error(transparent)]
    Seed(#[from] SeedError),

    /// The runner thread panicked.
    #[error("simulation thread panicked")]
    ThreadPanicked,
}
