//! Error taxonomy for pbpsweep.
//!
//! Two layers:
//! - [`ConfigError`]: anything wrong with the sweep definition. Raised before
//!   the first invocation is dispatched.
//! - [`SweepError`]: anything that goes wrong while the sweep is running.
//!
//! Subprocess exit codes are *not* errors here. A non-zero exit is an
//! [`Outcome`](crate::runner::Outcome); whether it stops the run is decided by
//! [`ErrorPolicy`](crate::runner::ErrorPolicy).

use std::path::PathBuf;
use thiserror::Error;

use crate::runner::{Outcome, RunReport};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("expected exactly 3 populations, got {0}")]
    PopulationCount(usize),

    #[error("population '{0}' listed more than once")]
    DuplicatePopulation(String),

    #[error("population names must be non-empty")]
    EmptyPopulation,

    #[error("'{0}' is not in the population set")]
    UnknownPopulation(String),

    #[error("model list is empty")]
    EmptyModels,

    #[error("fit program command is empty")]
    EmptyProgram,

    #[error("unknown model type: {0}. Use random_forest, elastic_net, lasso, DBSCAN or DBSCAN_with_UMAP")]
    UnknownModel(String),

    #[error("unknown inference mode: {0}. Use blosum_inference, HMM_inference, HMM_MIC_inference or just_HMM_scores")]
    UnknownMode(String),

    #[error("inference mode '{0}' appears twice in one mode set")]
    DuplicateMode(String),

    #[error("mode set '{0}' listed more than once")]
    DuplicateModeSet(String),

    #[error("unknown enumeration shape: {0}. Use models-within-populations or populations-within-models")]
    UnknownShape(String),

    #[error("unknown error policy: {0}. Use continue or halt")]
    UnknownPolicy(String),

    #[error("unknown preset: {0}. Use full-grid or rf-hmm")]
    UnknownPreset(String),

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum SweepError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("halting after failed invocation #{index} ({outcome}): {command}")]
    Halted {
        index: usize,
        command: String,
        outcome: Outcome,
        /// Counts up to and including the failed call.
        report: RunReport,
    },

    #[error("failed to write manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = SweepError> = std::result::Result<T, E>;
