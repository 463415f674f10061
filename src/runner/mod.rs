//! Sequential dispatch of a plan.
//!
//! One record at a time, each call blocking until the fit program exits.
//! What happens after a failed call is decided by [`ErrorPolicy`]:
//!
//! - `Continue` (default): log it and move on to the next record
//! - `Halt`: stop the run and return the failure, with the counts so far
//!
//! Either way every attempted call, including one that could not be
//! launched, gets a manifest line.
//!
//! The [`Dispatch`] trait is the seam between the loop and the outside
//! world. [`ProcessDispatcher`] spawns the real program; tests swap in a
//! recorder.

pub mod manifest;
pub mod process;

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::enumerate::Plan;
use crate::error::{ConfigError, Result, SweepError};
use crate::types::InvocationRecord;

pub use manifest::{ManifestEntry, ManifestWriter};
pub use process::ProcessDispatcher;

/// What to do when an invocation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    #[default]
    Continue,
    Halt,
}

impl FromStr for ErrorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "continue" => Ok(ErrorPolicy::Continue),
            "halt" | "stop" => Ok(ErrorPolicy::Halt),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Continue => write!(f, "continue"),
            ErrorPolicy::Halt => write!(f, "halt"),
        }
    }
}

/// Result of one call, as far as the enumerator cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    /// Non-zero exit. `code` is `None` when the process was killed by a signal.
    Failed { code: Option<i32> },
    /// The program could not be started at all.
    NotLaunched { reason: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "ok"),
            Outcome::Failed { code: Some(code) } => write!(f, "exit {}", code),
            Outcome::Failed { code: None } => write!(f, "killed by signal"),
            Outcome::NotLaunched { reason } => write!(f, "not launched: {}", reason),
        }
    }
}

/// Something that can carry out one invocation.
pub trait Dispatch {
    /// Run one record to completion.
    ///
    /// `Err(SweepError::Launch)` means nothing ran. Any exit status, zero or
    /// not, is an `Ok(Outcome)`.
    fn dispatch(&mut self, record: &InvocationRecord) -> Result<Outcome>;

    /// Human-readable form of the call, for logs.
    fn describe(&self, record: &InvocationRecord) -> String {
        record.to_args().join(" ")
    }
}

/// Options for a run that are not part of the enumeration.
#[derive(Debug, Default)]
pub struct RunOptions {
    pub policy: ErrorPolicy,
    pub manifest: Option<ManifestWriter>,
}

/// Counts for a finished (or halted) run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub planned: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Dispatch every record of `plan` in order.
pub fn run<D: Dispatch>(plan: Plan, dispatcher: &mut D, options: RunOptions) -> Result<RunReport> {
    let RunOptions { policy, mut manifest } = options;
    let mut report = RunReport {
        planned: plan.len(),
        ..Default::default()
    };

    info!(invocations = report.planned, shape = %plan.shape(), %policy, "starting sweep");

    for (index, record) in plan.enumerate() {
        let number = index + 1;
        let command = dispatcher.describe(&record);
        info!("[{}/{}] {}", number, report.planned, command);

        let start = Instant::now();
        // A launch failure is recorded like any other failed call, then the
        // policy decides.
        let outcome = match dispatcher.dispatch(&record) {
            Ok(outcome) => outcome,
            Err(SweepError::Launch { program, source }) => Outcome::NotLaunched {
                reason: format!("{}: {}", program, source),
            },
            Err(other) => return Err(other),
        };
        let elapsed = start.elapsed().as_secs_f64();
        report.attempted += 1;

        if let Some(writer) = manifest.as_mut() {
            writer.append(&ManifestEntry::new(number, &record, &outcome, elapsed))?;
        }

        if outcome.is_success() {
            report.succeeded += 1;
            debug!(index = number, elapsed_secs = elapsed, "invocation succeeded");
            continue;
        }

        report.failed += 1;
        warn!(index = number, %outcome, "invocation failed: {}", command);
        if policy == ErrorPolicy::Halt {
            return Err(SweepError::Halted {
                index: number,
                command,
                outcome,
                report,
            });
        }
    }

    info!(
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failed,
        "sweep finished"
    );
    Ok(report)
}
