//! pbpsweep - train/test population sweeps over an external fit program
//!
//! Given three populations, every population takes a turn as the training
//! set while the other two are held out for testing. For each model type
//! the fit program is called twice, once per test order.
//!
//! # Architecture
//!
//! ```text
//! Config (toml + CLI) → Enumeration → Plan (lazy records) → Runner → fit program
//!        ↓                  ↓              ↓                  ↓
//!     presets            shapes      mixed-radix index    Dispatch trait
//!                                                         + error policy
//! ```
//!
//! The fit program is a black box: it receives
//! `--model_type --train_pop --test_pop_1 --test_pop_2 [mode flags]` and its
//! exit status is the only thing looked at.

pub mod config;
pub mod enumerate;
pub mod error;
pub mod rendering;
pub mod runner;
pub mod types;

pub use config::{Config, Overrides};
pub use enumerate::{plan, split_for, splits, Enumeration, Plan, Preset, Shape};
pub use error::{ConfigError, SweepError};
pub use runner::{run, Dispatch, ErrorPolicy, Outcome, ProcessDispatcher, RunOptions, RunReport};
pub use types::{InferenceMode, InvocationRecord, ModeSet, ModelSpec, Population, PopulationSet, Split};
