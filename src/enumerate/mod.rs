//! The experiment enumerator.
//!
//! Turns a sweep definition into the ordered list of fit-program calls.
//! Nothing here touches a process: the output is a lazy [`Plan`] that the
//! [`runner`](crate::runner) consumes one record at a time.
//!
//! ## Shapes
//!
//! Two loop nestings are supported, both ending in the same inner pair of
//! calls (test order as split, then swapped):
//!
//! ```text
//! models-within-populations      populations-within-models
//!   for train in populations       for model in models
//!     for model in models            for train in populations
//!       for modes in mode_sets         for modes in mode_sets
//!         call(t1, t2)                   call(t1, t2)
//!         call(t2, t1)                   call(t2, t1)
//! ```

pub mod plan;
pub mod presets;
pub mod split;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{ModeSet, ModelSpec, PopulationSet};

pub use plan::{plan, Plan};
pub use presets::Preset;
pub use split::{split_for, splits};

/// Loop nesting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    /// Training population outermost, models inside.
    #[default]
    ModelsWithinPopulations,
    /// Model outermost, the full population loop inside.
    PopulationsWithinModels,
}

impl FromStr for Shape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "models-within-populations" => Ok(Shape::ModelsWithinPopulations),
            "populations-within-models" => Ok(Shape::PopulationsWithinModels),
            _ => Err(ConfigError::UnknownShape(s.to_string())),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::ModelsWithinPopulations => write!(f, "models-within-populations"),
            Shape::PopulationsWithinModels => write!(f, "populations-within-models"),
        }
    }
}

/// Everything that decides *which* calls are made and in what order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    pub populations: PopulationSet,
    pub models: Vec<ModelSpec>,
    /// Mode sets applied per (split, model). Each one repeats both test
    /// orders. Empty is treated as a single baseline set.
    pub mode_sets: Vec<ModeSet>,
    pub shape: Shape,
}

impl Enumeration {
    /// Fail-fast checks that `PopulationSet` and `ModeSet` cannot enforce on
    /// their own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.models.is_empty() {
            return Err(ConfigError::EmptyModels);
        }
        let mut seen = HashSet::new();
        for set in &self.mode_sets {
            if !seen.insert(set) {
                return Err(ConfigError::DuplicateModeSet(set.to_string()));
            }
        }
        Ok(())
    }

    /// Mode sets with the empty-list case normalised to the baseline.
    pub fn effective_mode_sets(&self) -> Vec<ModeSet> {
        if self.mode_sets.is_empty() {
            vec![ModeSet::none()]
        } else {
            self.mode_sets.clone()
        }
    }

    /// Number of calls this enumeration produces.
    pub fn invocation_count(&self) -> usize {
        self.populations.len() * self.models.len() * self.effective_mode_sets().len() * 2
    }
}

impl Default for Enumeration {
    fn default() -> Self {
        Preset::FullGrid.enumeration()
    }
}
