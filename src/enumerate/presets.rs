//! Named starting points for a sweep.
//!
//! | Preset      | Shape                      | Models          | Mode sets                          |
//! |-------------|----------------------------|-----------------|------------------------------------|
//! | `full-grid` | models-within-populations  | RF, EN, DBSCAN, DBSCAN+UMAP | baseline only          |
//! | `rf-hmm`    | populations-within-models  | random_forest   | `HMM_inference,HMM_MIC_inference`  |
//!
//! The two are kept separate on purpose: they are different experiments that
//! happen to share an enumerator, not one experiment with options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Enumeration, Shape};
use crate::error::ConfigError;
use crate::types::{InferenceMode, ModeSet, ModelSpec, PopulationSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Every model, both test orders, no inference flags.
    #[default]
    FullGrid,
    /// Random forest only, HMM and HMM-MIC inference always on.
    RfHmm,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::FullGrid, Preset::RfHmm];

    pub fn enumeration(self) -> Enumeration {
        match self {
            Preset::FullGrid => Enumeration {
                populations: PopulationSet::default(),
                models: ModelSpec::GRID.to_vec(),
                mode_sets: vec![ModeSet::none()],
                shape: Shape::ModelsWithinPopulations,
            },
            Preset::RfHmm => Enumeration {
                populations: PopulationSet::default(),
                models: vec![ModelSpec::RandomForest],
                mode_sets: vec![hmm_modes()],
                shape: Shape::PopulationsWithinModels,
            },
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::FullGrid => "all models x all splits x both test orders",
            Preset::RfHmm => "random_forest with HMM_inference + HMM_MIC_inference",
        }
    }
}

fn hmm_modes() -> ModeSet {
    ModeSet::none().with(InferenceMode::Hmm).with(InferenceMode::HmmMic)
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "full-grid" | "grid" => Ok(Preset::FullGrid),
            "rf-hmm" | "hmm" => Ok(Preset::RfHmm),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::FullGrid => write!(f, "full-grid"),
            Preset::RfHmm => write!(f, "rf-hmm"),
        }
    }
}
