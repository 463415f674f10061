//! Core types for pbpsweep.
//!
//! Everything here is a plain value:
//! - `Population` is an interned name (`Arc<str>`) so splits and records can
//!   be cloned freely while a plan is being walked
//! - `PopulationSet` and `ModeSet` validate on construction, so a value that
//!   exists is a value that can be enumerated
//! - `InvocationRecord` knows how to render itself as the fit program's argv

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

/// Number of populations a sweep is defined over. One trains, two test.
pub const POPULATION_COUNT: usize = 3;

/// Default populations, in iteration order.
pub const DEFAULT_POPULATIONS: [&str; POPULATION_COUNT] = ["cdc", "pmen", "maela"];

/// A named cohort used as a training or test label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Population(Arc<str>);

impl Population {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Population {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for Population {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Population {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}

/// Exactly three distinct populations in a fixed order.
///
/// The order matters twice: it is the outer iteration order, and it decides
/// which of the two remaining populations becomes `test_pop_1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PopulationSet {
    members: [Population; POPULATION_COUNT],
}

impl PopulationSet {
    /// Build a set from names, rejecting anything but three distinct,
    /// non-empty identifiers.
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|s| s.as_ref().trim().to_string()).collect();
        if names.len() != POPULATION_COUNT {
            return Err(ConfigError::PopulationCount(names.len()));
        }

        let mut seen = BTreeSet::new();
        for name in &names {
            if name.is_empty() {
                return Err(ConfigError::EmptyPopulation);
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicatePopulation(name.clone()));
            }
        }

        Ok(Self {
            members: [
                Population::new(names[0].as_str()),
                Population::new(names[1].as_str()),
                Population::new(names[2].as_str()),
            ],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Population> {
        self.members.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|p| p.as_str() == name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for PopulationSet {
    fn default() -> Self {
        Self {
            members: DEFAULT_POPULATIONS.map(Population::new),
        }
    }
}

impl TryFrom<Vec<String>> for PopulationSet {
    type Error = ConfigError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<PopulationSet> for Vec<String> {
    fn from(set: PopulationSet) -> Self {
        set.members.iter().map(|p| p.to_string()).collect()
    }
}

impl fmt::Display for PopulationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.members.iter().map(Population::as_str).collect();
        write!(f, "{}", names.join(", "))
    }
}

/// One training population and the two held-out test populations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Split {
    pub train: Population,
    pub test_1: Population,
    pub test_2: Population,
}

impl Split {
    /// The same split with the test populations in the other order.
    pub fn swapped(&self) -> Self {
        Self {
            train: self.train.clone(),
            test_1: self.test_2.clone(),
            test_2: self.test_1.clone(),
        }
    }
}

/// Model identifiers understood by the fit program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelSpec {
    #[serde(rename = "random_forest")]
    RandomForest,
    #[serde(rename = "elastic_net")]
    ElasticNet,
    #[serde(rename = "lasso")]
    Lasso,
    #[serde(rename = "DBSCAN")]
    Dbscan,
    #[serde(rename = "DBSCAN_with_UMAP")]
    DbscanWithUmap,
}

impl ModelSpec {
    /// The four models of the full comparison grid, in run order.
    pub const GRID: [ModelSpec; 4] = [
        ModelSpec::RandomForest,
        ModelSpec::ElasticNet,
        ModelSpec::Dbscan,
        ModelSpec::DbscanWithUmap,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelSpec::RandomForest => "random_forest",
            ModelSpec::ElasticNet => "elastic_net",
            ModelSpec::Lasso => "lasso",
            ModelSpec::Dbscan => "DBSCAN",
            ModelSpec::DbscanWithUmap => "DBSCAN_with_UMAP",
        }
    }
}

impl FromStr for ModelSpec {
    type Err = ConfigError;

    // Case-sensitive: the token is passed through to the fit program verbatim.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random_forest" => Ok(ModelSpec::RandomForest),
            "elastic_net" => Ok(ModelSpec::ElasticNet),
            "lasso" => Ok(ModelSpec::Lasso),
            "DBSCAN" => Ok(ModelSpec::Dbscan),
            "DBSCAN_with_UMAP" => Ok(ModelSpec::DbscanWithUmap),
            _ => Err(ConfigError::UnknownModel(s.to_string())),
        }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional scoring modes of the fit program.
///
/// Declaration order is the order flags are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InferenceMode {
    #[serde(rename = "blosum_inference")]
    Blosum,
    #[serde(rename = "HMM_inference")]
    Hmm,
    #[serde(rename = "HMM_MIC_inference")]
    HmmMic,
    #[serde(rename = "just_HMM_scores")]
    JustHmmScores,
}

impl InferenceMode {
    pub const ALL: [InferenceMode; 4] = [
        InferenceMode::Blosum,
        InferenceMode::Hmm,
        InferenceMode::HmmMic,
        InferenceMode::JustHmmScores,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InferenceMode::Blosum => "blosum_inference",
            InferenceMode::Hmm => "HMM_inference",
            InferenceMode::HmmMic => "HMM_MIC_inference",
            InferenceMode::JustHmmScores => "just_HMM_scores",
        }
    }

    /// Command-line flag, e.g. `--HMM_inference`.
    pub fn flag(self) -> String {
        format!("--{}", self.as_str())
    }
}

impl FromStr for InferenceMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches("--");
        InferenceMode::ALL
            .into_iter()
            .find(|m| m.as_str() == name)
            .ok_or_else(|| ConfigError::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for InferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The inference flags appended to one invocation.
///
/// Stored in canonical (declaration) order regardless of input order. The
/// empty set is the baseline run with no optional flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<InferenceMode>", into = "Vec<InferenceMode>")]
pub struct ModeSet(Vec<InferenceMode>);

impl ModeSet {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(modes: impl IntoIterator<Item = InferenceMode>) -> Result<Self, ConfigError> {
        let mut unique = BTreeSet::new();
        for mode in modes {
            if !unique.insert(mode) {
                return Err(ConfigError::DuplicateMode(mode.to_string()));
            }
        }
        Ok(Self(unique.into_iter().collect()))
    }

    /// Adds `mode` if absent. Flags stay in their fixed order.
    pub fn with(mut self, mode: InferenceMode) -> Self {
        if let Err(at) = self.0.binary_search(&mode) {
            self.0.insert(at, mode);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn modes(&self) -> &[InferenceMode] {
        &self.0
    }

    pub fn contains(&self, mode: InferenceMode) -> bool {
        self.0.contains(&mode)
    }

    pub fn flags(&self) -> impl Iterator<Item = String> + '_ {
        self.0.iter().map(|m| m.flag())
    }
}

impl TryFrom<Vec<InferenceMode>> for ModeSet {
    type Error = ConfigError;

    fn try_from(modes: Vec<InferenceMode>) -> Result<Self, Self::Error> {
        Self::new(modes)
    }
}

impl From<ModeSet> for Vec<InferenceMode> {
    fn from(set: ModeSet) -> Self {
        set.0
    }
}

impl FromStr for ModeSet {
    type Err = ConfigError;

    /// Parse `none` or a comma-separated list such as
    /// `HMM_inference,HMM_MIC_inference`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(Self::none());
        }
        let modes = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(InferenceMode::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(modes)
    }
}

impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<_> = self.0.iter().map(|m| m.as_str()).collect();
        write!(f, "{}", names.join(","))
    }
}

/// Arguments for exactly one call of the fit program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationRecord {
    pub model_type: ModelSpec,
    pub train_pop: Population,
    pub test_pop_1: Population,
    pub test_pop_2: Population,
    pub modes: ModeSet,
}

impl InvocationRecord {
    pub fn new(model_type: ModelSpec, split: &Split, modes: &ModeSet) -> Self {
        Self {
            model_type,
            train_pop: split.train.clone(),
            test_pop_1: split.test_1.clone(),
            test_pop_2: split.test_2.clone(),
            modes: modes.clone(),
        }
    }

    /// Argument vector in the fit program's vocabulary, program name excluded.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--model_type".to_string(),
            self.model_type.to_string(),
            "--train_pop".to_string(),
            self.train_pop.to_string(),
            "--test_pop_1".to_string(),
            self.test_pop_1.to_string(),
            "--test_pop_2".to_string(),
            self.test_pop_2.to_string(),
        ];
        args.extend(self.modes.flags());
        args
    }

    /// Shell-style rendering of the full command line, for logs and dry runs.
    pub fn command_line(&self, program: &[String]) -> String {
        program
            .iter()
            .cloned()
            .chain(self.to_args())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_set_default_order() {
        let set = PopulationSet::default();
        let names: Vec<_> = set.iter().map(Population::as_str).collect();
        assert_eq!(names, vec!["cdc", "pmen", "maela"]);
    }

    #[test]
    fn test_population_set_rejects_wrong_size() {
        assert!(matches!(
            PopulationSet::new(["cdc", "pmen"]),
            Err(ConfigError::PopulationCount(2))
        ));
        assert!(matches!(
            PopulationSet::new(["cdc", "pmen", "maela", "gps"]),
            Err(ConfigError::PopulationCount(4))
        ));
    }

    #[test]
    fn test_population_set_rejects_duplicates_and_blanks() {
        assert!(matches!(
            PopulationSet::new(["cdc", "pmen", "cdc"]),
            Err(ConfigError::DuplicatePopulation(name)) if name == "cdc"
        ));
        assert!(matches!(
            PopulationSet::new(["cdc", " ", "maela"]),
            Err(ConfigError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_population_set_from_toml_array() {
        #[derive(Deserialize)]
        struct Wrapper {
            populations: PopulationSet,
        }
        let ok: Wrapper = toml::from_str(r#"populations = ["a", "b", "c"]"#).unwrap();
        assert!(ok.populations.contains("b"));

        let bad: Result<Wrapper, _> = toml::from_str(r#"populations = ["a", "b"]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_model_spec_tokens() {
        for model in ModelSpec::GRID {
            assert_eq!(model.as_str().parse::<ModelSpec>().unwrap(), model);
        }
        assert_eq!("lasso".parse::<ModelSpec>().unwrap(), ModelSpec::Lasso);
        assert!("dbscan".parse::<ModelSpec>().is_err());
        assert_eq!(ModelSpec::DbscanWithUmap.to_string(), "DBSCAN_with_UMAP");
    }

    #[test]
    fn test_inference_mode_accepts_flag_form() {
        assert_eq!("--HMM_inference".parse::<InferenceMode>().unwrap(), InferenceMode::Hmm);
        assert_eq!("just_HMM_scores".parse::<InferenceMode>().unwrap(), InferenceMode::JustHmmScores);
        assert!("hmm".parse::<InferenceMode>().is_err());
    }

    #[test]
    fn test_mode_set_canonical_order() {
        let set: ModeSet = "HMM_MIC_inference,HMM_inference".parse().unwrap();
        assert_eq!(set.modes(), &[InferenceMode::Hmm, InferenceMode::HmmMic]);
        assert_eq!(set.to_string(), "HMM_inference,HMM_MIC_inference");
    }

    #[test]
    fn test_mode_set_none_and_duplicates() {
        assert!("none".parse::<ModeSet>().unwrap().is_empty());
        assert_eq!(ModeSet::none().to_string(), "none");
        assert!(matches!(
            "HMM_inference,HMM_inference".parse::<ModeSet>(),
            Err(ConfigError::DuplicateMode(_))
        ));
    }

    #[test]
    fn test_mode_set_with_keeps_fixed_order() {
        let set = ModeSet::none()
            .with(InferenceMode::JustHmmScores)
            .with(InferenceMode::Blosum)
            .with(InferenceMode::JustHmmScores);
        assert_eq!(set.modes(), &[InferenceMode::Blosum, InferenceMode::JustHmmScores]);
        assert_eq!(set, "just_HMM_scores,blosum_inference".parse().unwrap());
    }

    #[test]
    fn test_record_args_vocabulary() {
        let split = Split {
            train: "cdc".into(),
            test_1: "pmen".into(),
            test_2: "maela".into(),
        };
        let modes = ModeSet::new([InferenceMode::HmmMic, InferenceMode::Hmm]).unwrap();
        let record = InvocationRecord::new(ModelSpec::RandomForest, &split, &modes);

        assert_eq!(
            record.to_args(),
            vec![
                "--model_type", "random_forest",
                "--train_pop", "cdc",
                "--test_pop_1", "pmen",
                "--test_pop_2", "maela",
                "--HMM_inference",
                "--HMM_MIC_inference",
            ]
        );
    }

    #[test]
    fn test_split_swapped() {
        let split = Split {
            train: "pmen".into(),
            test_1: "cdc".into(),
            test_2: "maela".into(),
        };
        let swapped = split.swapped();
        assert_eq!(swapped.train, split.train);
        assert_eq!(swapped.test_1, split.test_2);
        assert_eq!(swapped.test_2, split.test_1);
    }

    #[test]
    fn test_command_line_prefixes_program() {
        let split = Split {
            train: "maela".into(),
            test_1: "cdc".into(),
            test_2: "pmen".into(),
        };
        let record = InvocationRecord::new(ModelSpec::ElasticNet, &split, &ModeSet::none());
        let program = vec!["python".to_string(), "fit_models.py".to_string()];
        assert_eq!(
            record.command_line(&program),
            "python fit_models.py --model_type elastic_net --train_pop maela --test_pop_1 cdc --test_pop_2 pmen"
        );
    }
}
