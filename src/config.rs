//! Configuration loading from pbpsweep.toml and pyproject.toml.
//!
//! The fit program usually lives in a Python project, so the sweep can be
//! configured right next to it:
//! - `[tool.pbpsweep]` section in pyproject.toml
//! - Standalone pbpsweep.toml, which wins if both exist
//!
//! Values are layered: preset, then file, then command-line overrides.
//! Keys are kebab-case (snake_case is accepted too); an unknown key is an
//! error.
//!
//! ## Example
//!
//! ```toml
//! [tool.pbpsweep]
//! preset = "full-grid"
//! program = ["python", "fit_models.py"]
//! populations = ["cdc", "pmen", "maela"]
//! models = ["random_forest", "elastic_net"]
//! mode-sets = [[], ["blosum_inference"]]
//! on-error = "halt"
//! manifest = "results/sweep.jsonl"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::enumerate::{Enumeration, Preset, Shape};
use crate::error::ConfigError;
use crate::runner::ErrorPolicy;
use crate::types::{InferenceMode, ModeSet, ModelSpec, PopulationSet};

/// Default fit program command.
pub const DEFAULT_PROGRAM: &[&str] = &["python", "fit_models.py"];

/// Standalone config file name.
pub const CONFIG_FILE: &str = "pbpsweep.toml";

/// Resolved sweep configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source file for this config (for display).
    pub source: Option<PathBuf>,

    /// Preset the enumeration started from.
    pub preset: Preset,

    /// Which calls are made, in which order.
    pub enumeration: Enumeration,

    /// Fit program command prefix.
    pub program: Vec<String>,

    /// Working directory for the fit program.
    pub workdir: Option<PathBuf>,

    pub on_error: ErrorPolicy,

    /// JSON-lines run log.
    pub manifest: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

/// Raw config as deserialized from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    preset: Option<String>,
    populations: Option<Vec<String>>,
    models: Option<Vec<String>>,
    #[serde(alias = "mode_sets")]
    mode_sets: Option<Vec<Vec<String>>>,
    shape: Option<String>,
    program: Option<Vec<String>>,
    workdir: Option<String>,
    #[serde(alias = "on_error")]
    on_error: Option<String>,
    manifest: Option<String>,
}

/// Wrapper for pyproject.toml structure.
#[derive(Debug, Deserialize)]
struct PyProject {
    tool: Option<PyProjectTool>,
}

// Kept as a raw value so a bad section is reported, not mistaken for a
// file that has none.
#[derive(Debug, Deserialize)]
struct PyProjectTool {
    pbpsweep: Option<toml::Value>,
}

/// Command-line overrides. Empty / `None` fields leave the value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Explicit config file; disables discovery.
    pub config_path: Option<PathBuf>,
    pub preset: Option<Preset>,
    pub populations: Vec<String>,
    pub models: Vec<String>,
    /// Comma-separated mode sets, `none` for the baseline.
    pub mode_sets: Vec<String>,
    pub shape: Option<String>,
    pub program: Vec<String>,
    pub workdir: Option<PathBuf>,
    pub halt_on_error: bool,
    pub manifest: Option<PathBuf>,
}

impl Config {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            source: None,
            preset,
            enumeration: preset.enumeration(),
            program: DEFAULT_PROGRAM.iter().map(|s| s.to_string()).collect(),
            workdir: None,
            on_error: ErrorPolicy::default(),
            manifest: None,
        }
    }

    /// Load configuration for the given directory and apply overrides.
    ///
    /// Search order (skipped when `overrides.config_path` is set):
    /// 1. pbpsweep.toml in directory
    /// 2. pyproject.toml [tool.pbpsweep] in directory
    /// 3. Walk up to find pyproject.toml with a [tool.pbpsweep] section
    /// 4. Preset defaults if nothing found
    pub fn load(directory: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = match &overrides.config_path {
            Some(path) => Some((Self::read_standalone(path)?, path.clone())),
            None => Self::discover(directory)?,
        };
        Self::resolve(file, overrides)
    }

    fn discover(directory: &Path) -> Result<Option<(RawConfig, PathBuf)>, ConfigError> {
        let standalone = directory.join(CONFIG_FILE);
        if standalone.exists() {
            return Ok(Some((Self::read_standalone(&standalone)?, standalone)));
        }

        let mut current = Some(directory);
        while let Some(dir) = current {
            let pyproject = dir.join("pyproject.toml");
            if pyproject.exists() {
                if let Some(raw) = Self::read_pyproject(&pyproject)? {
                    return Ok(Some((raw, pyproject)));
                }
            }
            current = dir.parent();
        }

        Ok(None)
    }

    fn read_standalone(path: &Path) -> Result<RawConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    // Unrelated or broken pyproject files are skipped. An invalid
    // [tool.pbpsweep] section is an error.
    fn read_pyproject(path: &Path) -> Result<Option<RawConfig>, ConfigError> {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Ok(None);
        };
        let section = match toml::from_str::<PyProject>(&content) {
            Ok(pyproject) => pyproject.tool.and_then(|tool| tool.pbpsweep),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable pyproject.toml");
                None
            }
        };
        section
            .map(|value| value.try_into::<RawConfig>())
            .transpose()
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    fn resolve(file: Option<(RawConfig, PathBuf)>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let (raw, source) = match file {
            Some((raw, path)) => (raw, Some(path)),
            None => (RawConfig::default(), None),
        };

        let preset = match (overrides.preset, &raw.preset) {
            (Some(preset), _) => preset,
            (None, Some(name)) => name.parse()?,
            (None, None) => Preset::default(),
        };

        let mut config = Self::from_preset(preset);
        config.source = source;
        config.apply_raw(raw)?;
        config.apply_overrides(overrides)?;
        config.enumeration.validate()?;
        if config.program.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(ConfigError::EmptyProgram);
        }
        Ok(config)
    }

    fn apply_raw(&mut self, raw: RawConfig) -> Result<(), ConfigError> {
        if let Some(populations) = raw.populations {
            self.enumeration.populations = PopulationSet::new(populations)?;
        }
        if let Some(models) = raw.models {
            self.enumeration.models = parse_all::<ModelSpec>(&models)?;
        }
        if let Some(mode_sets) = raw.mode_sets {
            self.enumeration.mode_sets = mode_sets
                .iter()
                .map(|set| ModeSet::new(parse_all::<InferenceMode>(set)?))
                .collect::<Result<_, _>>()?;
        }
        if let Some(shape) = raw.shape {
            self.enumeration.shape = shape.parse()?;
        }
        if let Some(program) = raw.program {
            self.program = program;
        }
        if let Some(workdir) = raw.workdir {
            self.workdir = Some(PathBuf::from(workdir));
        }
        if let Some(on_error) = raw.on_error {
            self.on_error = on_error.parse()?;
        }
        if let Some(manifest) = raw.manifest {
            self.manifest = Some(PathBuf::from(manifest));
        }
        Ok(())
    }

    fn apply_overrides(&mut self, o: &Overrides) -> Result<(), ConfigError> {
        if !o.populations.is_empty() {
            self.enumeration.populations = PopulationSet::new(&o.populations)?;
        }
        if !o.models.is_empty() {
            self.enumeration.models = parse_all::<ModelSpec>(&o.models)?;
        }
        if !o.mode_sets.is_empty() {
            self.enumeration.mode_sets = parse_all::<ModeSet>(&o.mode_sets)?;
        }
        if let Some(shape) = &o.shape {
            self.enumeration.shape = shape.parse::<Shape>()?;
        }
        if !o.program.is_empty() {
            self.program = o.program.clone();
        }
        if o.workdir.is_some() {
            self.workdir = o.workdir.clone();
        }
        if o.halt_on_error {
            self.on_error = ErrorPolicy::Halt;
        }
        if o.manifest.is_some() {
            self.manifest = o.manifest.clone();
        }
        Ok(())
    }

    /// Format config for verbose display.
    pub fn display_summary(&self) -> String {
        let mut lines = Vec::new();

        match &self.source {
            Some(source) => lines.push(format!("   Config: {}", source.display())),
            None => lines.push("   Config: (defaults)".to_string()),
        }
        lines.push(format!("   Preset: {} ({})", self.preset, self.preset.description()));
        lines.push(format!("   Program: {}", self.program.join(" ")));
        lines.push(format!("   Populations: {}", self.enumeration.populations));

        let models: Vec<_> = self.enumeration.models.iter().map(|m| m.as_str()).collect();
        lines.push(format!("   Models: {}", models.join(", ")));

        let mode_sets: Vec<_> = self.enumeration.effective_mode_sets().iter().map(|m| m.to_string()).collect();
        lines.push(format!("   Mode sets: {}", mode_sets.join(" | ")));

        lines.push(format!("   Shape: {}", self.enumeration.shape));
        lines.push(format!("   On error: {}", self.on_error));

        if let Some(dir) = &self.workdir {
            lines.push(format!("   Workdir: {}", dir.display()));
        }
        if let Some(manifest) = &self.manifest {
            lines.push(format!("   Manifest: {}", manifest.display()));
        }

        lines.join("\n")
    }
}

fn parse_all<T>(items: &[String]) -> Result<Vec<T>, ConfigError>
where
    T: FromStr<Err = ConfigError>,
{
    items.iter().map(|s| s.trim().parse()).collect()
}
