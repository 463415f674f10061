//! pbpsweep CLI - population split sweeps
//!
//! Resolves a sweep configuration, expands it into a plan, and either prints
//! the plan (`--dry-run`) or runs the fit program once per planned call.
//!
//! Design philosophy:
//! - Fail fast on configuration, before the first (possibly hours-long) fit
//! - One call at a time; the fit program owns the machine while it runs
//! - Logs go to stderr, plans go to stdout

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::info;

use pbpsweep::config::{Config, Overrides};
use pbpsweep::enumerate::{plan, Preset};
use pbpsweep::rendering::{render_halt, render_json, render_listing, render_report, Colorizer};
use pbpsweep::runner::{run, ManifestWriter, ProcessDispatcher, RunOptions};
use pbpsweep::SweepError;

/// Train on one population, test on the other two, for every model
///
/// Every population takes a turn as the training set. The remaining two are
/// passed as test sets in both orders, so each (population, model, mode set)
/// produces two calls of the fit program.
///
/// Examples:
///   pbpsweep --dry-run                         # Show the 24-call full grid
///   pbpsweep --preset rf-hmm                   # RF with HMM inference flags
///   pbpsweep -m random_forest -m lasso         # Restrict models
///   pbpsweep --modes none --modes blosum_inference
///   pbpsweep --program ./fit --halt-on-error
#[derive(Parser, Debug)]
#[command(name = "pbpsweep")]
#[command(version)]
#[command(about, long_about = None)]
pub struct Cli {
    /// Starting preset: full-grid or rf-hmm
    #[arg(short, long)]
    pub preset: Option<Preset>,

    /// Config file (skips pbpsweep.toml / pyproject.toml discovery)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Fit program command; repeat for each word (--program python --program fit_models.py)
    #[arg(long, value_name = "CMD")]
    pub program: Vec<String>,

    /// Working directory for the fit program
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Population names, exactly three, in iteration order
    #[arg(long = "population", value_name = "NAME")]
    pub populations: Vec<String>,

    /// Model types to run (repeatable)
    #[arg(short, long = "model", value_name = "NAME")]
    pub models: Vec<String>,

    /// Inference mode set, comma-separated; `none` for no flags (repeatable)
    ///
    /// Each set repeats both test orders:
    ///   --modes none --modes HMM_inference,HMM_MIC_inference
    #[arg(long = "modes", value_name = "FLAGS")]
    pub mode_sets: Vec<String>,

    /// Loop nesting: models-within-populations or populations-within-models
    #[arg(long)]
    pub shape: Option<String>,

    /// Stop at the first failed call instead of moving on
    #[arg(long)]
    pub halt_on_error: bool,

    /// Append one JSON line per call to this file
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Print the plan without running anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// With --dry-run, print the plan as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Directory to search for configuration
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Verbose output (debug logging and config summary)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_path: self.config.clone(),
            preset: self.preset,
            populations: self.populations.clone(),
            models: self.models.clone(),
            mode_sets: self.mode_sets.clone(),
            shape: self.shape.clone(),
            program: self.program.clone(),
            workdir: self.workdir.clone(),
            halt_on_error: self.halt_on_error,
            manifest: self.manifest.clone(),
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "pbpsweep=debug" } else { "pbpsweep=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let color = Colorizer::new(!cli.no_color);
    let config = Config::load(&cli.root, &cli.overrides()).context("Invalid sweep configuration")?;

    if cli.verbose {
        eprintln!("pbpsweep v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("{}", config.display_summary());
    }

    let sweep = plan(&config.enumeration).context("Invalid sweep configuration")?;

    if cli.dry_run {
        if cli.json {
            println!("{}", render_json(sweep)?);
        } else {
            print!("{}", render_listing(sweep, &config.program, color));
        }
        return Ok(());
    }

    let mut dispatcher = ProcessDispatcher::new(config.program.clone(), config.workdir.clone())
        .context("Invalid fit program")?;

    let manifest = match &config.manifest {
        Some(path) => Some(ManifestWriter::open(path)?),
        None => None,
    };
    if let Some(writer) = &manifest {
        info!(path = %writer.path().display(), "writing manifest");
    }

    if !cli.no_color {
        eprintln!("{}", format!(" PBPSWEEP {} ", config.preset).bold().on_magenta());
    }

    let options = RunOptions {
        policy: config.on_error,
        manifest,
    };
    match run(sweep, &mut dispatcher, options) {
        Ok(report) => {
            eprintln!("{}", render_report(&report, color));
            Ok(())
        }
        Err(SweepError::Halted {
            index,
            command,
            outcome,
            report,
        }) => {
            eprintln!("{}", render_halt(index, &command, &outcome, color));
            eprintln!("{}", render_report(&report, color));
            anyhow::bail!("halted after invocation #{} ({})", index, outcome)
        }
        Err(e) => Err(e.into()),
    }
}
