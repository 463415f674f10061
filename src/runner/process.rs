//! Runs the fit program as a child process.
//!
//! The configured program is a command prefix, so both of these work:
//!
//! ```toml
//! program = ["./fit_models"]
//! program = ["python", "fit_models.py"]
//! ```
//!
//! stdout and stderr are inherited: the fit program's own logging goes
//! straight to the terminal and is never parsed here.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::{Dispatch, Outcome};
use crate::error::{ConfigError, Result, SweepError};
use crate::types::InvocationRecord;

#[derive(Debug, Clone)]
pub struct ProcessDispatcher {
    program: Vec<String>,
    workdir: Option<PathBuf>,
}

impl ProcessDispatcher {
    pub fn new(program: Vec<String>, workdir: Option<PathBuf>) -> std::result::Result<Self, ConfigError> {
        if program.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(ConfigError::EmptyProgram);
        }
        Ok(Self { program, workdir })
    }

    pub fn program(&self) -> &[String] {
        &self.program
    }

    fn command(&self, record: &InvocationRecord) -> Command {
        let mut cmd = Command::new(&self.program[0]);
        cmd.args(&self.program[1..])
            .args(record.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl Dispatch for ProcessDispatcher {
    fn dispatch(&mut self, record: &InvocationRecord) -> Result<Outcome> {
        let status = self.command(record).status().map_err(|source| SweepError::Launch {
            program: self.program[0].clone(),
            source,
        })?;

        if status.success() {
            Ok(Outcome::Success)
        } else {
            Ok(Outcome::Failed { code: status.code() })
        }
    }

    fn describe(&self, record: &InvocationRecord) -> String {
        record.command_line(&self.program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModeSet, ModelSpec, Split};

    fn record() -> InvocationRecord {
        let split = Split {
            train: "pmen".into(),
            test_1: "cdc".into(),
            test_2: "maela".into(),
        };
        InvocationRecord::new(ModelSpec::RandomForest, &split, &ModeSet::none())
    }

    #[test]
    fn test_empty_program_rejected() {
        assert!(matches!(ProcessDispatcher::new(vec![], None), Err(ConfigError::EmptyProgram)));
        assert!(matches!(
            ProcessDispatcher::new(vec!["  ".to_string()], None),
            Err(ConfigError::EmptyProgram)
        ));
    }

    #[test]
    fn test_describe_includes_prefix() {
        let d = ProcessDispatcher::new(vec!["python".into(), "fit_models.py".into()], None).unwrap();
        assert!(d.describe(&record()).starts_with("python fit_models.py --model_type random_forest"));
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let mut d = ProcessDispatcher::new(vec!["pbpsweep-definitely-missing-binary".into()], None).unwrap();
        assert!(matches!(d.dispatch(&record()), Err(SweepError::Launch { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_maps_to_outcome() {
        let mut ok = ProcessDispatcher::new(vec!["true".into()], None).unwrap();
        assert_eq!(ok.dispatch(&record()).unwrap(), Outcome::Success);

        let mut failing = ProcessDispatcher::new(vec!["false".into()], None).unwrap();
        assert_eq!(failing.dispatch(&record()).unwrap(), Outcome::Failed { code: Some(1) });
    }

    #[cfg(unix)]
    #[test]
    fn test_arguments_reach_the_program() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("argv.txt");
        let script = format!("printf '%s\\n' \"$@\" > {}", out.display());

        // sh -c <script> <$0> <args...>
        let mut d = ProcessDispatcher::new(
            vec!["sh".into(), "-c".into(), script, "fit".into()],
            Some(dir.path().to_path_buf()),
        )
        .unwrap();
        assert!(d.dispatch(&record()).unwrap().is_success());

        let argv: Vec<String> = std::fs::read_to_string(&out).unwrap().lines().map(String::from).collect();
        assert_eq!(argv, record().to_args());
    }
}
