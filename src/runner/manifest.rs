//! JSON-lines log of a run.
//!
//! One line per invocation, flushed immediately, so a run that is killed
//! half-way still leaves a record of every call that finished.
//!
//! ```text
//! {"index":1,"timestamp":1760875200,"duration_secs":812.4,"record":{...},"outcome":{"status":"success"}}
//! ```

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use super::Outcome;
use crate::error::{Result, SweepError};
use crate::types::InvocationRecord;

#[derive(Debug, Serialize)]
pub struct ManifestEntry<'a> {
    /// 1-based position in the plan.
    pub index: usize,
    /// Unix timestamp (epoch seconds) when the call finished.
    pub timestamp: i64,
    pub duration_secs: f64,
    pub record: &'a InvocationRecord,
    pub outcome: &'a Outcome,
}

impl<'a> ManifestEntry<'a> {
    pub fn new(index: usize, record: &'a InvocationRecord, outcome: &'a Outcome, duration_secs: f64) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Self {
            index,
            timestamp,
            duration_secs,
            record,
            outcome,
        }
    }
}

#[derive(Debug)]
pub struct ManifestWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl ManifestWriter {
    /// Open `path` for appending, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        let io_err = |source| SweepError::Manifest {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;

        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, entry: &ManifestEntry<'_>) -> Result<()> {
        let line = serde_json::to_string(entry).map_err(|e| self.error(e.into()))?;
        writeln!(self.out, "{}", line).map_err(|e| self.error(e))?;
        self.out.flush().map_err(|e| self.error(e))
    }

    fn error(&self, source: std::io::Error) -> SweepError {
        SweepError::Manifest {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModeSet, ModelSpec, Split};

    fn record() -> InvocationRecord {
        let split = Split {
            train: "cdc".into(),
            test_1: "pmen".into(),
            test_2: "maela".into(),
        };
        InvocationRecord::new(ModelSpec::Dbscan, &split, &"just_HMM_scores".parse::<ModeSet>().unwrap())
    }

    #[test]
    fn test_manifest_lines_are_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs/manifest.jsonl");

        let mut writer = ManifestWriter::open(&path).unwrap();
        let record = record();
        writer.append(&ManifestEntry::new(1, &record, &Outcome::Success, 0.5)).unwrap();
        writer
            .append(&ManifestEntry::new(2, &record, &Outcome::Failed { code: Some(3) }, 0.25))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> =
            content.lines().map(|l| serde_json::from_str(l).unwrap()).collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["index"], 1);
        assert_eq!(lines[0]["outcome"]["status"], "success");
        assert_eq!(lines[0]["record"]["model_type"], "DBSCAN");
        assert_eq!(lines[0]["record"]["modes"][0], "just_HMM_scores");
        assert_eq!(lines[1]["outcome"]["status"], "failed");
        assert_eq!(lines[1]["outcome"]["code"], 3);
    }

    #[test]
    fn test_manifest_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.jsonl");
        let record = record();

        for i in 1..=2 {
            let mut writer = ManifestWriter::open(&path).unwrap();
            writer.append(&ManifestEntry::new(i, &record, &Outcome::Success, 0.0)).unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
