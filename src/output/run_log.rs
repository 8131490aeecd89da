//! Run log
//!
//! One plain-text file per `start..=end` invocation, with a timestamped line
//! per input list, so an operator can see which lists a run got through.

use crate::HarvestError;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only log of processed input lists
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records that the wave over `stem` completed
    pub fn append_completed(&self, stem: &str, failures: usize) -> Result<(), HarvestError> {
        self.append_line(
            Utc::now(),
            &format!("completed {} ({} failures)", stem, failures),
        )
    }

    /// Records that the wave over `stem` was skipped
    pub fn append_skipped(&self, stem: &str, reason: &str) -> Result<(), HarvestError> {
        self.append_line(Utc::now(), &format!("skipped {}: {}", stem, reason))
    }

    fn append_line(&self, at: DateTime<Utc>, message: &str) -> Result<(), HarvestError> {
        let to_error = |source| HarvestError::RunLog {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_error)?;
        writeln!(
            file,
            "{} {}",
            at.to_rfc3339_opts(SecondsFormat::Secs, true),
            message
        )
        .map_err(to_error)
    }
}
