//! On-disk layout of a harvest run
//!
//! Every input list is identified by its stem (e.g. `train-00001-of-03550`):
//!
//! | Artifact | Location |
//! |----------|----------|
//! | Input list | `<urls-path>/<stem>.txt` |
//! | Failure log | `<fail-path>/<stem>.txt` |
//! | Images | `<storage-path>/<sanitized destination>` |
//! | Run log | `<log-path>/log-<start>-<end>.txt` |

use crate::config::PathsConfig;
use crate::HarvestError;
use std::path::{Component, Path, PathBuf};

const LIST_EXTENSION: &str = "txt";

/// Resolves every path the harvest touches
#[derive(Debug, Clone)]
pub struct Layout {
    urls: PathBuf,
    fail: PathBuf,
    storage: PathBuf,
    log: PathBuf,
}

impl Layout {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            urls: paths.urls_path.clone(),
            fail: paths.fail_path.clone(),
            storage: paths.storage_path.clone(),
            log: paths.log_path.clone(),
        }
    }

    /// Input list for `stem`
    pub fn input_file(&self, stem: &str) -> PathBuf {
        self.urls.join(format!("{}.{}", stem, LIST_EXTENSION))
    }

    /// Failure log for `stem`
    pub fn failure_file(&self, stem: &str) -> PathBuf {
        self.fail.join(format!("{}.{}", stem, LIST_EXTENSION))
    }

    /// Directory conventionally holding the images of `stem`
    pub fn storage_dir(&self, stem: &str) -> PathBuf {
        self.storage.join(stem)
    }

    /// Where an image with the given sanitized destination is written
    ///
    /// Only plain name segments are kept: root, `.` and `..` components are
    /// dropped, so the result always lies under the storage root.
    pub fn image_path(&self, sanitized: &str) -> PathBuf {
        let relative = Path::new(sanitized.trim_start_matches(['/', '\\'].as_slice()));

        let mut path = self.storage.clone();
        for component in relative.components() {
            if let Component::Normal(segment) = component {
                path.push(segment);
            }
        }
        path
    }

    /// Run log shared by every wave of one `start..=end` invocation
    pub fn run_log_file(&self, start: u32, end: u32) -> PathBuf {
        self.log.join(format!("log-{}-{}.txt", start, end))
    }

    /// Creates the directories a wave over `stem` writes into
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Provision`] naming the first directory that
    /// could not be created.
    pub fn provision(&self, stem: &str) -> Result<(), HarvestError> {
        for dir in [self.storage_dir(stem), self.fail.clone(), self.log.clone()] {
            std::fs::create_dir_all(&dir)
                .map_err(|source| HarvestError::Provision { path: dir, source })?;
        }
        Ok(())
    }
}
