//! Failure recording
//!
//! Fetch workers append failed items here; once a wave drains, the recorder
//! is flushed to that wave's failure log and cleared. Failure logs use the
//! same `<resource> <destination>` format as input lists, so they can be fed
//! back in as input later.

use crate::HarvestError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A (resource, destination) pair that could not be harvested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub resource: String,
    pub destination: String,
}

/// Thread-safe append list of failures for the current wave
#[derive(Debug, Default)]
pub struct FailureRecorder {
    records: Mutex<Vec<FailureRecord>>,
}

impl FailureRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a failure
    ///
    /// The lock is held only for the push.
    pub fn record(&self, resource: &str, destination: &str) {
        self.lock().push(FailureRecord {
            resource: resource.to_string(),
            destination: destination.to_string(),
        });
    }

    /// Number of failures recorded since the last flush
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Writes every pending failure to `path`, one per line, and clears the list
    ///
    /// The file is truncated first, so flushing an empty recorder leaves an
    /// empty log. The lock is held for the whole flush; a record arriving
    /// concurrently lands either in this file or in the next flush, never in
    /// both.
    ///
    /// Pending records are drained even when the write fails; each one is
    /// then logged at warn level.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of records written
    /// * `Err(HarvestError::FailureLog)` - The log could not be opened or written
    pub fn flush(&self, path: &Path) -> Result<usize, HarvestError> {
        let mut records = self.lock();
        let pending = std::mem::take(&mut *records);

        match write_records(path, &pending) {
            Ok(()) => Ok(pending.len()),
            Err(source) => {
                for record in &pending {
                    tracing::warn!(
                        resource = %record.resource,
                        destination = %record.destination,
                        "Unwritten failure record"
                    );
                }
                Err(HarvestError::FailureLog {
                    path: path.to_path_buf(),
                    dropped: pending.len(),
                    source,
                })
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FailureRecord>> {
        // A worker panicking mid-push cannot leave the Vec inconsistent
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn write_records(path: &Path, records: &[FailureRecord]) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for record in records {
        writeln!(out, "{} {}", record.resource, record.destination)?;
    }
    out.flush()
}
