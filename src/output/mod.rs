//! Output module for run logs and end-of-run reporting
//!
//! This module handles:
//! - Appending per-list completion lines to the run log
//! - Summarizing a whole range run

mod run_log;
mod summary;

pub use run_log::RunLog;
pub use summary::{print_summary, RunSummary};
