//! End-of-run summary

use crate::harvest::WaveReport;

/// Aggregate counts over a range run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Waves that read their list and drained
    pub waves_completed: usize,

    /// Waves skipped because their list could not be read
    pub waves_skipped: usize,

    /// Work items launched across all waves
    pub items: usize,

    /// Failures across all waves
    pub failures: usize,

    /// Waves whose failure log could not be written
    pub flush_errors: usize,

    /// Worker panics across all waves
    pub panicked: usize,

    /// Stem of the wave after which the stop heuristic ended the run
    pub stopped_after: Option<String>,
}

impl RunSummary {
    /// Folds one completed wave into the totals
    pub fn record(&mut self, report: &WaveReport) {
        self.waves_completed += 1;
        self.items += report.items;
        self.failures += report.failures;
        self.panicked += report.panicked;
        if report.flush_error.is_some() {
            self.flush_errors += 1;
        }
    }
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Wave-Harvest Summary ===\n");
    println!("Waves completed: {}", summary.waves_completed);
    println!("Waves skipped:   {}", summary.waves_skipped);
    println!("Items fetched:   {}", summary.items);
    println!("Failures:        {}", summary.failures);

    if summary.flush_errors > 0 {
        println!("Failure logs not written: {}", summary.flush_errors);
    }
    if summary.panicked > 0 {
        println!("Worker panics: {}", summary.panicked);
    }

    match &summary.stopped_after {
        Some(stem) => println!("\nStopped after {}: waves finished too close together", stem),
        None => println!("\nRange completed"),
    }
}
