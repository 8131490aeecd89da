//! Wave orchestration
//!
//! The [`Engine`] owns everything a run shares across waves: the HTTP
//! client, the worker pool, the failure recorder, and the stop heuristic.
//! One wave processes one input list:
//!
//! 1. Read the whole list into memory, skipping malformed lines
//! 2. Launch one fetch per item, bounded by the worker pool
//! 3. Wait until every fetch has finished
//! 4. Flush recorded failures to the list's failure log
//! 5. Ask the stop heuristic whether the run should go on
//!
//! Waves never overlap: a later list's fetches start only after the
//! previous wave fully drained.

use crate::config::{Config, NamingConfig};
use crate::harvest::fetcher::fetch_item;
use crate::harvest::input::{read_input_list, WorkItem};
use crate::harvest::pool::WorkerPool;
use crate::harvest::recorder::FailureRecorder;
use crate::harvest::throttle::{RoundDecision, RoundThrottle};
use crate::harvest::transport::build_http_client;
use crate::output::{RunLog, RunSummary};
use crate::paths::Layout;
use crate::range::{list_stem, IndexRange};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What happened during one wave
#[derive(Debug)]
pub struct WaveReport {
    /// Input list stem
    pub stem: String,

    /// Lines read from the input list
    pub lines: usize,

    /// Work items launched
    pub items: usize,

    /// Lines that produced no work item
    pub skipped_lines: usize,

    /// Failures flushed (or, if the flush failed, dropped)
    pub failures: usize,

    /// Workers that panicked
    pub panicked: usize,

    /// Failure log written for this wave
    pub failure_log: PathBuf,

    /// Set when the failure log could not be written
    pub flush_error: Option<HarvestError>,

    /// Wall-clock end of the wave
    pub finished_at: DateTime<Utc>,

    /// Duration from reading the list to the end of the flush
    pub elapsed: Duration,

    /// Stop heuristic verdict
    pub decision: RoundDecision,
}

/// Concurrent fetch engine
pub struct Engine {
    client: Client,
    layout: Arc<Layout>,
    pool: WorkerPool,
    recorder: Arc<FailureRecorder>,
    throttle: RoundThrottle,
    naming: NamingConfig,
}

impl Engine {
    /// Creates an engine, building the shared HTTP client
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built, most notably for an
    /// unusable proxy URL. This is fatal: no wave has run yet.
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.fetch, &config.proxy)?;
        Ok(Self::with_client(config, client))
    }

    /// Creates an engine around an existing client
    pub fn with_client(config: &Config, client: Client) -> Self {
        Self {
            client,
            layout: Arc::new(Layout::new(&config.paths)),
            pool: WorkerPool::new(config.fetch.max_concurrent),
            recorder: Arc::new(FailureRecorder::new()),
            throttle: RoundThrottle::new(config.throttle.min_round_interval()),
            naming: config.naming.clone(),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn recorder(&self) -> &FailureRecorder {
        &self.recorder
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Runs one wave over the input list named by `stem`
    ///
    /// The failure log directory must already exist (see
    /// [`Layout::provision`]).
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::InputUnreadable`] when the list cannot be
    /// read; nothing is fetched or flushed and the stop heuristic is not
    /// consulted. Per-item failures never surface here, and a failed flush
    /// is reported on [`WaveReport::flush_error`] instead.
    pub async fn run_wave(&mut self, stem: &str) -> Result<WaveReport, HarvestError> {
        let started = Instant::now();
        let input_path = self.layout.input_file(stem);
        tracing::info!("Starting wave {}", stem);

        let list = read_input_list(&input_path).await?;
        let lines = list.lines;
        let skipped_lines = list.skipped();
        let items = list.items.len();
        tracing::info!(
            lines,
            items,
            skipped_lines,
            "Read {} in {:?}",
            input_path.display(),
            started.elapsed()
        );

        let client = self.client.clone();
        let layout = Arc::clone(&self.layout);
        let recorder = Arc::clone(&self.recorder);
        let drained = self
            .pool
            .run_to_completion(list.items, move |item: WorkItem| {
                let client = client.clone();
                let layout = Arc::clone(&layout);
                let recorder = Arc::clone(&recorder);
                async move {
                    fetch_item(&client, &layout, &recorder, &item).await;
                }
            })
            .await?;

        // Every worker has finished, so nothing can record during the flush
        let failures = self.recorder.len();
        let failure_log = self.layout.failure_file(stem);
        let flushed = {
            let recorder = Arc::clone(&self.recorder);
            let path = failure_log.clone();
            tokio::task::spawn_blocking(move || recorder.flush(&path))
                .await
                .map_err(HarvestError::from)
                .and_then(|written| written)
        };
        let flush_error = match flushed {
            Ok(written) => {
                tracing::info!("{}: {} failure records written", stem, written);
                None
            }
            Err(e) => {
                tracing::error!("{}: {}", stem, e);
                Some(e)
            }
        };

        let finished_at = Utc::now();
        let elapsed = started.elapsed();
        let decision = self.throttle.observe(finished_at);
        tracing::info!(
            failures,
            panicked = drained.panicked,
            "Wave {} finished at {} after {:?}",
            stem,
            finished_at.to_rfc3339(),
            elapsed
        );

        Ok(WaveReport {
            stem: stem.to_string(),
            lines,
            items: drained.launched,
            skipped_lines,
            failures,
            panicked: drained.panicked,
            failure_log,
            flush_error,
            finished_at,
            elapsed,
            decision,
        })
    }

    /// Runs a wave for every index of `range`, in order
    ///
    /// For each index this provisions the output directories, runs the wave,
    /// and appends a line to the run log. Unreadable input lists are skipped.
    /// The loop ends early when the stop heuristic fires.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Provision`] if an output directory cannot be
    /// created, and [`HarvestError::PoolClosed`] if the worker pool broke.
    pub async fn run_range(&mut self, range: IndexRange) -> Result<RunSummary, HarvestError> {
        let run_log = RunLog::new(self.layout.run_log_file(range.start, range.end));
        let mut summary = RunSummary::default();

        for index in range.iter() {
            let stem = list_stem(&self.naming, index);
            self.layout.provision(&stem)?;

            let report = match self.run_wave(&stem).await {
                Ok(report) => report,
                Err(e @ HarvestError::InputUnreadable { .. }) => {
                    tracing::warn!("Skipping {}: {}", stem, e);
                    summary.waves_skipped += 1;
                    if let Err(log_err) = run_log.append_skipped(&stem, &e.to_string()) {
                        tracing::warn!("{}", log_err);
                    }
                    continue;
                }
                Err(e) => return Err(e),
            };

            summary.record(&report);
            if let Err(log_err) = run_log.append_completed(&stem, report.failures) {
                tracing::warn!("{}", log_err);
            }

            if let RoundDecision::Stop { since_previous } = report.decision {
                tracing::warn!(
                    "Wave {} ended {:?} after the previous one (minimum {:?}); stopping",
                    stem,
                    since_previous,
                    self.throttle.min_interval()
                );
                summary.stopped_after = Some(stem);
                break;
            }
        }

        Ok(summary)
    }
}
