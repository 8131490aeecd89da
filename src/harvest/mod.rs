//! Harvest module: the concurrent fetch engine
//!
//! This module contains the core retrieval logic, including:
//! - Input list parsing
//! - The shared HTTP transport
//! - Per-item fetching and failure classification
//! - Failure recording and flushing
//! - Bounded-concurrency waves and the round-boundary stop heuristic

mod engine;
mod fetcher;
mod input;
mod pool;
mod recorder;
mod throttle;
mod transport;

pub use engine::{Engine, WaveReport};
pub use fetcher::{fetch_item, is_refusal, FailureKind, FetchOutcome};
pub use input::{read_input_list, InputList, WorkItem};
pub use pool::{DrainReport, WorkerPool};
pub use recorder::{FailureRecord, FailureRecorder};
pub use throttle::{RoundDecision, RoundThrottle};
pub use transport::{build_http_client, BROWSER_USER_AGENT};
