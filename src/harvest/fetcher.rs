//! Single-item fetch worker
//!
//! This module handles one work item end to end:
//! - GET the resource through the shared client
//! - Classify the response
//! - Write image payloads under the storage root
//! - Report failures to the wave's [`FailureRecorder`]
//!
//! # Outcome Classification
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | Connection error, timeout, TLS failure | Failed(Network) |
//! | HTTP 403 / 429 | Failed(Status) |
//! | Any other status | Payload is kept |
//! | Body read error | Failed(BodyRead) |
//! | Destination is not an image | NotAPicture |
//! | File cannot be created | Failed(Create) |
//! | File cannot be written | Failed(Write) |
//!
//! Statuses other than 403 and 429 are not treated as failures, so an error
//! page body can end up stored under an image name. A partially written
//! file is left in place when a write fails.

use crate::harvest::{FailureRecorder, WorkItem};
use crate::paths::{sanitize, Layout};
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Why a work item ended up in the failure log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("request failed before a response arrived")]
    Network,

    #[error("refused with HTTP {0}")]
    Status(u16),

    #[error("response body could not be read")]
    BodyRead,

    #[error("destination file could not be created")]
    Create,

    #[error("destination file could not be written")]
    Write,
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Payload written to disk
    Saved {
        /// Where the payload was written
        path: PathBuf,
        /// Payload size
        bytes: usize,
    },

    /// Destination names no image; payload discarded, nothing recorded
    NotAPicture,

    /// Item recorded as a failure
    Failed(FailureKind),
}

impl FetchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Returns true for statuses that mark the item as failed
pub fn is_refusal(status: StatusCode) -> bool {
    matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS)
}

/// Fetches one work item and stores or records the result
///
/// Failures never escape this function: they are appended to `recorder`
/// and reflected in the returned outcome.
pub async fn fetch_item(
    client: &Client,
    layout: &Layout,
    recorder: &FailureRecorder,
    item: &WorkItem,
) -> FetchOutcome {
    let outcome = fetch_and_store(client, layout, item).await;

    match &outcome {
        FetchOutcome::Failed(kind) => {
            recorder.record(&item.resource, &item.destination);
            tracing::debug!(
                resource = %item.resource,
                destination = %item.destination,
                "Fetch failed: {}",
                kind
            );
        }
        FetchOutcome::Saved { path, bytes } => {
            tracing::trace!(
                resource = %item.resource,
                path = %path.display(),
                bytes,
                "Saved"
            );
        }
        FetchOutcome::NotAPicture => {
            tracing::trace!(
                destination = %item.destination,
                "Not an image destination, discarded"
            );
        }
    }

    outcome
}

async fn fetch_and_store(client: &Client, layout: &Layout, item: &WorkItem) -> FetchOutcome {
    let response = match client.get(&item.resource).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::trace!(resource = %item.resource, error = %e, "Request error");
            return FetchOutcome::Failed(FailureKind::Network);
        }
    };

    let status = response.status();
    if is_refusal(status) {
        return FetchOutcome::Failed(FailureKind::Status(status.as_u16()));
    }
    if !status.is_success() {
        tracing::debug!(
            resource = %item.resource,
            status = status.as_u16(),
            "Keeping payload of non-success response"
        );
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            tracing::trace!(resource = %item.resource, error = %e, "Body read error");
            return FetchOutcome::Failed(FailureKind::BodyRead);
        }
    };

    let Some(suffix) = sanitize(&item.destination).as_image() else {
        return FetchOutcome::NotAPicture;
    };
    let path = layout.image_path(suffix);

    let mut file = match tokio::fs::File::create(&path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("Failed to create {}: {}", path.display(), e);
            return FetchOutcome::Failed(FailureKind::Create);
        }
    };

    // flush() makes tokio surface errors from the background write
    let written = match file.write_all(&body).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        tracing::trace!(path = %path.display(), error = %e, "Write error");
        return FetchOutcome::Failed(FailureKind::Write);
    }

    FetchOutcome::Saved {
        path,
        bytes: body.len(),
    }
}
