//! Seams to the collaborators outside this crate.
//!
//! Storage, authentication and transport are not implemented here; callers
//! plug in whatever backs them. [`crate::memory`] provides in-memory
//! versions.

use std::future::Future;

use serde::{Deserialize, Serialize};

use knotline_core::submission::AnnotationSubmission;
use knotline_core::trajectory::TrajectorySample;
use knotline_core::types::{Timestamp, TrackId};

use crate::error::SessionError;

/// Provides trajectory samples by track.
pub trait TrajectorySource: Send + Sync {
    /// Samples of `track_id`. An unknown track yields an empty list.
    fn fetch_samples(
        &self,
        track_id: TrackId,
    ) -> impl Future<Output = Result<Vec<TrajectorySample>, SessionError>> + Send;

    /// Up to `count` distinct track ids picked at random.
    fn random_track_ids(
        &self,
        count: usize,
    ) -> impl Future<Output = Result<Vec<TrackId>, SessionError>> + Send;
}

/// What the sink reports back for an accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub session_id: String,
    pub rows_stored: usize,
    pub received_at: Timestamp,
}

/// Accepts finished annotation batches.
pub trait SubmissionSink: Send + Sync {
    /// Store `submission` if `password` is accepted.
    ///
    /// A rejected password surfaces as
    /// `SessionError::Core(CoreError::InvalidCredential)`.
    fn submit(
        &self,
        submission: &AnnotationSubmission,
        password: &str,
    ) -> impl Future<Output = Result<SubmissionReceipt, SessionError>> + Send;
}

/// Opaque per-user progress blob storage.
pub trait ProgressStore: Send + Sync {
    fn load(&self, username: &str) -> impl Future<Output = Result<Option<String>, SessionError>> + Send;

    fn save(&self, username: &str, blob: String) -> impl Future<Output = Result<(), SessionError>> + Send;

    fn clear(&self, username: &str) -> impl Future<Output = Result<(), SessionError>> + Send;
}
