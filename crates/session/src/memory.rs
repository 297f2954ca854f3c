//! In-memory collaborators.
//!
//! Shared state sits behind `tokio::sync::RwLock` so the collaborators can
//! be handed around as `Arc<...>`.

use std::collections::{BTreeMap, HashMap};

use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use knotline_core::config::AnnotationConfig;
use knotline_core::credential::verify_submission_password;
use knotline_core::error::CoreError;
use knotline_core::submission::{flatten_submission, validate_submission, AnnotationSubmission, KnotAnnotationRow};
use knotline_core::trajectory::{group_by_track, parse_dataset, TrajectorySample};
use knotline_core::types::TrackId;

use crate::collaborators::{ProgressStore, SubmissionReceipt, SubmissionSink, TrajectorySource};
use crate::error::SessionError;

// ---------------------------------------------------------------------------
// Trajectory source
// ---------------------------------------------------------------------------

/// Trajectory source over a preloaded dataset.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrajectorySource {
    tracks: BTreeMap<TrackId, Vec<TrajectorySample>>,
}

impl InMemoryTrajectorySource {
    pub fn from_records(records: impl IntoIterator<Item = TrajectorySample>) -> Self {
        Self {
            tracks: group_by_track(records),
        }
    }

    /// Build from the dataset export JSON.
    pub fn from_dataset_json(json: &str) -> Result<Self, SessionError> {
        let records = parse_dataset(json)?;
        let source = Self::from_records(records);
        tracing::info!(tracks = source.tracks.len(), "Trajectory dataset loaded");
        Ok(source)
    }

    /// All known track ids, ascending.
    pub fn track_ids(&self) -> Vec<TrackId> {
        self.tracks.keys().copied().collect()
    }
}

impl TrajectorySource for InMemoryTrajectorySource {
    async fn fetch_samples(&self, track_id: TrackId) -> Result<Vec<TrajectorySample>, SessionError> {
        Ok(self.tracks.get(&track_id).cloned().unwrap_or_default())
    }

    async fn random_track_ids(&self, count: usize) -> Result<Vec<TrackId>, SessionError> {
        Ok(pick_random(self.track_ids(), count))
    }
}

fn pick_random(mut ids: Vec<TrackId>, count: usize) -> Vec<TrackId> {
    ids.shuffle(&mut rand::rng());
    ids.truncate(count);
    ids
}

// ---------------------------------------------------------------------------
// Submission sink
// ---------------------------------------------------------------------------

/// Submission sink that checks the password, validates the payload and keeps
/// the flattened rows.
#[derive(Debug)]
pub struct InMemorySubmissionSink {
    secret: String,
    rows: RwLock<Vec<KnotAnnotationRow>>,
}

impl InMemorySubmissionSink {
    /// `secret` is the plain or Argon2-hashed submission password.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Build from the configured `SUBMISSION_PASSWORD`.
    pub fn from_config(config: &AnnotationConfig) -> Result<Self, SessionError> {
        let secret = config.submission_password.as_deref().ok_or_else(|| {
            CoreError::Validation("SUBMISSION_PASSWORD must be set to accept submissions".to_string())
        })?;
        Ok(Self::new(secret))
    }

    pub async fn all_rows(&self) -> Vec<KnotAnnotationRow> {
        self.rows.read().await.clone()
    }

    pub async fn rows_for_session(&self, session_id: &str) -> Vec<KnotAnnotationRow> {
        self.rows
            .read()
            .await
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect()
    }

    pub async fn rows_for_track(&self, track_id: TrackId) -> Vec<KnotAnnotationRow> {
        self.rows
            .read()
            .await
            .iter()
            .filter(|r| r.track_id == track_id)
            .cloned()
            .collect()
    }
}

impl SubmissionSink for InMemorySubmissionSink {
    async fn submit(
        &self,
        submission: &AnnotationSubmission,
        password: &str,
    ) -> Result<SubmissionReceipt, SessionError> {
        if let Err(e) = verify_submission_password(password, &self.secret) {
            if matches!(e, CoreError::InvalidCredential) {
                tracing::warn!(session_id = %submission.session_id, "Submission rejected: invalid password");
            }
            return Err(e.into());
        }
        validate_submission(submission)?;

        let received_at = chrono::Utc::now();
        let new_rows = flatten_submission(submission, received_at);
        let rows_stored = new_rows.len();
        self.rows.write().await.extend(new_rows);

        tracing::info!(
            session_id = %submission.session_id,
            trajectories = submission.trajectories.len(),
            rows_stored,
            "Annotation submission stored",
        );
        Ok(SubmissionReceipt {
            session_id: submission.session_id.clone(),
            rows_stored,
            received_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Progress store
// ---------------------------------------------------------------------------

/// Key-value progress store keyed by username.
#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for InMemoryProgressStore {
    async fn load(&self, username: &str) -> Result<Option<String>, SessionError> {
        Ok(self.blobs.read().await.get(username).cloned())
    }

    async fn save(&self, username: &str, blob: String) -> Result<(), SessionError> {
        self.blobs.write().await.insert(username.to_string(), blob);
        Ok(())
    }

    async fn clear(&self, username: &str) -> Result<(), SessionError> {
        self.blobs.write().await.remove(username);
        Ok(())
    }
}
