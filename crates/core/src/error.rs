use crate::types::TrackId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Trajectory {track_id} has no samples")]
    EmptyTrajectory { track_id: TrackId },

    #[error("Knot budget of {budget} already reached")]
    KnotBudgetExceeded { budget: usize },

    #[error("Knot '{knot_id}' is a fixed endpoint and cannot be removed")]
    ProtectedKnot { knot_id: String },

    #[error("Knot not found: {knot_id}")]
    KnotNotFound { knot_id: String },

    #[error("Incomplete annotation for tracks {track_ids:?}")]
    IncompleteSubmission { track_ids: Vec<TrackId> },

    #[error("Invalid submission credential")]
    InvalidCredential,

    #[error("Trajectory {track_id} is finalized and read-only")]
    Finalized { track_id: TrackId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Errors the annotation view absorbs as a warning instead of
    /// propagating to the caller.
    pub fn is_recoverable_locally(&self) -> bool {
        matches!(
            self,
            Self::KnotBudgetExceeded { .. } | Self::ProtectedKnot { .. }
        )
    }
}
