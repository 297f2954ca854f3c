use knotline_core::error::CoreError;
use knotline_core::types::TrackId;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("Session has already been submitted")]
    AlreadySubmitted,

    #[error("No trajectories could be loaded")]
    NoTrajectories,

    #[error("Track {0} is not part of this session")]
    UnknownTrack(TrackId),

    #[error("Trajectory index {index} is out of range ({len} loaded)")]
    IndexOutOfRange { index: usize, len: usize },
}

impl SessionError {
    /// True when the sink rejected the submission password.
    pub fn is_invalid_credential(&self) -> bool {
        matches!(self, Self::Core(CoreError::InvalidCredential))
    }
}
