//! The annotation session: one user's batch of trajectories from load to
//! submission.
//!
//! ```text
//! Editing --submit--> Submitting --ok--> Submitted
//!    ^                    |
//!    +------failure-------+
//! ```
//!
//! Every edit and `submit` take `&mut self`, so no edit can interleave with
//! a submission in flight. The state is still recorded so a cancelled
//! submit future is visible to the caller.

use std::collections::HashSet;

use serde::Serialize;

use knotline_core::config::AnnotationConfig;
use knotline_core::error::CoreError;
use knotline_core::knots::{validate_knot_budget, Knot, TrajectoryWithKnots};
use knotline_core::progress::SessionProgress;
use knotline_core::submission::collect_submission;
use knotline_core::types::TrackId;
use knotline_core::viewport::Viewport;

use crate::collaborators::{ProgressStore, SubmissionReceipt, SubmissionSink, TrajectorySource};
use crate::error::SessionError;
use crate::render::{render_trajectory, RenderedTrajectory, View};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Editing,
    Submitting,
    Submitted,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Submitting => "submitting",
            Self::Submitted => "submitted",
        }
    }
}

/// Result of a knot edit on the current trajectory.
///
/// Budget and endpoint violations are not errors for the caller: the edit
/// is dropped and the UI shows `warning`.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome<T> {
    Applied(T),
    Rejected { warning: String },
}

impl<T> EditOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(v) => Some(v),
            Self::Rejected { .. } => None,
        }
    }
}

/// Which requested tracks made it into the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub loaded: Vec<TrackId>,
    /// Tracks with no samples.
    pub skipped: Vec<TrackId>,
}

// ---------------------------------------------------------------------------
// AnnotationSession
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AnnotationSession {
    session_id: String,
    username: String,
    config: AnnotationConfig,
    trajectories: Vec<TrajectoryWithKnots>,
    current_index: usize,
    state: SessionState,
}

impl AnnotationSession {
    fn new(
        username: &str,
        config: AnnotationConfig,
        trajectories: Vec<TrajectoryWithKnots>,
        current_index: usize,
    ) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            config,
            trajectories,
            current_index,
            state: SessionState::Editing,
        }
    }

    /// Load `track_ids` from `source` into a fresh session.
    ///
    /// Repeated ids load once, at their first position. Tracks without
    /// samples are skipped and reported; the rest still load. Fails with
    /// [`SessionError::NoTrajectories`] if nothing loads.
    pub async fn load<S: TrajectorySource>(
        source: &S,
        config: AnnotationConfig,
        username: &str,
        track_ids: &[TrackId],
    ) -> Result<(Self, LoadReport), SessionError> {
        let mut trajectories = Vec::with_capacity(track_ids.len());
        let mut report = LoadReport::default();
        let mut seen = HashSet::with_capacity(track_ids.len());

        for &track_id in track_ids {
            if !seen.insert(track_id) {
                tracing::warn!(track_id, "Ignoring repeated track id");
                continue;
            }
            let samples = source.fetch_samples(track_id).await?;
            match TrajectoryWithKnots::load(track_id, samples, config.default_knot_budget) {
                Ok(t) => {
                    report.loaded.push(track_id);
                    trajectories.push(t);
                }
                Err(CoreError::EmptyTrajectory { .. }) => {
                    tracing::warn!(track_id, "Skipping trajectory without samples");
                    report.skipped.push(track_id);
                }
                Err(e) => return Err(e.into()),
            }
        }

        if trajectories.is_empty() {
            return Err(SessionError::NoTrajectories);
        }

        let session = Self::new(username, config, trajectories, 0);
        tracing::info!(
            session_id = %session.session_id,
            username,
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            "Annotation session loaded",
        );
        Ok((session, report))
    }

    /// Load `count` tracks picked at random by the source.
    pub async fn load_random<S: TrajectorySource>(
        source: &S,
        config: AnnotationConfig,
        username: &str,
        count: usize,
    ) -> Result<(Self, LoadReport), SessionError> {
        let track_ids = source.random_track_ids(count).await?;
        Self::load(source, config, username, &track_ids).await
    }

    /// Resume from the progress saved for `username`, if any.
    ///
    /// The resumed session gets a new session id.
    pub async fn resume<P: ProgressStore>(
        store: &P,
        config: AnnotationConfig,
        username: &str,
    ) -> Result<Option<Self>, SessionError> {
        let Some(blob) = store.load(username).await? else {
            return Ok(None);
        };
        let (trajectories, current_index) = SessionProgress::from_blob(&blob)?.restore()?;
        let session = Self::new(username, config, trajectories, current_index);
        tracing::info!(
            session_id = %session.session_id,
            username,
            trajectories = session.trajectories.len(),
            completed = session.completed_count(),
            "Annotation session resumed",
        );
        Ok(Some(session))
    }

    // -- accessors -----------------------------------------------------------

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn config(&self) -> &AnnotationConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn trajectories(&self) -> &[TrajectoryWithKnots] {
        &self.trajectories
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> &TrajectoryWithKnots {
        &self.trajectories[self.current_index]
    }

    pub fn completed_count(&self) -> usize {
        self.trajectories.iter().filter(|t| t.is_complete()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.completed_count() == self.trajectories.len()
    }

    // -- navigation ----------------------------------------------------------

    /// Move to the next trajectory. Returns false at the last one.
    pub fn next(&mut self) -> bool {
        if self.current_index + 1 < self.trajectories.len() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous trajectory. Returns false at the first one.
    pub fn previous(&mut self) -> bool {
        if self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }

    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.trajectories.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.trajectories.len(),
            });
        }
        self.current_index = index;
        Ok(())
    }

    pub fn go_to_track(&mut self, track_id: TrackId) -> Result<(), SessionError> {
        let index = self
            .trajectories
            .iter()
            .position(|t| t.track_id() == track_id)
            .ok_or(SessionError::UnknownTrack(track_id))?;
        self.current_index = index;
        Ok(())
    }

    // -- edits ---------------------------------------------------------------

    /// Place a Manual knot on the current trajectory at data coordinates.
    pub fn place_knot(&mut self, x: f64, y: f64) -> Result<EditOutcome<Knot>, SessionError> {
        self.edit(|t| t.place_knot(x, y))
    }

    /// Place a Manual knot from a canvas click.
    pub fn place_knot_at_pixel(&mut self, px: f64, py: f64) -> Result<EditOutcome<Knot>, SessionError> {
        self.ensure_editing()?;
        let viewport = Viewport::fit(self.current().samples(), self.config.canvas)?;
        let (x, y) = viewport.to_data(px, py);
        self.place_knot(x, y)
    }

    pub fn remove_knot(&mut self, knot_id: &str) -> Result<EditOutcome<Knot>, SessionError> {
        self.edit(|t| t.remove_knot(knot_id))
    }

    /// Remove the newest Manual knot of the current trajectory.
    pub fn undo_last_knot(&mut self) -> Result<EditOutcome<Option<Knot>>, SessionError> {
        self.edit(|t| t.remove_last_placed())
    }

    /// Change the current trajectory's budget. `budget` must be one of the
    /// configured allowed budgets. Returns the knots dropped by truncation.
    pub fn set_knot_budget(&mut self, budget: usize) -> Result<EditOutcome<Vec<Knot>>, SessionError> {
        self.ensure_editing()?;
        validate_knot_budget(budget, &self.config.allowed_knot_budgets)?;
        self.edit(|t| t.set_knot_budget(budget))
    }

    fn edit<T, F>(&mut self, op: F) -> Result<EditOutcome<T>, SessionError>
    where
        F: FnOnce(&mut TrajectoryWithKnots) -> Result<T, CoreError>,
    {
        self.ensure_editing()?;
        let trajectory = &mut self.trajectories[self.current_index];
        match op(&mut *trajectory) {
            Ok(value) => Ok(EditOutcome::Applied(value)),
            Err(e) if e.is_recoverable_locally() => {
                tracing::warn!(track_id = trajectory.track_id(), error = %e, "Knot edit rejected");
                Ok(EditOutcome::Rejected {
                    warning: e.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn ensure_editing(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Editing => Ok(()),
            SessionState::Submitting => Err(SessionError::SubmissionInFlight),
            SessionState::Submitted => Err(SessionError::AlreadySubmitted),
        }
    }

    // -- drawing -------------------------------------------------------------

    /// Lay out the current trajectory for `view`.
    pub fn render(&self, view: View) -> Result<RenderedTrajectory, SessionError> {
        let strategy = match view {
            View::Live => self.config.live_ordering,
            View::Review => self.config.review_ordering,
        };
        let rendered = render_trajectory(self.current(), strategy, self.config.canvas)?;
        tracing::debug!(
            track_id = rendered.track_id,
            strategy = strategy.as_str(),
            knots = rendered.knots.len(),
            "Trajectory rendered",
        );
        Ok(rendered)
    }

    // -- persistence ---------------------------------------------------------

    /// Store the session's progress under its username.
    pub async fn save_progress<P: ProgressStore>(&self, store: &P) -> Result<(), SessionError> {
        self.ensure_editing()?;
        let progress = SessionProgress::capture(&self.trajectories, self.current_index, chrono::Utc::now());
        let blob = progress.to_blob()?;
        store.save(&self.username, blob).await?;
        tracing::info!(
            username = %self.username,
            completed = progress.completed_count,
            total = self.trajectories.len(),
            "Annotation progress saved",
        );
        Ok(())
    }

    // -- submission ----------------------------------------------------------

    /// Submit every trajectory.
    ///
    /// Incomplete trajectories are reported without contacting the sink. A
    /// sink failure (including a rejected password) returns the session to
    /// `Editing` with all knots intact. On success every trajectory becomes
    /// read-only and the saved progress is discarded.
    pub async fn submit<K, P>(
        &mut self,
        sink: &K,
        store: &P,
        password: &str,
    ) -> Result<SubmissionReceipt, SessionError>
    where
        K: SubmissionSink,
        P: ProgressStore,
    {
        self.ensure_editing()?;
        let submission = collect_submission(&self.session_id, &self.trajectories).inspect_err(|e| {
            tracing::warn!(session_id = %self.session_id, error = %e, "Submission blocked");
        })?;

        self.state = SessionState::Submitting;
        tracing::info!(
            session_id = %self.session_id,
            trajectories = submission.trajectories.len(),
            "Submitting annotations",
        );

        let receipt = match sink.submit(&submission, password).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.state = SessionState::Editing;
                tracing::warn!(session_id = %self.session_id, error = %e, "Submission failed, session kept");
                return Err(e);
            }
        };

        for t in &mut self.trajectories {
            t.finalize();
        }
        self.state = SessionState::Submitted;

        if let Err(e) = store.clear(&self.username).await {
            tracing::warn!(username = %self.username, error = %e, "Failed to discard saved progress");
        }
        tracing::info!(
            session_id = %self.session_id,
            rows_stored = receipt.rows_stored,
            "Annotations submitted",
        );
        Ok(receipt)
    }

    /// Return to `Editing` after a submit future was dropped mid-flight.
    ///
    /// Only valid while `Submitting`.
    pub fn abandon_submission(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Submitting => {
                tracing::warn!(session_id = %self.session_id, "In-flight submission abandoned");
                self.state = SessionState::Editing;
                Ok(())
            }
            SessionState::Editing => Err(SessionError::Core(CoreError::Validation(
                "no submission is in flight".to_string(),
            ))),
            SessionState::Submitted => Err(SessionError::AlreadySubmitted),
        }
    }
}
