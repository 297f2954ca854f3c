//! `knotline-session` -- the annotation state machine.
//!
//! Drives [`knotline_core`] from UI events and talks to the external
//! collaborators through the traits in [`collaborators`]:
//!
//! - [`AnnotationSession`] -- loaded trajectories, navigation, knot edits,
//!   redraws, progress saving and submission.
//! - [`render`] -- view model for one redraw (pixel polyline + ordered knots).
//! - [`memory`] -- in-memory collaborators for tests and local runs.

pub mod collaborators;
pub mod error;
pub mod memory;
pub mod render;
pub mod session;

pub use collaborators::{ProgressStore, SubmissionReceipt, SubmissionSink, TrajectorySource};
pub use error::SessionError;
pub use memory::{InMemoryProgressStore, InMemorySubmissionSink, InMemoryTrajectorySource};
pub use render::{RenderedKnot, RenderedTrajectory, View};
pub use session::{AnnotationSession, EditOutcome, LoadReport, SessionState};
