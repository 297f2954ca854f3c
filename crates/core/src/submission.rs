//! Submission wire format and the collector that builds it.
//!
//! The collector lists each trajectory's knots as Manual knots by ascending
//! placement rank, then Start, then End, and numbers them 1-based
//! (`relativeOrder`). This is not the draw order of the resolver. Review
//! tooling re-derives its own display order from the raw `(x, y)` pairs and
//! never reads `relativeOrder` for that purpose.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::knots::{Knot, KnotKind, TrajectoryWithKnots, ENDPOINT_KNOT_COUNT};
use crate::resolver::Planar;
use crate::types::{Timestamp, TrackId};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One knot in a submitted trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnotRecord {
    pub x: f64,
    pub y: f64,
    /// 1-based position in the Manual, Start, End listing.
    pub relative_order: usize,
}

impl Planar for KnotRecord {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

/// All knots of one annotated trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryAnnotation {
    pub track_id: TrackId,
    /// Knot count including Start and End.
    pub total_knots: usize,
    pub knots: Vec<KnotRecord>,
}

/// A full session's annotations, as sent to the submission sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSubmission {
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
    #[validate(length(min = 1))]
    pub trajectories: Vec<TrajectoryAnnotation>,
}

/// Flattened storage row, one per submitted knot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnotAnnotationRow {
    pub session_id: String,
    pub track_id: TrackId,
    pub total_knots: usize,
    pub x: f64,
    pub y: f64,
    pub relative_order: usize,
    pub created_at: Timestamp,
}

impl Planar for KnotAnnotationRow {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Knots of `trajectory` in submission order: Manual by rank, Start, End.
pub fn submission_order(trajectory: &TrajectoryWithKnots) -> Vec<&Knot> {
    let mut ordered: Vec<&Knot> = trajectory.manual_knots().collect();
    ordered.sort_by_key(|k| k.placement_rank);
    ordered.extend(trajectory.start());
    ordered.extend(trajectory.end());
    ordered
}

/// Build the wire representation of one trajectory.
pub fn annotate(trajectory: &TrajectoryWithKnots) -> TrajectoryAnnotation {
    let knots: Vec<KnotRecord> = submission_order(trajectory)
        .into_iter()
        .enumerate()
        .map(|(i, k)| KnotRecord {
            x: k.x,
            y: k.y,
            relative_order: i + 1,
        })
        .collect();
    TrajectoryAnnotation {
        track_id: trajectory.track_id(),
        total_knots: knots.len(),
        knots,
    }
}

/// Collect every trajectory of a session into one submission.
///
/// All trajectories must be complete; otherwise nothing is built and the
/// incomplete track ids are reported.
pub fn collect_submission(
    session_id: &str,
    trajectories: &[TrajectoryWithKnots],
) -> Result<AnnotationSubmission, CoreError> {
    if trajectories.is_empty() {
        return Err(CoreError::Validation(
            "a submission needs at least one trajectory".to_string(),
        ));
    }
    let incomplete: Vec<TrackId> = trajectories
        .iter()
        .filter(|t| !t.is_complete())
        .map(|t| t.track_id())
        .collect();
    if !incomplete.is_empty() {
        return Err(CoreError::IncompleteSubmission {
            track_ids: incomplete,
        });
    }
    Ok(AnnotationSubmission {
        session_id: session_id.to_string(),
        trajectories: trajectories.iter().map(annotate).collect(),
    })
}

// ---------------------------------------------------------------------------
// Validation (sink side)
// ---------------------------------------------------------------------------

/// Validate an incoming submission before it is stored.
pub fn validate_submission(submission: &AnnotationSubmission) -> Result<(), CoreError> {
    submission
        .validate()
        .map_err(|e| CoreError::Validation(format!("invalid submission: {e}")))?;

    let mut seen = HashSet::new();
    for t in &submission.trajectories {
        if !seen.insert(t.track_id) {
            return Err(CoreError::Validation(format!(
                "track {} appears more than once",
                t.track_id
            )));
        }
        validate_trajectory_annotation(t)?;
    }
    Ok(())
}

fn validate_trajectory_annotation(t: &TrajectoryAnnotation) -> Result<(), CoreError> {
    if t.total_knots != t.knots.len() {
        return Err(CoreError::Validation(format!(
            "track {} declares {} knots but lists {}",
            t.track_id,
            t.total_knots,
            t.knots.len()
        )));
    }
    if t.knots.len() < ENDPOINT_KNOT_COUNT {
        return Err(CoreError::Validation(format!(
            "track {} must include its start and end knots",
            t.track_id
        )));
    }
    let mut orders: Vec<usize> = t.knots.iter().map(|k| k.relative_order).collect();
    orders.sort_unstable();
    if orders.iter().enumerate().any(|(i, &o)| o != i + 1) {
        return Err(CoreError::Validation(format!(
            "track {} relative orders must be exactly 1..={}",
            t.track_id,
            t.knots.len()
        )));
    }
    if t.knots.iter().any(|k| !k.x.is_finite() || !k.y.is_finite()) {
        return Err(CoreError::Validation(format!(
            "track {} has non-finite knot coordinates",
            t.track_id
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

/// Knots of a submitted trajectory split back into their kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedPartition {
    /// In placement order.
    pub manual: Vec<KnotRecord>,
    pub start: KnotRecord,
    pub end: KnotRecord,
}

/// Recover the Manual/Start/End split from `relativeOrder`.
pub fn partition_by_relative_order(t: &TrajectoryAnnotation) -> Result<SubmittedPartition, CoreError> {
    let mut knots = t.knots.clone();
    knots.sort_by_key(|k| k.relative_order);
    let (Some(end), Some(start)) = (knots.pop(), knots.pop()) else {
        return Err(CoreError::Validation(format!(
            "track {} must include its start and end knots",
            t.track_id
        )));
    };
    Ok(SubmittedPartition {
        manual: knots,
        start,
        end,
    })
}

/// Expand a submission into one storage row per knot.
pub fn flatten_submission(submission: &AnnotationSubmission, created_at: Timestamp) -> Vec<KnotAnnotationRow> {
    submission
        .trajectories
        .iter()
        .flat_map(|t| {
            t.knots.iter().map(move |k| KnotAnnotationRow {
                session_id: submission.session_id.clone(),
                track_id: t.track_id,
                total_knots: t.total_knots,
                x: k.x,
                y: k.y,
                relative_order: k.relative_order,
                created_at,
            })
        })
        .collect()
}

/// Kind a knot takes in submission order, given its 1-based position.
pub fn kind_at(relative_order: usize, total_knots: usize) -> Option<KnotKind> {
    match relative_order {
        0 => None,
        o if o > total_knots => None,
        o if o == total_knots => Some(KnotKind::End),
        o if o + 1 == total_knots => Some(KnotKind::Start),
        _ => Some(KnotKind::Manual),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
