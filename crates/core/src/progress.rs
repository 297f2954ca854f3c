//! Saved annotation progress.
//!
//! The session collaborator stores an opaque blob per user. Its logical
//! content is the loaded trajectories with their knots, the index of the
//! trajectory on screen and, per track, the Manual knot ids in placement
//! order. The blob is JSON; callers persist it verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::knots::TrajectoryWithKnots;
use crate::types::{Timestamp, TrackId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub trajectories: Vec<TrajectoryWithKnots>,
    pub current_index: usize,
    pub knot_placement_order: BTreeMap<TrackId, Vec<String>>,
    /// Number of trajectories that were complete when saved.
    pub completed_count: usize,
    pub saved_at: Timestamp,
}

impl SessionProgress {
    /// Snapshot the given session state.
    pub fn capture(trajectories: &[TrajectoryWithKnots], current_index: usize, saved_at: Timestamp) -> Self {
        let knot_placement_order = trajectories
            .iter()
            .map(|t| {
                let ids = t.manual_knots().map(|k| k.id.clone()).collect();
                (t.track_id(), ids)
            })
            .collect();
        Self {
            trajectories: trajectories.to_vec(),
            current_index,
            knot_placement_order,
            completed_count: trajectories.iter().filter(|t| t.is_complete()).count(),
            saved_at,
        }
    }

    pub fn to_blob(&self) -> Result<String, CoreError> {
        serde_json::to_string(self)
            .map_err(|e| CoreError::Internal(format!("failed to serialize progress: {e}")))
    }

    pub fn from_blob(blob: &str) -> Result<Self, CoreError> {
        serde_json::from_str(blob)
            .map_err(|e| CoreError::Validation(format!("invalid progress blob: {e}")))
    }

    /// Validate the snapshot and hand back the trajectories and current
    /// index, with placement ranks reapplied from `knot_placement_order`.
    pub fn restore(self) -> Result<(Vec<TrajectoryWithKnots>, usize), CoreError> {
        let Self {
            mut trajectories,
            current_index,
            mut knot_placement_order,
            ..
        } = self;

        if trajectories.is_empty() {
            return Err(CoreError::Validation(
                "progress blob contains no trajectories".to_string(),
            ));
        }
        if current_index >= trajectories.len() {
            return Err(CoreError::Validation(format!(
                "current index {current_index} is out of range for {} trajectories",
                trajectories.len()
            )));
        }

        for t in &mut trajectories {
            t.sort_samples();
            match knot_placement_order.remove(&t.track_id()) {
                Some(order) => t.apply_placement_order(&order)?,
                None if t.manual_count() == 0 => {}
                None => {
                    return Err(CoreError::Validation(format!(
                        "progress blob has no placement order for track {}",
                        t.track_id()
                    )))
                }
            }
            t.check_invariants()?;
        }
        if let Some(orphan) = knot_placement_order.keys().next() {
            return Err(CoreError::Validation(format!(
                "progress blob has a placement order for unknown track {orphan}"
            )));
        }
        Ok((trajectories, current_index))
    }
}
