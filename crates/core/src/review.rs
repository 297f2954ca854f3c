//! Admin review of stored annotations.
//!
//! Stored rows carry only `(x, y)` and the submission `relativeOrder`. The
//! review view regroups them per session and track and derives its own draw
//! order with a resolver strategy; `relativeOrder` only fixes the iteration
//! order fed to the resolver.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::resolver::{resolve, OrderingStrategy};
use crate::submission::KnotAnnotationRow;
use crate::trajectory::TrajectorySample;
use crate::types::TrackId;

/// Rows of one annotated trajectory, keyed by `(session_id, track_id)`.
pub type RowGroups = BTreeMap<(String, TrackId), Vec<KnotAnnotationRow>>;

/// Group rows by session and track, each group sorted by `relativeOrder`.
pub fn group_rows(rows: impl IntoIterator<Item = KnotAnnotationRow>) -> RowGroups {
    let mut groups: RowGroups = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.session_id.clone(), row.track_id))
            .or_default()
            .push(row);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|r| r.relative_order);
    }
    groups
}

/// Display order of one trajectory's rows.
///
/// `samples` is required for [`OrderingStrategy::NearestSampleIndex`] and
/// ignored otherwise.
pub fn review_order<'a>(
    rows: &'a [KnotAnnotationRow],
    strategy: OrderingStrategy,
    samples: &[TrajectorySample],
) -> Result<Vec<&'a KnotAnnotationRow>, CoreError> {
    resolve(strategy, rows, samples)
}

/// One trajectory as shown in the review view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedTrajectory {
    pub session_id: String,
    pub track_id: TrackId,
    pub total_knots: usize,
    /// False when the stored `totalKnots` disagrees with the row count.
    pub consistent: bool,
    /// Knot coordinates in display order.
    pub path: Vec<(f64, f64)>,
}

/// Review every group. Tracks without samples fall back to chaining when the
/// projection strategy is requested.
pub fn review_groups(
    groups: &RowGroups,
    strategy: OrderingStrategy,
    samples_by_track: &BTreeMap<TrackId, Vec<TrajectorySample>>,
) -> Result<Vec<ReviewedTrajectory>, CoreError> {
    let mut reviewed = Vec::with_capacity(groups.len());
    for ((session_id, track_id), rows) in groups {
        let samples = samples_by_track.get(track_id).map(Vec::as_slice).unwrap_or(&[]);
        let effective = if strategy.requires_samples() && samples.is_empty() {
            tracing::warn!(track_id, "No samples for track, falling back to nearest-neighbor chaining");
            OrderingStrategy::NearestNeighborChain
        } else {
            strategy
        };
        let ordered = review_order(rows, effective, samples)?;
        let total_knots = rows.first().map(|r| r.total_knots).unwrap_or(0);
        reviewed.push(ReviewedTrajectory {
            session_id: session_id.clone(),
            track_id: *track_id,
            total_knots,
            consistent: rows.iter().all(|r| r.total_knots == rows.len()),
            path: ordered.iter().map(|r| (r.x, r.y)).collect(),
        });
    }
    Ok(reviewed)
}
