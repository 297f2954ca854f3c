//! Knot set management for a single trajectory.
//!
//! A [`TrajectoryWithKnots`] owns the fixed Start/End knots derived from its
//! samples plus the user's `Manual` knots. Manual knots carry a contiguous
//! `placement_rank` (0, 1, 2, ...) recording the order the user placed them;
//! every removal recompacts the ranks.
//!
//! The knot vector is kept in insertion order: Start, End, then Manual knots
//! by ascending rank. Resolver tie-breaks that depend on iteration order rely
//! on this.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::resolver::Planar;
use crate::trajectory::{self, TrajectorySample};
use crate::types::TrackId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Knot budgets the annotation UI offers.
pub const DEFAULT_ALLOWED_KNOT_BUDGETS: &[usize] = &[3, 4, 5];

/// Budget assigned to a freshly loaded trajectory.
pub const DEFAULT_KNOT_BUDGET: usize = 3;

/// Number of fixed endpoint knots on every trajectory.
pub const ENDPOINT_KNOT_COUNT: usize = 2;

/// Validate that `budget` is one of the `allowed` values.
pub fn validate_knot_budget(budget: usize, allowed: &[usize]) -> Result<(), CoreError> {
    if allowed.contains(&budget) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid knot budget {budget}. Must be one of: {allowed:?}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Knot
// ---------------------------------------------------------------------------

/// Where a knot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnotKind {
    Start,
    End,
    Manual,
}

impl KnotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Manual => "manual",
        }
    }

    /// Start and End are derived from the samples and never user-editable.
    pub fn is_endpoint(&self) -> bool {
        matches!(self, Self::Start | Self::End)
    }
}

/// A point marking a location of interest on a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Knot {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub kind: KnotKind,
    /// `Some` for Manual knots only.
    pub placement_rank: Option<usize>,
}

impl Knot {
    fn endpoint(kind: KnotKind, track_id: TrackId, sample: &TrajectorySample) -> Self {
        Self {
            id: format!("{}-{track_id}", kind.as_str()),
            x: sample.x,
            y: sample.y,
            kind,
            placement_rank: None,
        }
    }

    fn manual(x: f64, y: f64, rank: usize) -> Self {
        Self {
            id: format!("manual-{}", uuid::Uuid::now_v7()),
            x,
            y,
            kind: KnotKind::Manual,
            placement_rank: Some(rank),
        }
    }
}

impl Planar for Knot {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

/// The two fixed knots of a trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointKnots {
    pub start: Knot,
    pub end: Knot,
}

/// Derive Start/End knots from the first and last sample by `sceneId`.
///
/// Input order does not matter. Fails with [`CoreError::EmptyTrajectory`]
/// when there are no samples.
pub fn initialize(track_id: TrackId, samples: &[TrajectorySample]) -> Result<EndpointKnots, CoreError> {
    let (first, last) =
        trajectory::endpoints(samples).ok_or(CoreError::EmptyTrajectory { track_id })?;
    Ok(EndpointKnots {
        start: Knot::endpoint(KnotKind::Start, track_id, first),
        end: Knot::endpoint(KnotKind::End, track_id, last),
    })
}

// ---------------------------------------------------------------------------
// TrajectoryWithKnots
// ---------------------------------------------------------------------------

/// The unit of annotation work: one trajectory and its knots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryWithKnots {
    track_id: TrackId,
    samples: Vec<TrajectorySample>,
    knots: Vec<Knot>,
    knot_budget: usize,
    #[serde(default)]
    finalized: bool,
}

impl TrajectoryWithKnots {
    /// Load a trajectory for annotation.
    ///
    /// Samples are validated and sorted by `sceneId`; Start/End knots are
    /// created from the first and last of them.
    pub fn load(
        track_id: TrackId,
        mut samples: Vec<TrajectorySample>,
        knot_budget: usize,
    ) -> Result<Self, CoreError> {
        trajectory::validate_samples(track_id, &samples)?;
        trajectory::sort_by_scene(&mut samples);
        let EndpointKnots { start, end } = initialize(track_id, &samples)?;
        Ok(Self {
            track_id,
            samples,
            knots: vec![start, end],
            knot_budget,
            finalized: false,
        })
    }

    pub fn track_id(&self) -> TrackId {
        self.track_id
    }

    /// Samples in ascending `sceneId` order.
    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    /// All knots in insertion order (Start, End, Manual by rank).
    pub fn knots(&self) -> &[Knot] {
        &self.knots
    }

    pub fn knot_budget(&self) -> usize {
        self.knot_budget
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn start(&self) -> Option<&Knot> {
        self.knots.iter().find(|k| k.kind == KnotKind::Start)
    }

    pub fn end(&self) -> Option<&Knot> {
        self.knots.iter().find(|k| k.kind == KnotKind::End)
    }

    /// Manual knots in ascending placement rank.
    pub fn manual_knots(&self) -> impl Iterator<Item = &Knot> {
        self.knots.iter().filter(|k| k.kind == KnotKind::Manual)
    }

    pub fn manual_count(&self) -> usize {
        self.manual_knots().count()
    }

    pub fn find(&self, knot_id: &str) -> Option<&Knot> {
        self.knots.iter().find(|k| k.id == knot_id)
    }

    /// True when every budgeted knot has been placed.
    pub fn is_complete(&self) -> bool {
        self.knots.len() == self.knot_budget + ENDPOINT_KNOT_COUNT
    }

    /// Place a Manual knot at the given coordinates.
    ///
    /// Coordinates are used verbatim; projection onto the curve is the
    /// caller's job.
    pub fn place_knot(&mut self, x: f64, y: f64) -> Result<Knot, CoreError> {
        self.ensure_editable()?;
        if !x.is_finite() || !y.is_finite() {
            return Err(CoreError::Validation(
                "knot coordinates must be finite numbers".to_string(),
            ));
        }
        let count = self.manual_count();
        if count >= self.knot_budget {
            return Err(CoreError::KnotBudgetExceeded {
                budget: self.knot_budget,
            });
        }
        let knot = Knot::manual(x, y, count);
        self.knots.push(knot.clone());
        Ok(knot)
    }

    /// Remove a Manual knot by id and recompact ranks.
    pub fn remove_knot(&mut self, knot_id: &str) -> Result<Knot, CoreError> {
        self.ensure_editable()?;
        let pos = self
            .knots
            .iter()
            .position(|k| k.id == knot_id)
            .ok_or_else(|| CoreError::KnotNotFound {
                knot_id: knot_id.to_string(),
            })?;
        if self.knots[pos].kind.is_endpoint() {
            return Err(CoreError::ProtectedKnot {
                knot_id: knot_id.to_string(),
            });
        }
        let removed = self.knots.remove(pos);
        self.recompact_ranks();
        Ok(removed)
    }

    /// Remove the most recently placed Manual knot, if any.
    pub fn remove_last_placed(&mut self) -> Result<Option<Knot>, CoreError> {
        self.ensure_editable()?;
        let last = self
            .knots
            .iter()
            .rposition(|k| k.kind == KnotKind::Manual);
        Ok(last.map(|pos| self.knots.remove(pos)))
    }

    /// Change the knot budget.
    ///
    /// Lowering it below the current Manual count drops the newest knots
    /// (highest rank first). The dropped knots are returned, newest first.
    pub fn set_knot_budget(&mut self, new_budget: usize) -> Result<Vec<Knot>, CoreError> {
        self.ensure_editable()?;
        let mut removed = Vec::new();
        while self.manual_count() > new_budget {
            match self.remove_last_placed()? {
                Some(knot) => removed.push(knot),
                None => break,
            }
        }
        if !removed.is_empty() {
            tracing::warn!(
                track_id = self.track_id,
                old_budget = self.knot_budget,
                new_budget,
                dropped = removed.len(),
                "Knot budget lowered, newest knots dropped",
            );
        }
        self.knot_budget = new_budget;
        Ok(removed)
    }

    /// Mark the trajectory read-only.
    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    /// Reorder Manual knots to match `order` (knot ids, oldest first) and
    /// reassign ranks from it.
    ///
    /// `order` must name exactly the current Manual knots.
    pub fn apply_placement_order(&mut self, order: &[String]) -> Result<(), CoreError> {
        let manual_count = self.manual_count();
        if order.len() != manual_count {
            return Err(CoreError::Validation(format!(
                "placement order for track {} lists {} knots but {manual_count} are placed",
                self.track_id,
                order.len()
            )));
        }
        let mut manual: Vec<Knot> = Vec::with_capacity(manual_count);
        for id in order {
            let knot = self
                .knots
                .iter()
                .find(|k| k.kind == KnotKind::Manual && &k.id == id)
                .ok_or_else(|| CoreError::KnotNotFound { knot_id: id.clone() })?;
            if manual.iter().any(|k| k.id == knot.id) {
                return Err(CoreError::Validation(format!(
                    "placement order for track {} repeats knot '{id}'",
                    self.track_id
                )));
            }
            manual.push(knot.clone());
        }
        self.knots.retain(|k| k.kind != KnotKind::Manual);
        self.knots.extend(manual);
        self.recompact_ranks();
        Ok(())
    }

    /// Re-sort samples by `sceneId`.
    pub(crate) fn sort_samples(&mut self) {
        trajectory::sort_by_scene(&mut self.samples);
    }

    /// Verify the structural invariants of a deserialized trajectory.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        trajectory::validate_samples(self.track_id, &self.samples)?;
        if self.samples.windows(2).any(|w| w[0].scene_id > w[1].scene_id) {
            return Err(CoreError::Validation(format!(
                "track {} samples are not ordered by scene",
                self.track_id
            )));
        }
        let EndpointKnots { start, end } = initialize(self.track_id, &self.samples)?;
        let same = |expected: &Knot, actual: Option<&Knot>| {
            actual.is_some_and(|k| k.id == expected.id && k.x == expected.x && k.y == expected.y)
        };
        if !same(&start, self.start()) || !same(&end, self.end()) {
            return Err(CoreError::Validation(format!(
                "track {} start and end knots do not match its first and last samples",
                self.track_id
            )));
        }
        let starts = self.knots.iter().filter(|k| k.kind == KnotKind::Start).count();
        let ends = self.knots.iter().filter(|k| k.kind == KnotKind::End).count();
        if starts != 1 || ends != 1 {
            return Err(CoreError::Validation(format!(
                "track {} must have exactly one start and one end knot",
                self.track_id
            )));
        }
        if self.manual_count() > self.knot_budget {
            return Err(CoreError::Validation(format!(
                "track {} has more manual knots than its budget of {}",
                self.track_id, self.knot_budget
            )));
        }
        for (expected, knot) in self.manual_knots().enumerate() {
            if knot.placement_rank != Some(expected) {
                return Err(CoreError::Validation(format!(
                    "track {} has non-contiguous placement ranks",
                    self.track_id
                )));
            }
        }
        for (i, knot) in self.knots.iter().enumerate() {
            if self.knots[..i].iter().any(|k| k.id == knot.id) {
                return Err(CoreError::Validation(format!(
                    "track {} has duplicate knot id '{}'",
                    self.track_id, knot.id
                )));
            }
        }
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), CoreError> {
        if self.finalized {
            Err(CoreError::Finalized {
                track_id: self.track_id,
            })
        } else {
            Ok(())
        }
    }

    /// Manual knots keep their relative order in the vector, so ranks are
    /// just their position among Manual knots.
    fn recompact_ranks(&mut self) {
        let mut rank = 0;
        for knot in self.knots.iter_mut().filter(|k| k.kind == KnotKind::Manual) {
            knot.placement_rank = Some(rank);
            rank += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{resolve, OrderingStrategy};

    fn three_point_track(budget: usize) -> TrajectoryWithKnots {
        let samples = vec![
            TrajectorySample::new(1, 7, 0.0, 0.0),
            TrajectorySample::new(2, 7, 1.0, 1.0),
            TrajectorySample::new(3, 7, 2.0, 0.0),
        ];
        TrajectoryWithKnots::load(7, samples, budget).unwrap()
    }

    fn ranks(t: &TrajectoryWithKnots) -> Vec<usize> {
        t.manual_knots().filter_map(|k| k.placement_rank).collect()
    }

    fn xs(t: &TrajectoryWithKnots) -> Vec<f64> {
        t.manual_knots().map(|k| k.x).collect()
    }

    // -- initialize ----------------------------------------------------------

    #[test]
    fn initialize_picks_min_and_max_scene() {
        let samples = vec![
            TrajectorySample::new(4, 1, 3.0, 3.0),
            TrajectorySample::new(2, 1, 1.0, 1.0),
            TrajectorySample::new(8, 1, 9.0, 9.0),
            TrajectorySample::new(6, 1, 5.0, 5.0),
        ];
        let ends = initialize(1, &samples).unwrap();
        assert_eq!((ends.start.x, ends.start.y), (1.0, 1.0));
        assert_eq!((ends.end.x, ends.end.y), (9.0, 9.0));
        assert_eq!(ends.start.id, "start-1");
        assert_eq!(ends.end.id, "end-1");
        assert_eq!(ends.start.placement_rank, None);
    }

    #[test]
    fn initialize_empty_fails() {
        let err = initialize(5, &[]).unwrap_err();
        assert!(matches!(err, CoreError::EmptyTrajectory { track_id: 5 }));
    }

    #[test]
    fn load_sorts_samples() {
        let samples = vec![
            TrajectorySample::new(3, 7, 2.0, 0.0),
            TrajectorySample::new(1, 7, 0.0, 0.0),
            TrajectorySample::new(2, 7, 1.0, 1.0),
        ];
        let t = TrajectoryWithKnots::load(7, samples, 3).unwrap();
        let scenes: Vec<_> = t.samples().iter().map(|s| s.scene_id).collect();
        assert_eq!(scenes, vec![1, 2, 3]);
        assert_eq!(t.knots().len(), 2);
    }

    // -- place_knot ----------------------------------------------------------

    #[test]
    fn placement_ranks_are_sequential() {
        let mut t = three_point_track(5);
        for i in 0..5 {
            let knot = t.place_knot(i as f64, 0.5).unwrap();
            assert_eq!(knot.placement_rank, Some(i));
            assert_eq!(knot.kind, KnotKind::Manual);
        }
        assert_eq!(ranks(&t), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn placement_beyond_budget_rejected_without_change() {
        let mut t = three_point_track(1);
        t.place_knot(1.0, 1.0).unwrap();
        let err = t.place_knot(1.5, 0.5).unwrap_err();
        assert!(matches!(err, CoreError::KnotBudgetExceeded { budget: 1 }));
        assert_eq!(t.manual_count(), 1);
    }

    #[test]
    fn placement_keeps_coordinates_verbatim() {
        let mut t = three_point_track(3);
        let knot = t.place_knot(0.123456789, -42.0).unwrap();
        assert_eq!(knot.x, 0.123456789);
        assert_eq!(knot.y, -42.0);
    }

    #[test]
    fn placement_rejects_non_finite() {
        let mut t = three_point_track(3);
        assert!(t.place_knot(f64::NAN, 0.0).is_err());
        assert!(t.place_knot(0.0, f64::INFINITY).is_err());
        assert_eq!(t.manual_count(), 0);
    }

    #[test]
    fn manual_ids_are_unique() {
        let mut t = three_point_track(3);
        let a = t.place_knot(0.0, 0.0).unwrap();
        let b = t.place_knot(0.0, 0.0).unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("manual-"));
    }

    // -- remove_knot ---------------------------------------------------------

    #[test]
    fn remove_middle_recompacts_preserving_order() {
        let mut t = three_point_track(4);
        let ids: Vec<String> = (0..4)
            .map(|i| t.place_knot(i as f64, 0.0).unwrap().id)
            .collect();
        t.remove_knot(&ids[1]).unwrap();
        assert_eq!(ranks(&t), vec![0, 1, 2]);
        assert_eq!(xs(&t), vec![0.0, 2.0, 3.0]);

        t.remove_knot(&ids[0]).unwrap();
        assert_eq!(ranks(&t), vec![0, 1]);
        assert_eq!(xs(&t), vec![2.0, 3.0]);
    }

    #[test]
    fn remove_endpoint_is_protected() {
        let mut t = three_point_track(3);
        let err = t.remove_knot("start-7").unwrap_err();
        assert!(matches!(err, CoreError::ProtectedKnot { .. }));
        let err = t.remove_knot("end-7").unwrap_err();
        assert!(matches!(err, CoreError::ProtectedKnot { .. }));
        assert_eq!(t.knots().len(), 2);
    }

    #[test]
    fn remove_unknown_knot_fails() {
        let mut t = three_point_track(3);
        let err = t.remove_knot("manual-nope").unwrap_err();
        assert!(matches!(err, CoreError::KnotNotFound { .. }));
    }

    #[test]
    fn remove_last_placed_takes_highest_rank() {
        let mut t = three_point_track(3);
        t.place_knot(0.5, 0.0).unwrap();
        let newest = t.place_knot(1.5, 0.0).unwrap();
        let removed = t.remove_last_placed().unwrap().unwrap();
        assert_eq!(removed.id, newest.id);
        assert_eq!(ranks(&t), vec![0]);
    }

    #[test]
    fn remove_last_placed_without_manual_is_noop() {
        let mut t = three_point_track(3);
        assert!(t.remove_last_placed().unwrap().is_none());
        assert_eq!(t.knots().len(), 2);
    }

    // -- set_knot_budget -----------------------------------------------------

    #[test]
    fn budget_five_to_three_keeps_lowest_ranks() {
        let mut t = three_point_track(5);
        for i in 0..5 {
            t.place_knot(i as f64, 0.0).unwrap();
        }
        let removed = t.set_knot_budget(3).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].placement_rank, Some(4));
        assert_eq!(removed[1].placement_rank, Some(3));
        assert_eq!(ranks(&t), vec![0, 1, 2]);
        assert_eq!(xs(&t), vec![0.0, 1.0, 2.0]);
        assert_eq!(t.knot_budget(), 3);
    }

    #[test]
    fn budget_after_removal_keeps_lowest_original_ranks() {
        let mut t = three_point_track(5);
        let ids: Vec<String> = (0..5)
            .map(|i| t.place_knot(i as f64, 0.0).unwrap().id)
            .collect();
        t.remove_knot(&ids[0]).unwrap();
        t.set_knot_budget(2).unwrap();
        assert_eq!(xs(&t), vec![1.0, 2.0]);
        assert_eq!(ranks(&t), vec![0, 1]);
    }

    #[test]
    fn raising_budget_preserves_knots() {
        let mut t = three_point_track(3);
        t.place_knot(0.5, 0.5).unwrap();
        t.place_knot(1.5, 0.5).unwrap();
        let removed = t.set_knot_budget(5).unwrap();
        assert!(removed.is_empty());
        assert_eq!(t.manual_count(), 2);
        assert_eq!(t.knot_budget(), 5);
    }

    // -- is_complete ---------------------------------------------------------

    #[test]
    fn one_knot_scenario() {
        let mut t = three_point_track(1);
        assert!(!t.is_complete());
        t.place_knot(1.0, 1.0).unwrap();

        let start = t.start().unwrap();
        let end = t.end().unwrap();
        assert_eq!((start.x, start.y), (0.0, 0.0));
        assert_eq!((end.x, end.y), (2.0, 0.0));
        let manual: Vec<_> = t.manual_knots().collect();
        assert_eq!(manual.len(), 1);
        assert_eq!((manual[0].x, manual[0].y), (1.0, 1.0));
        assert_eq!(manual[0].placement_rank, Some(0));

        let ordered = resolve(OrderingStrategy::NearestSampleIndex, t.knots(), t.samples()).unwrap();
        let kinds: Vec<_> = ordered.iter().map(|k| k.kind).collect();
        assert_eq!(kinds, vec![KnotKind::Start, KnotKind::Manual, KnotKind::End]);
        assert!(t.is_complete());
    }

    #[test]
    fn lowering_budget_can_complete_a_trajectory() {
        let mut t = three_point_track(4);
        t.place_knot(0.5, 0.5).unwrap();
        t.place_knot(1.5, 0.5).unwrap();
        assert!(!t.is_complete());
        t.set_knot_budget(2).unwrap();
        assert!(t.is_complete());
    }

    // -- finalize ------------------------------------------------------------

    #[test]
    fn finalized_trajectory_rejects_edits() {
        let mut t = three_point_track(3);
        let knot = t.place_knot(0.5, 0.5).unwrap();
        t.finalize();
        assert!(matches!(t.place_knot(1.0, 1.0), Err(CoreError::Finalized { track_id: 7 })));
        assert!(matches!(t.remove_knot(&knot.id), Err(CoreError::Finalized { .. })));
        assert!(matches!(t.remove_last_placed(), Err(CoreError::Finalized { .. })));
        assert!(matches!(t.set_knot_budget(5), Err(CoreError::Finalized { .. })));
        assert_eq!(t.manual_count(), 1);
    }

    // -- apply_placement_order / check_invariants ----------------------------

    #[test]
    fn apply_placement_order_reassigns_ranks() {
        let mut t = three_point_track(3);
        let a = t.place_knot(0.5, 0.0).unwrap().id;
        let b = t.place_knot(1.5, 0.0).unwrap().id;
        t.apply_placement_order(&[b.clone(), a.clone()]).unwrap();
        let order: Vec<_> = t.manual_knots().map(|k| k.id.clone()).collect();
        assert_eq!(order, vec![b, a]);
        assert_eq!(ranks(&t), vec![0, 1]);
        assert!(t.check_invariants().is_ok());
    }

    #[test]
    fn apply_placement_order_rejects_mismatch() {
        let mut t = three_point_track(3);
        let a = t.place_knot(0.5, 0.0).unwrap().id;
        t.place_knot(1.5, 0.0).unwrap();
        assert!(t.apply_placement_order(&[a.clone()]).is_err());
        assert!(t.apply_placement_order(&[a.clone(), a]).is_err());
        assert!(t
            .apply_placement_order(&["x".to_string(), "y".to_string()])
            .is_err());
    }

    #[test]
    fn check_invariants_catches_rank_gaps() {
        let mut t = three_point_track(3);
        t.place_knot(0.5, 0.0).unwrap();
        let mut json = serde_json::to_value(&t).unwrap();
        json["knots"][2]["placementRank"] = serde_json::json!(4);
        let broken: TrajectoryWithKnots = serde_json::from_value(json).unwrap();
        assert!(broken.check_invariants().is_err());
    }

    #[test]
    fn check_invariants_catches_moved_endpoint() {
        let t = three_point_track(3);
        let mut json = serde_json::to_value(&t).unwrap();
        json["knots"][1]["x"] = serde_json::json!(9.0);
        let broken: TrajectoryWithKnots = serde_json::from_value(json).unwrap();
        let err = broken.check_invariants().unwrap_err();
        assert!(err.to_string().contains("start and end knots"));
    }

    #[test]
    fn check_invariants_catches_bad_samples() {
        let t = three_point_track(3);

        let mut unsorted = serde_json::to_value(&t).unwrap();
        unsorted["samples"].as_array_mut().unwrap().swap(0, 1);
        let broken: TrajectoryWithKnots = serde_json::from_value(unsorted).unwrap();
        assert!(broken.check_invariants().is_err());

        let mut foreign = serde_json::to_value(&t).unwrap();
        foreign["samples"][1]["trackId"] = serde_json::json!(8);
        let broken: TrajectoryWithKnots = serde_json::from_value(foreign).unwrap();
        assert!(broken.check_invariants().is_err());

        let mut empty = serde_json::to_value(&t).unwrap();
        empty["samples"] = serde_json::json!([]);
        let broken: TrajectoryWithKnots = serde_json::from_value(empty).unwrap();
        assert!(matches!(broken.check_invariants(), Err(CoreError::EmptyTrajectory { track_id: 7 })));
    }

    #[test]
    fn validate_knot_budget_against_allowed() {
        assert!(validate_knot_budget(3, DEFAULT_ALLOWED_KNOT_BUDGETS).is_ok());
        assert!(validate_knot_budget(5, DEFAULT_ALLOWED_KNOT_BUDGETS).is_ok());
        let err = validate_knot_budget(6, DEFAULT_ALLOWED_KNOT_BUDGETS).unwrap_err();
        assert!(err.to_string().contains("Invalid knot budget 6"));
    }
}
