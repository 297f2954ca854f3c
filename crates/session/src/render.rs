//! View model for one redraw of a trajectory.
//!
//! Drawing itself belongs to the UI; this module only decides what goes on
//! screen and where: the sample polyline in pixel space and the knots in
//! resolver order.

use serde::Serialize;

use knotline_core::error::CoreError;
use knotline_core::knots::{KnotKind, TrajectoryWithKnots};
use knotline_core::resolver::{resolve, OrderingStrategy};
use knotline_core::types::TrackId;
use knotline_core::viewport::{PixelPoint, PixelRect, Viewport};

/// Which screen the redraw is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// The annotation canvas the user edits on.
    Live,
    /// The read-only review screen.
    Review,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedKnot {
    pub id: String,
    pub kind: KnotKind,
    pub placement_rank: Option<usize>,
    pub pixel: PixelPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTrajectory {
    pub track_id: TrackId,
    pub strategy: OrderingStrategy,
    /// Samples in `sceneId` order, in pixels.
    pub polyline: Vec<PixelPoint>,
    /// Knots in draw order, in pixels.
    pub knots: Vec<RenderedKnot>,
    pub complete: bool,
}

impl RenderedTrajectory {
    /// Pixel positions of the knots in draw order, for the connecting line.
    pub fn knot_path(&self) -> Vec<PixelPoint> {
        self.knots.iter().map(|k| k.pixel).collect()
    }
}

/// Lay out `trajectory` inside `rect`, ordering its knots with `strategy`.
pub fn render_trajectory(
    trajectory: &TrajectoryWithKnots,
    strategy: OrderingStrategy,
    rect: PixelRect,
) -> Result<RenderedTrajectory, CoreError> {
    let viewport = Viewport::fit(trajectory.samples(), rect)?;
    let ordered = resolve(strategy, trajectory.knots(), trajectory.samples())?;

    let polyline = trajectory
        .samples()
        .iter()
        .map(|s| viewport.project(s))
        .collect();
    let knots = ordered
        .into_iter()
        .map(|k| RenderedKnot {
            id: k.id.clone(),
            kind: k.kind,
            placement_rank: k.placement_rank,
            pixel: viewport.project(k),
        })
        .collect();

    Ok(RenderedTrajectory {
        track_id: trajectory.track_id(),
        strategy,
        polyline,
        knots,
        complete: trajectory.is_complete(),
    })
}

#[cfg(test)]
mod tests {
    use knotline_core::trajectory::TrajectorySample;

    use super::*;

    /// A U-turn: out along y=0, back along y=1.
    fn u_turn() -> TrajectoryWithKnots {
        let samples = vec![
            TrajectorySample::new(1, 3, 0.0, 0.0),
            TrajectorySample::new(2, 3, 2.0, 0.0),
            TrajectorySample::new(3, 3, 4.0, 0.0),
            TrajectorySample::new(4, 3, 4.0, 1.0),
            TrajectorySample::new(5, 3, 2.0, 1.0),
            TrajectorySample::new(6, 3, 0.0, 1.0),
        ];
        let mut t = TrajectoryWithKnots::load(3, samples, 2).unwrap();
        t.place_knot(2.0, 1.0).unwrap();
        t.place_knot(2.0, 0.0).unwrap();
        t
    }

    fn kinds_and_xs(r: &RenderedTrajectory, t: &TrajectoryWithKnots) -> Vec<(KnotKind, f64)> {
        r.knots
            .iter()
            .map(|k| (k.kind, t.find(&k.id).unwrap().x))
            .collect()
    }

    #[test]
    fn live_order_follows_the_path() {
        let t = u_turn();
        let r = render_trajectory(&t, OrderingStrategy::NearestSampleIndex, PixelRect::default()).unwrap();
        let ids: Vec<_> = r.knots.iter().map(|k| k.id.as_str()).collect();
        assert_eq!(ids[0], "start-3");
        assert_eq!(ids[3], "end-3");
        // Knot on the outbound leg comes before the one on the return leg.
        let manual: Vec<_> = r.knots[1..3].iter().map(|k| t.find(&k.id).unwrap().y).collect();
        assert_eq!(manual, vec![0.0, 1.0]);
        assert!(r.complete);
    }

    #[test]
    fn chaining_starts_from_the_left() {
        let t = u_turn();
        let r = render_trajectory(&t, OrderingStrategy::NearestNeighborChain, PixelRect::default()).unwrap();
        let order = kinds_and_xs(&r, &t);
        assert_eq!(order[0], (KnotKind::Start, 0.0));
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn polyline_has_one_point_per_sample() {
        let t = u_turn();
        let r = render_trajectory(&t, OrderingStrategy::NearestSampleIndex, PixelRect::default()).unwrap();
        assert_eq!(r.polyline.len(), 6);
        // First sample sits at the padded lower-left of the data.
        let rect = PixelRect::default();
        assert!(r.polyline[0].x > rect.left);
        assert!(r.polyline[0].y < rect.top + rect.height);
        assert_eq!(r.knot_path().len(), 4);
    }
}
