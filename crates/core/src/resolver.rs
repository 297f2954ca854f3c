//! Draw-order resolution for a knot set.
//!
//! Given unordered knots, produce the sequence in which to connect them so
//! the simplified polyline follows the original path. Two strategies exist:
//!
//! - [`OrderingStrategy::NearestSampleIndex`] projects each knot onto the
//!   index of its closest trajectory sample and sorts by that index. Robust
//!   for loops and back-and-forth paths. Used by the live annotation view.
//! - [`OrderingStrategy::NearestNeighborChain`] starts at the left-most knot
//!   and greedily hops to the closest unvisited knot. Needs no samples. Used
//!   by the review view, which only has raw `(x, y)` pairs.
//!
//! Both are pure: they borrow the inputs and return a permutation of
//! references into `items`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Anything with planar data-space coordinates.
pub trait Planar {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
}

/// Euclidean distance between two planar points.
pub fn distance<A: Planar + ?Sized, B: Planar + ?Sized>(a: &A, b: &B) -> f64 {
    (a.x() - b.x()).hypot(a.y() - b.y())
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Selectable ordering algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingStrategy {
    NearestSampleIndex,
    NearestNeighborChain,
}

const VALID_STRATEGY_STRINGS: &[&str] = &["nearest_sample_index", "nearest_neighbor_chain"];

impl OrderingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NearestSampleIndex => "nearest_sample_index",
            Self::NearestNeighborChain => "nearest_neighbor_chain",
        }
    }

    /// Parse a strategy name as used in configuration.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "nearest_sample_index" => Ok(Self::NearestSampleIndex),
            "nearest_neighbor_chain" => Ok(Self::NearestNeighborChain),
            _ => Err(CoreError::Validation(format!(
                "Invalid ordering strategy '{s}'. Must be one of: {}",
                VALID_STRATEGY_STRINGS.join(", ")
            ))),
        }
    }

    /// Whether the strategy needs the trajectory samples.
    pub fn requires_samples(&self) -> bool {
        matches!(self, Self::NearestSampleIndex)
    }
}

/// Order `items` with the chosen strategy.
///
/// `samples` is ignored by [`OrderingStrategy::NearestNeighborChain`].
pub fn resolve<'a, T: Planar, S: Planar>(
    strategy: OrderingStrategy,
    items: &'a [T],
    samples: &[S],
) -> Result<Vec<&'a T>, CoreError> {
    match strategy {
        OrderingStrategy::NearestSampleIndex => order_by_sample_index(items, samples),
        OrderingStrategy::NearestNeighborChain => Ok(order_by_nearest_neighbor(items)),
    }
}

// ---------------------------------------------------------------------------
// Nearest-sample-index projection
// ---------------------------------------------------------------------------

/// Index of the sample closest to `point`; the smallest index wins ties.
///
/// Returns `None` when `samples` is empty.
pub fn nearest_sample_index<P: Planar + ?Sized, S: Planar>(point: &P, samples: &[S]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, sample) in samples.iter().enumerate() {
        let d = distance(point, sample);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Sort items by the index of their nearest sample.
///
/// Items projecting onto the same index are ordered by `x` then `y`, which
/// keeps the result independent of input order.
pub fn order_by_sample_index<'a, T: Planar, S: Planar>(
    items: &'a [T],
    samples: &[S],
) -> Result<Vec<&'a T>, CoreError> {
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let mut keyed: Vec<(usize, &T)> = items
        .iter()
        .map(|item| nearest_sample_index(item, samples).map(|i| (i, item)))
        .collect::<Option<_>>()
        .ok_or_else(|| {
            CoreError::Validation("cannot project knots onto an empty trajectory".to_string())
        })?;

    keyed.sort_by(|(ia, a), (ib, b)| {
        ia.cmp(ib)
            .then_with(|| a.x().total_cmp(&b.x()))
            .then_with(|| a.y().total_cmp(&b.y()))
    });
    Ok(keyed.into_iter().map(|(_, item)| item).collect())
}

// ---------------------------------------------------------------------------
// Greedy nearest-neighbour chaining
// ---------------------------------------------------------------------------

/// Chain items greedily from the left-most one.
///
/// Ties (equal `x` for the seed, equal distance for a hop) go to the item
/// encountered first in `items`.
pub fn order_by_nearest_neighbor<T: Planar>(items: &[T]) -> Vec<&T> {
    let mut remaining: Vec<&T> = items.iter().collect();
    let mut ordered = Vec::with_capacity(remaining.len());

    let Some(seed) = first_min_by(&remaining, |item| item.x()) else {
        return ordered;
    };
    let mut current = remaining.remove(seed);
    ordered.push(current);

    loop {
        let Some(next) = first_min_by(&remaining, |item| distance(current, *item)) else {
            break;
        };
        current = remaining.remove(next);
        ordered.push(current);
    }
    ordered
}

/// Position of the first element minimizing `key`.
fn first_min_by<T, F: Fn(&T) -> f64>(items: &[T], key: F) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, item) in items.iter().enumerate() {
        let k = key(item);
        let better = match best {
            None => true,
            Some((_, best_k)) => k < best_k,
        };
        if better {
            best = Some((i, k));
        }
    }
    best.map(|(i, _)| i)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
