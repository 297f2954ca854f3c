//! Trajectory samples and dataset records.
//!
//! A trajectory is the ordered sequence of observed positions for one
//! tracked pedestrian. Samples arrive from the dataset export as
//! `{sceneId, uniqueTrackId, localX, localY}` records, in no guaranteed
//! order; everything downstream relies on ascending `sceneId`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::resolver::Planar;
use crate::types::{SceneId, TrackId};

/// One observed point of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectorySample {
    pub scene_id: SceneId,
    #[serde(alias = "uniqueTrackId")]
    pub track_id: TrackId,
    #[serde(alias = "localX")]
    pub x: f64,
    #[serde(alias = "localY")]
    pub y: f64,
}

impl TrajectorySample {
    pub fn new(scene_id: SceneId, track_id: TrackId, x: f64, y: f64) -> Self {
        Self {
            scene_id,
            track_id,
            x,
            y,
        }
    }
}

impl Planar for TrajectorySample {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

/// Sort samples by ascending `sceneId`. Stable, so duplicate scene ids keep
/// their input order.
pub fn sort_by_scene(samples: &mut [TrajectorySample]) {
    samples.sort_by_key(|s| s.scene_id);
}

/// First and last sample by `sceneId`, independent of slice order.
///
/// Returns `None` for an empty slice.
pub fn endpoints(samples: &[TrajectorySample]) -> Option<(&TrajectorySample, &TrajectorySample)> {
    let first = samples.iter().min_by_key(|s| s.scene_id)?;
    let last = samples.iter().max_by_key(|s| s.scene_id)?;
    Some((first, last))
}

/// Check that every sample belongs to `track_id` and has finite coordinates.
pub fn validate_samples(track_id: TrackId, samples: &[TrajectorySample]) -> Result<(), CoreError> {
    for (i, s) in samples.iter().enumerate() {
        if s.track_id != track_id {
            return Err(CoreError::Validation(format!(
                "sample {i} belongs to track {} but was loaded for track {track_id}",
                s.track_id
            )));
        }
        if !s.x.is_finite() || !s.y.is_finite() {
            return Err(CoreError::Validation(format!(
                "sample {i} of track {track_id} has non-finite coordinates"
            )));
        }
    }
    Ok(())
}

/// Parse the dataset export (a JSON array of sample records).
pub fn parse_dataset(json: &str) -> Result<Vec<TrajectorySample>, CoreError> {
    serde_json::from_str(json)
        .map_err(|e| CoreError::Validation(format!("invalid trajectory dataset: {e}")))
}

/// Split a flat record list into per-track sample sequences, each sorted by
/// `sceneId`.
pub fn group_by_track(
    records: impl IntoIterator<Item = TrajectorySample>,
) -> BTreeMap<TrackId, Vec<TrajectorySample>> {
    let mut tracks: BTreeMap<TrackId, Vec<TrajectorySample>> = BTreeMap::new();
    for record in records {
        tracks.entry(record.track_id).or_default().push(record);
    }
    for samples in tracks.values_mut() {
        sort_by_scene(samples);
    }
    tracks
}
