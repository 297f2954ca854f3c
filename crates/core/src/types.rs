/// Dataset track identifier (`uniqueTrackId` in the source data).
pub type TrackId = i32;

/// Frame/scene sequence number of a sample within a track.
pub type SceneId = i32;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
