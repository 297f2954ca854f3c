#![allow(dead_code)]

use knotline_core::config::AnnotationConfig;
use knotline_core::trajectory::TrajectorySample;
use knotline_core::types::TrackId;
use knotline_session::{AnnotationSession, InMemoryTrajectorySource};

pub const PASSWORD: &str = "knots-please";
pub const USERNAME: &str = "annotator";

/// A short zig-zag for `track_id`, shifted so tracks do not overlap.
pub fn zigzag(track_id: TrackId) -> Vec<TrajectorySample> {
    let offset = track_id as f64 * 10.0;
    (0..6)
        .map(|i| TrajectorySample::new(i, track_id, offset + i as f64, (i % 2) as f64))
        .collect()
}

/// Source with tracks 1, 2 and 3.
pub fn test_source() -> InMemoryTrajectorySource {
    InMemoryTrajectorySource::from_records([1, 2, 3].into_iter().flat_map(zigzag))
}

/// Default configuration with budgets {1, 2, 3} so tests place few knots.
pub fn test_config() -> AnnotationConfig {
    AnnotationConfig {
        default_knot_budget: 1,
        allowed_knot_budgets: vec![1, 2, 3],
        submission_password: Some(PASSWORD.to_string()),
        ..AnnotationConfig::default()
    }
}

/// Load tracks 1..=3 into a fresh session.
pub async fn loaded_session() -> AnnotationSession {
    let (session, report) = AnnotationSession::load(&test_source(), test_config(), USERNAME, &[1, 2, 3])
        .await
        .unwrap();
    assert!(report.skipped.is_empty());
    session
}

/// Place one knot near the middle of every trajectory.
pub fn complete_all(session: &mut AnnotationSession) {
    session.go_to(0).unwrap();
    loop {
        let track_id = session.current().track_id();
        let x = track_id as f64 * 10.0 + 2.5;
        assert!(session.place_knot(x, 0.5).unwrap().is_applied());
        if !session.next() {
            break;
        }
    }
}
