//! Splitting one trip into consecutive segments.
//!
//! The first window is treated as the trip's first segment and the last
//! window as its last, so the leading and trailing parts of the trail and
//! event list always end up somewhere.

use std::time::Instant;

use log::info;

use crate::{SegmentConfig, SegmentWindow, SegmentationError, TripRecord, TripSegmenter};

/// Segment `parent` once per window, in order.
///
/// Fails on the first window that cannot be segmented; no segments are
/// returned in that case.
///
/// # Example
/// ```
/// use trip_segmenter::{split_trip, SegmentConfig, SegmentWindow, TrailPoint, TripRecord, TripSummary};
///
/// let trail: Vec<TrailPoint> = (0..=4)
///     .map(|i| TrailPoint::new(i * 10_000, 51.5 + i as f64 * 0.001, -0.13))
///     .collect();
/// let record = TripRecord::new(trail, vec![], TripSummary::new(450.0));
///
/// let windows = SegmentWindow::from_boundaries(&[0, 15_000, 40_000]);
/// let segments = split_trip(&record, &windows, &SegmentConfig::default()).unwrap();
///
/// assert_eq!(segments.len(), 2);
/// let total: f64 = segments.iter().map(|s| s.trip.distance).sum();
/// assert!((total - 450.0).abs() < 0.5);
/// ```
pub fn split_trip(
    parent: &TripRecord,
    windows: &[SegmentWindow],
    config: &SegmentConfig,
) -> Result<Vec<TripRecord>, SegmentationError> {
    let start = Instant::now();

    let segments = windows
        .iter()
        .enumerate()
        .map(|(i, window)| segment_window(parent, windows.len(), i, *window, config))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "[TripSegmenter] Split trip into {} segments in {:?}",
        segments.len(),
        start.elapsed()
    );

    Ok(segments)
}

/// Parallel version of [`split_trip`]. Segments come back in window order.
#[cfg(feature = "parallel")]
pub fn split_trip_parallel(
    parent: &TripRecord,
    windows: &[SegmentWindow],
    config: &SegmentConfig,
) -> Result<Vec<TripRecord>, SegmentationError> {
    use rayon::prelude::*;

    let start = Instant::now();

    let segments = windows
        .par_iter()
        .enumerate()
        .map(|(i, window)| segment_window(parent, windows.len(), i, *window, config))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "[TripSegmenter] Split trip into {} segments in {:?} (parallel)",
        segments.len(),
        start.elapsed()
    );

    Ok(segments)
}

fn segment_window(
    parent: &TripRecord,
    count: usize,
    index: usize,
    window: SegmentWindow,
    config: &SegmentConfig,
) -> Result<TripRecord, SegmentationError> {
    let is_first = index == 0;
    let is_last = index + 1 == count;
    TripSegmenter::new(parent, window, is_first, is_last, config)?.segment_record()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Event, TrailPoint, TripSummary};

    /// Eastbound then northbound trail, one ping every 10 s.
    fn sample_record() -> TripRecord {
        let mut trail: Vec<TrailPoint> = (0..=5)
            .map(|i| TrailPoint::new(i * 10_000, 51.500, -0.130 + i as f64 * 0.0015))
            .collect();
        trail.extend((1..=5).map(|i| TrailPoint::new(50_000 + i * 10_000, 51.500 + i as f64 * 0.001, -0.1225)));

        let recorded = crate::geo_utils::trail_length_km(&trail) * 1000.0 * 0.97;
        let events = vec![Event::new(12_000, 38_000), Event::new(71_000, 99_000)];
        TripRecord::new(trail, events, TripSummary::new(recorded))
    }

    fn config() -> SegmentConfig {
        SegmentConfig::new(0.0, 0.0)
    }

    #[test]
    fn test_distance_is_conserved() {
        let record = sample_record();
        let windows = SegmentWindow::from_boundaries(&[0, 15_000, 37_000, 52_000, 81_000, 100_000]);
        let segments = split_trip(&record, &windows, &config()).unwrap();

        let total: f64 = segments.iter().map(|s| s.trip.distance).sum();
        let relative = (total - record.trip.distance).abs() / record.trip.distance;
        assert!(relative < 1e-4, "total {} vs recorded {}", total, record.trip.distance);
    }

    #[test]
    fn test_segments_cover_the_trip() {
        let record = sample_record();
        let windows = SegmentWindow::from_boundaries(&[0, 15_000, 37_000, 52_000, 81_000, 100_000]);
        let segments = split_trip(&record, &windows, &config()).unwrap();

        assert_eq!(segments[0].trail[0].timestamp, 0);
        assert_eq!(segments[segments.len() - 1].trail.last().unwrap().timestamp, 100_000);
        for (segment, window) in segments.iter().zip(&windows) {
            assert!(segment.trail[0].timestamp <= window.start.max(0));
            assert!(segment.trail.last().unwrap().timestamp >= window.end);
        }
        for pair in segments.windows(2) {
            assert!(pair[0].trail.last().unwrap().timestamp >= pair[1].trail[0].timestamp);
        }
    }

    #[test]
    fn test_only_first_and_last_are_stretched() {
        let record = sample_record();
        let windows = SegmentWindow::from_boundaries(&[5_000, 33_000, 95_000]);
        let segments = split_trip(&record, &windows, &config()).unwrap();

        // The ends reach the first and last recorded points
        assert_eq!(segments[0].trail[0].timestamp, 0);
        assert_eq!(segments[1].trail.last().unwrap().timestamp, 100_000);
        // The inner boundary is interpolated on both sides
        assert_eq!(segments[0].trail.last().unwrap().timestamp, 33_000);
        assert_eq!(segments[1].trail[0].timestamp, 33_000);
    }

    #[test]
    fn test_single_window_is_the_whole_trip() {
        let record = sample_record();
        let segments = split_trip(&record, &[SegmentWindow::new(0, 100_000)], &config()).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].trail, record.trail);
        assert_eq!(segments[0].events, record.events);
    }

    #[test]
    fn test_failure_is_atomic() {
        let record = sample_record();
        let windows = vec![
            SegmentWindow::new(0, 40_000),
            SegmentWindow::new(120_000, 130_000),
            SegmentWindow::new(130_000, 140_000),
        ];
        let err = split_trip(&record, &windows, &config()).unwrap_err();
        assert_eq!(err.window(), Some((120_000, 130_000)));
    }

    #[test]
    fn test_no_windows_no_segments() {
        let record = sample_record();
        assert!(split_trip(&record, &[], &config()).unwrap().is_empty());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let record = sample_record();
        let windows = SegmentWindow::from_boundaries(&[0, 15_000, 37_000, 52_000, 81_000, 100_000]);

        let sequential = split_trip(&record, &windows, &config()).unwrap();
        let parallel = split_trip_parallel(&record, &windows, &config()).unwrap();
        assert_eq!(sequential, parallel);
    }
}
