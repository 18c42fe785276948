//! Cut a recorded trip into segments at fixed boundaries.
//!
//! Run with: RUST_LOG=debug cargo run --example segment_trip

use serde_json::json;
use trip_segmenter::{split_trip, SegmentConfig, SegmentWindow, TripRecord, TripSegmenter};

fn main() {
    env_logger::init();

    // A short drive north through London, one ping every 15 s
    let trail: Vec<_> = (0..12)
        .map(|i| {
            json!({
                "timestamp": 1_700_000_000_000i64 + i * 15_000,
                "location": {"latitude": 51.5000 + i as f64 * 0.0012, "longitude": -0.1278 + i as f64 * 0.0004},
                "speed": 9.5
            })
        })
        .collect();

    let record = TripRecord::from_value(json!({
        "tripId": "demo-trip",
        "trail": trail,
        "events": [
            {"timestamp": 1_700_000_040_000i64, "timestampEnd": 1_700_000_070_000i64, "type": "SPEEDING"},
            {"timestamp": 1_700_000_120_000i64, "timestampEnd": 1_700_000_125_000i64, "type": "HARSH_BRAKE"}
        ],
        "trip": {"distance": 1_650.0}
    }))
    .expect("demo record is well formed");

    let config = SegmentConfig::default();
    println!("Trip Segmentation Example\n");
    println!(
        "Config: interpolate when gap > {} km and > {} s\n",
        config.minimum_distance_km_to_interpolate, config.minimum_seconds_to_interpolate
    );

    // One window in the middle of the trip
    let window = SegmentWindow::new(1_700_000_050_000, 1_700_000_100_000);
    let segmenter = TripSegmenter::new(&record, window, false, false, &config).expect("valid window");
    match segmenter.segment_trail() {
        Ok(trail) => println!(
            "1. Window {:?}: {} points (interpolated start={}, end={})\n",
            window,
            trail.points.len(),
            trail.start_interpolated,
            trail.end_interpolated
        ),
        Err(e) => println!("1. Window {:?}: {}\n", window, e),
    }

    // The whole trip in three pieces
    let windows = SegmentWindow::from_boundaries(&[
        1_700_000_000_000,
        1_700_000_050_000,
        1_700_000_100_000,
        1_700_000_165_000,
    ]);
    println!("2. Split into {} windows:", windows.len());
    match split_trip(&record, &windows, &config) {
        Ok(segments) => {
            for (i, segment) in segments.iter().enumerate() {
                println!(
                    "   #{}: {:>2} points, {:>2} events, {:>7.1} m, {:>5.1} s, {:>5.2} m/s",
                    i + 1,
                    segment.trail.len(),
                    segment.events.len(),
                    segment.trip.distance,
                    segment.trip.drive_time.unwrap_or_default(),
                    segment.trip.average_speed.unwrap_or_default()
                );
            }
            let total: f64 = segments.iter().map(|s| s.trip.distance).sum();
            println!("   total {:.1} m (recorded {:.1} m)\n", total, record.trip.distance);
        }
        Err(e) => println!("   failed: {}\n", e),
    }

    // A window past the end of the trail cannot be represented
    let late = SegmentWindow::new(1_700_000_200_000, 1_700_000_230_000);
    let segmenter = TripSegmenter::new(&record, late, false, false, &config).expect("valid window");
    if let Err(e) = segmenter.segment_record() {
        println!("3. Window {:?}: {}", late, e);
    }
}
