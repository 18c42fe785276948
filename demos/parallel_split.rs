//! Split a long trip into many one-minute windows on the rayon pool.
//!
//! Run with: cargo run --release --example parallel_split --features parallel

use std::time::Instant;

use trip_segmenter::{
    split_trip, split_trip_parallel, SegmentConfig, SegmentWindow, TrailPoint, TripRecord, TripSummary,
};

fn main() {
    env_logger::init();

    // Two hours of 1 Hz pings wandering north-east
    let trail: Vec<TrailPoint> = (0..7_200)
        .map(|i| {
            let t = i as f64;
            TrailPoint::new(i * 1_000, 48.8566 + t * 0.00012, 2.3522 + t * 0.00009 + (t / 60.0).sin() * 0.0005)
        })
        .collect();
    let recorded_m = trail_length_m(&trail);
    let record = TripRecord::new(trail, Vec::new(), TripSummary::new(recorded_m));

    // One-minute windows offset from the ping grid so every boundary interpolates
    let mut boundaries: Vec<i64> = (0..120).map(|m| m * 60_000 + 500).collect();
    boundaries[0] = 0;
    boundaries.push(7_199_000);
    let windows = SegmentWindow::from_boundaries(&boundaries);
    let config = SegmentConfig::default();

    println!("Parallel Split Example\n");
    println!("Trail: {} points, {:.0} m, {} windows\n", record.trail.len(), recorded_m, windows.len());

    let start = Instant::now();
    let sequential = split_trip(&record, &windows, &config).expect("sequential split");
    let sequential_time = start.elapsed();

    let start = Instant::now();
    let parallel = split_trip_parallel(&record, &windows, &config).expect("parallel split");
    let parallel_time = start.elapsed();

    assert_eq!(sequential, parallel);
    let total: f64 = parallel.iter().map(|s| s.trip.distance).sum();

    println!("Sequential: {:?}", sequential_time);
    println!("Parallel:   {:?}", parallel_time);
    println!("Segment distances add up to {:.1} m (recorded {:.1} m)", total, recorded_m);
}

fn trail_length_m(trail: &[TrailPoint]) -> f64 {
    trip_segmenter::geo_utils::trail_length_km(trail) * 1000.0
}
