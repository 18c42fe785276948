//! # Trip Segmentation
//!
//! Cuts a trip record down to a single time window.
//!
//! ## Algorithm
//! 1. Copy the parent record and sort its trail by timestamp
//! 2. Select events starting inside the window, then clip events that
//!    straddle either window boundary onto that boundary
//! 3. Select trail points inside the window; interpolate a point at each
//!    boundary when the neighbouring gap is long enough in both distance
//!    and time
//! 4. If no recorded point falls inside the window, interpolate both
//!    boundaries between the recorded points on either side
//! 5. Rescale the segment distance so that segment distances add up to the
//!    parent's recorded distance
//!
//! The first and last segments of a trip are stretched to the ends of the
//! trail and event list so nothing recorded before the first window or
//! after the last one is dropped.

use log::{debug, warn};

use crate::geo_utils::trail_length_km;
use crate::interpolation::{interpolated_trail_point, requires_interpolation};
use crate::{Event, SegmentConfig, SegmentWindow, SegmentationError, TrailPoint, TripRecord, TripSummary};

/// Trail points of a segment and whether each boundary was interpolated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentTrail {
    pub points: Vec<TrailPoint>,
    /// The first point was interpolated at the window start
    pub start_interpolated: bool,
    /// The last point was interpolated at the window end
    pub end_interpolated: bool,
}

/// Produces the segment of one parent trip for one time window.
///
/// The parent record is copied on construction, so a segmenter never
/// observes later changes to the caller's record and several segmenters can
/// run side by side.
#[derive(Debug, Clone)]
pub struct TripSegmenter {
    parent: TripRecord,
    /// Window as requested by the caller
    requested: SegmentWindow,
    /// Window actually used (first segments start 1 ms early)
    window: SegmentWindow,
    is_first_segment: bool,
    is_last_segment: bool,
    config: SegmentConfig,
}

impl TripSegmenter {
    /// Prepare a segmenter for `window` of `parent`.
    ///
    /// `is_first_segment` / `is_last_segment` tell whether this window is
    /// the first / last of the full ordered list of windows for the trip.
    ///
    /// Fails if the window is inverted, the parent has fewer than two trail
    /// points, or the parent's `trip.distance` is negative or not finite.
    pub fn new(
        parent: &TripRecord,
        window: SegmentWindow,
        is_first_segment: bool,
        is_last_segment: bool,
        config: &SegmentConfig,
    ) -> Result<Self, SegmentationError> {
        if window.start > window.end {
            return Err(SegmentationError::InvalidWindow { start: window.start, end: window.end });
        }
        if parent.trail.len() < 2 {
            return Err(SegmentationError::InsufficientTrail { points: parent.trail.len() });
        }
        let distance = parent.trip.distance;
        if !distance.is_finite() || distance < 0.0 {
            return Err(SegmentationError::InvalidDistance(distance));
        }

        let mut parent = parent.clone();
        parent.trail.sort_by_key(|p| p.timestamp);

        // A point at the trip's exact start must fall inside the first window
        let effective = if is_first_segment {
            SegmentWindow::new(window.start - 1, window.end)
        } else {
            window
        };

        Ok(Self {
            parent,
            requested: window,
            window: effective,
            is_first_segment,
            is_last_segment,
            config: config.clone(),
        })
    }

    /// The window used for selection, after the first-segment adjustment.
    pub fn window(&self) -> SegmentWindow {
        self.window
    }

    pub fn requested_window(&self) -> SegmentWindow {
        self.requested
    }

    pub fn is_first_segment(&self) -> bool {
        self.is_first_segment
    }

    pub fn is_last_segment(&self) -> bool {
        self.is_last_segment
    }

    /// Events belonging to this segment.
    ///
    /// Events whose start lies in the window are kept (stretched to the
    /// first/last event for first/last segments). An event running across
    /// the window start is added at the front as a copy starting at the
    /// window start; otherwise an event running across the window end is
    /// added at the back as a copy starting at the window end.
    pub fn segment_events(&self) -> Vec<Event> {
        let SegmentWindow { start, end } = self.window;
        let events = &self.parent.events;
        let in_window = |e: &Event| start <= e.timestamp && e.timestamp <= end;

        let mut selected = match (events.iter().position(in_window), events.iter().rposition(in_window)) {
            (Some(first), Some(last)) => {
                let from = if self.is_first_segment { 0 } else { first };
                let to = if self.is_last_segment { events.len() - 1 } else { last };
                events[from..=to].to_vec()
            }
            _ => Vec::new(),
        };

        for event in events {
            if event.timestamp < start && start < event.timestamp_end {
                let mut clipped = event.clone();
                clipped.timestamp = start;
                selected.insert(0, clipped);
            } else if event.timestamp < end && end < event.timestamp_end {
                let mut clipped = event.clone();
                clipped.timestamp = end;
                selected.push(clipped);
            }
        }

        selected
    }

    /// Trail points belonging to this segment, with interpolated boundaries.
    ///
    /// Fails with [`SegmentationError::UnrepresentableWindow`] when fewer
    /// than two points result.
    pub fn segment_trail(&self) -> Result<SegmentTrail, SegmentationError> {
        let SegmentWindow { start, end } = self.window;
        let trail = &self.parent.trail;
        let count = trail.len();
        let in_window = |p: &TrailPoint| start <= p.timestamp && p.timestamp <= end;

        let segment = match (trail.iter().position(in_window), trail.iter().rposition(in_window)) {
            (Some(first), Some(last)) => {
                let from = if self.is_first_segment { 0 } else { first };
                let to = if self.is_last_segment { count - 1 } else { last };
                self.augment_with_interpolation(from, to, trail[from..=to].to_vec())
            }
            _ => {
                // The window falls between two recorded points
                match trail.iter().rposition(|p| p.timestamp <= start) {
                    Some(anchor) if anchor < count - 1 => {
                        self.augment_with_interpolation(anchor + 1, anchor, Vec::new())
                    }
                    _ => SegmentTrail::default(),
                }
            }
        };

        if segment.points.len() < 2 {
            warn!(
                "[TripSegmenter] Unable to segment trail for [{}, {}]: {} point(s) left",
                self.requested.start,
                self.requested.end,
                segment.points.len()
            );
            return Err(SegmentationError::UnrepresentableWindow {
                start: self.requested.start,
                end: self.requested.end,
            });
        }

        Ok(segment)
    }

    /// Prepend/append interpolated boundary points to `points`.
    ///
    /// `start_idx` and `end_idx` index the parent trail: the start boundary
    /// lies in the gap before `start_idx`, the end boundary in the gap after
    /// `end_idx`.
    fn augment_with_interpolation(&self, start_idx: usize, end_idx: usize, mut points: Vec<TrailPoint>) -> SegmentTrail {
        let SegmentWindow { start, end } = self.window;
        let trail = &self.parent.trail;
        let mut start_interpolated = false;
        let mut end_interpolated = false;

        let lead_s = (trail[start_idx].timestamp - start) as f64 / 1000.0;
        if start_idx > 0 && requires_interpolation(&trail[start_idx - 1], &trail[start_idx], lead_s, &self.config) {
            points.insert(0, interpolated_trail_point(&trail[start_idx - 1], &trail[start_idx], start));
            start_interpolated = true;
        }

        let tail_s = (end - trail[end_idx].timestamp) as f64 / 1000.0;
        if end_idx < trail.len() - 1
            && requires_interpolation(&trail[end_idx], &trail[end_idx + 1], tail_s, &self.config)
        {
            points.push(interpolated_trail_point(&trail[end_idx], &trail[end_idx + 1], end));
            end_interpolated = true;
        }

        debug!(
            "[TripSegmenter] [{}, {}]: {} point(s), interpolated start={} end={}",
            start,
            end,
            points.len(),
            start_interpolated,
            end_interpolated
        );

        SegmentTrail { points, start_interpolated, end_interpolated }
    }

    /// The parent record restricted to this segment.
    ///
    /// Trail and events are replaced by the segment's own; `trip.distance`
    /// is the segment's trail length scaled by the ratio of the parent's
    /// recorded distance to its trail length; `driveTime` and
    /// `averageSpeed` are recomputed from the window; start and end
    /// locations come from the segment trail except at the ends of the trip.
    /// All other fields are copied from the parent.
    pub fn segment_record(&self) -> Result<TripRecord, SegmentationError> {
        let events = self.segment_events();
        let trail = self.segment_trail()?.points;

        let segment_km = trail_length_km(&trail);
        let parent_km = self.parent.trail_length_km();
        // Coincident trails keep the recorded distance as-is
        let denominator = if parent_km == 0.0 { 1.0 } else { parent_km };
        let adjustment_factor = (self.parent.trip.distance / 1000.0) / denominator;

        let distance = adjustment_factor * segment_km * 1000.0;
        let drive_time = self.window.duration_secs();
        let average_speed = if drive_time == 0.0 { 0.0 } else { distance / drive_time };

        let parent_trip = &self.parent.trip;
        let start_location = if self.is_first_segment {
            parent_trip.start_location.clone()
        } else {
            trail.first().map(|p| p.location.clone())
        };
        let end_location = if self.is_last_segment {
            parent_trip.end_location.clone()
        } else {
            trail.last().map(|p| p.location.clone())
        };

        debug!(
            "[TripSegmenter] [{}, {}]: {:.1}m in {:.1}s (factor {:.3})",
            self.requested.start, self.requested.end, distance, drive_time, adjustment_factor
        );

        Ok(TripRecord {
            trail,
            events,
            trip: TripSummary {
                distance,
                drive_time: Some(drive_time),
                average_speed: Some(average_speed),
                start_location,
                end_location,
                extra: parent_trip.extra.clone(),
            },
            extra: self.parent.extra.clone(),
        })
    }
}
