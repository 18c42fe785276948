//! Error type for trip segmentation.

use thiserror::Error;

/// Errors raised while building or evaluating a trip segment.
///
/// Segmentation never returns partial results: any of these means the
/// requested window produced nothing.
#[derive(Debug, Error)]
pub enum SegmentationError {
    /// The window ends before it starts.
    #[error("invalid segment window: start {start} is after end {end}")]
    InvalidWindow { start: i64, end: i64 },

    /// The parent trip has too few trail points to be segmented at all.
    #[error("parent trail has {points} point(s), at least 2 are required")]
    InsufficientTrail { points: usize },

    /// The parent trip's recorded distance is negative or not a number.
    #[error("parent trip distance {0} is not a finite, non-negative value")]
    InvalidDistance(f64),

    /// Fewer than two trail points remain for the window after extraction
    /// and interpolation.
    #[error("unable to segment trail for window [{start}, {end}]")]
    UnrepresentableWindow { start: i64, end: i64 },

    /// A trip record or config document could not be decoded.
    #[error("malformed trip document: {0}")]
    Json(#[from] serde_json::Error),
}

impl SegmentationError {
    /// The requested window, for errors that carry one.
    pub fn window(&self) -> Option<(i64, i64)> {
        match self {
            Self::InvalidWindow { start, end } | Self::UnrepresentableWindow { start, end } => {
                Some((*start, *end))
            }
            _ => None,
        }
    }
}
