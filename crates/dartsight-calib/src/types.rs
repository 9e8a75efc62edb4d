use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use dartsight_core::hough::CircleCandidate;

/// Geometry of a calibrated board in one camera setup.
///
/// Immutable: recalibration replaces the whole value. `pixels_per_mm` is
/// always `outer_radius / 170.0` (the outer double ring radius in mm).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoardCalibration {
    /// Bullseye position, px.
    pub center: Point2<f32>,
    /// Outer double ring radius, px.
    pub outer_radius: f32,
    pub pixels_per_mm: f32,
    /// Trust in this calibration, clamped to [0, 1].
    pub confidence: f32,
}

/// Why a calibration attempt produced no board.
///
/// Nothing here is fatal: the caller simply retries on the next frame.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationFailure {
    #[error("no circles found in frame")]
    NoCirclesFound,
    #[error("insufficient concentric group: {found} circle(s) share a center, need {required}")]
    InsufficientConcentricGroup { found: usize, required: usize },
}

/// The confidence sub-scores, kept separate so thresholds can be tuned
/// from logs without re-instrumenting.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    /// More corroborating rings, more trust. Saturates at the ideal
    /// group size.
    pub concentric_score: f32,
    /// Flat bonus when the center sits inside the frame margin inset.
    pub bounds_score: f32,
    /// Rewards an outer/bull radius ratio near the regulation board.
    pub ratio_score: f32,
    /// Raw relative error behind `ratio_score`.
    pub ratio_error: f32,
    /// Clamped sum of the sub-scores.
    pub total: f32,
}

/// Diagnostic snapshot of one calibration attempt, success or failure.
///
/// Observability only; nothing downstream scores from it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalibrationDebug {
    pub frame_width: usize,
    pub frame_height: usize,
    /// Every raw circle candidate, sorted by radius.
    pub circles: Vec<CircleCandidate>,
    /// Center tolerance used for concentric grouping, px.
    pub concentric_tolerance_px: f32,
    /// Size of the winning concentric group (0 when no circles).
    pub concentric_group_size: usize,
    pub min_group_size: usize,
    pub confidence: ConfidenceBreakdown,
    pub failure: Option<CalibrationFailure>,
}

impl CalibrationDebug {
    /// Human-readable outcome for overlays and logs.
    pub fn reason(&self) -> String {
        match &self.failure {
            Some(f) => f.to_string(),
            None => format!(
                "calibrated from {} concentric circle(s), confidence {:.2}",
                self.concentric_group_size, self.confidence.total
            ),
        }
    }
}
