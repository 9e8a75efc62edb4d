use dartsight_core::board::{radii, OUTER_TO_BULL_RATIO};
use dartsight_core::hough::{detect_circles, CircleCandidate};
use dartsight_core::ops::gaussian_blur;
use dartsight_core::{to_gray, FrameView};

use crate::params::BoardDetectParams;
use crate::types::{BoardCalibration, CalibrationDebug, CalibrationFailure, ConfidenceBreakdown};

const CONCENTRIC_WEIGHT: f32 = 0.4;
const BOUNDS_WEIGHT: f32 = 0.3;
const RATIO_WEIGHT: f32 = 0.3;

/// Detects the board's rings in a single frame and derives center, scale
/// and confidence. Stateless; one instance can serve any number of frames.
pub struct BoardDetector {
    params: BoardDetectParams,
}

impl BoardDetector {
    pub fn new(params: BoardDetectParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &BoardDetectParams {
        &self.params
    }

    /// Attempt calibration on one frame.
    ///
    /// Never fails hard: a `None` calibration is always paired with a
    /// diagnostic carrying the failure reason.
    pub fn detect(&self, frame: &FrameView<'_>) -> (Option<BoardCalibration>, CalibrationDebug) {
        let (w, h) = (frame.width(), frame.height());
        let tolerance = self.params.concentric_tol_frac * w.max(h) as f32;

        let mut debug = CalibrationDebug {
            frame_width: w,
            frame_height: h,
            circles: Vec::new(),
            concentric_tolerance_px: tolerance,
            concentric_group_size: 0,
            min_group_size: self.params.min_group_size,
            confidence: ConfidenceBreakdown::default(),
            failure: None,
        };

        // transient buffers; dropped with this scope
        let gray = to_gray(frame);
        let blurred = gaussian_blur(&gray.as_view(), self.params.blur_kernel, self.params.blur_sigma);
        let mut circles = detect_circles(&blurred.as_view(), &self.params.hough);

        if circles.is_empty() {
            debug.failure = Some(CalibrationFailure::NoCirclesFound);
            log::info!("calibration failed: {}", debug.reason());
            return (None, debug);
        }

        circles.sort_by(|a, b| a.radius.total_cmp(&b.radius));
        debug.circles = circles.clone();

        let group = strongest_concentric_group(&circles, tolerance);
        debug.concentric_group_size = group.len();

        if group.len() < self.params.min_group_size {
            debug.failure = Some(CalibrationFailure::InsufficientConcentricGroup {
                found: group.len(),
                required: self.params.min_group_size,
            });
            log::info!("calibration failed: {}", debug.reason());
            return (None, debug);
        }

        // smallest ring stands in for the bull, largest for the outer double
        let bull = group[0];
        let outer = group[group.len() - 1];
        let pixels_per_mm = outer.radius / radii::DOUBLE_OUTER;

        let breakdown = assess_confidence(&group, w, h, &self.params);
        debug.confidence = breakdown;

        let calibration = BoardCalibration {
            center: bull.center,
            outer_radius: outer.radius,
            pixels_per_mm,
            confidence: breakdown.total,
        };
        log::info!(
            "calibrated: center=({:.1},{:.1}) outer={:.1}px ppm={:.3} confidence={:.2}",
            calibration.center.x,
            calibration.center.y,
            calibration.outer_radius,
            calibration.pixels_per_mm,
            calibration.confidence
        );
        (Some(calibration), debug)
    }
}

/// Set of candidates whose centers agree within the tolerance, with the
/// strongest accumulated edge-pixel support.
///
/// Every candidate is tried as pivot; noise can produce spuriously small
/// circles, so the smallest radius is not assumed to be the bull. Groups
/// are ranked by summed votes rather than member count: a stray center
/// can emit several barely-supported radius peaks, and counting those
/// would let it outrank a handful of well-supported rings. With
/// `circles` sorted by radius, ties resolve to the smaller-radius pivot,
/// and the returned group stays radius-sorted.
fn strongest_concentric_group(circles: &[CircleCandidate], tolerance: f32) -> Vec<CircleCandidate> {
    let tol2 = tolerance * tolerance;
    let mut best: Vec<CircleCandidate> = Vec::new();
    let mut best_strength = 0u64;
    for pivot in circles {
        let group: Vec<CircleCandidate> = circles
            .iter()
            .filter(|c| (c.center - pivot.center).norm_squared() < tol2)
            .copied()
            .collect();
        let strength: u64 = group.iter().map(|c| u64::from(c.votes)).sum();
        if strength > best_strength {
            best_strength = strength;
            best = group;
        }
    }
    best
}

/// Weighted-sum confidence over independent heuristics, clamped to [0, 1].
fn assess_confidence(
    group: &[CircleCandidate],
    frame_width: usize,
    frame_height: usize,
    params: &BoardDetectParams,
) -> ConfidenceBreakdown {
    let concentric_score =
        (group.len() as f32 / params.ideal_group_size as f32).min(1.0) * CONCENTRIC_WEIGHT;

    let center = group[0].center;
    let margin = params.bounds_margin_frac;
    let (w, h) = (frame_width as f32, frame_height as f32);
    let in_bounds = center.x > w * margin
        && center.x < w * (1.0 - margin)
        && center.y > h * margin
        && center.y < h * (1.0 - margin);
    let bounds_score = if in_bounds { BOUNDS_WEIGHT } else { 0.0 };

    let actual_ratio = group[group.len() - 1].radius / group[0].radius;
    let ratio_error = (actual_ratio - OUTER_TO_BULL_RATIO).abs() / OUTER_TO_BULL_RATIO;
    let ratio_score = (RATIO_WEIGHT - ratio_error).max(0.0);

    let total = (concentric_score + bounds_score + ratio_score).clamp(0.0, 1.0);
    ConfidenceBreakdown {
        concentric_score,
        bounds_score,
        ratio_score,
        ratio_error,
        total,
    }
}
