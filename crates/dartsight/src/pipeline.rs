//! Per-frame orchestration of calibration, reference state and scoring.

use serde::{Deserialize, Serialize};

use dartsight_calib::{BoardCalibration, BoardDetectParams, BoardDetector, CalibrationDebug};
use dartsight_core::FrameView;
use dartsight_detect::{DartDetectParams, DartDetector, DetectedDart};
use dartsight_score::{calculate_score, DartScore};

/// Below this, calibration and detection results are flagged for manual
/// fallback instead of being trusted.
pub const CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Output of one processed frame.
///
/// `needs_fallback` is a signal, not an error: scores are filled in
/// either way and the caller decides whether to offer manual entry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FrameResult {
    pub darts: Vec<DetectedDart>,
    pub scores: Vec<DartScore>,
    pub needs_fallback: bool,
}

impl FrameResult {
    fn fallback() -> Self {
        Self {
            darts: Vec::new(),
            scores: Vec::new(),
            needs_fallback: true,
        }
    }

    /// Most trustworthy dart of this frame, ties broken by distance to
    /// the board center. Heuristic: discovery order says nothing about
    /// throw order.
    pub fn best_dart(&self) -> Option<(&DetectedDart, &DartScore)> {
        let mut best: Option<usize> = None;
        for (i, dart) in self.darts.iter().enumerate() {
            let better = match best {
                None => true,
                Some(j) => {
                    let other = &self.darts[j];
                    dart.confidence > other.confidence
                        || (dart.confidence == other.confidence
                            && dart.tip_mm.coords.norm_squared() < other.tip_mm.coords.norm_squared())
                }
            };
            if better {
                best = Some(i);
            }
        }
        best.map(|i| (&self.darts[i], &self.scores[i]))
    }
}

/// Owns calibration and reference-frame lifecycle.
///
/// Single-threaded, one frame at a time; every call completes fully and
/// only the reference frame survives between calls.
pub struct VisionPipeline {
    board_detector: BoardDetector,
    dart_detector: DartDetector,
    calibration: Option<BoardCalibration>,
    /// Frame size the current calibration was computed for.
    frame_size: Option<(usize, usize)>,
}

impl Default for VisionPipeline {
    fn default() -> Self {
        Self::new(BoardDetectParams::default(), DartDetectParams::default())
    }
}

impl VisionPipeline {
    pub fn new(board_params: BoardDetectParams, dart_params: DartDetectParams) -> Self {
        Self {
            board_detector: BoardDetector::new(board_params),
            dart_detector: DartDetector::new(dart_params),
            calibration: None,
            frame_size: None,
        }
    }

    pub fn calibration(&self) -> Option<&BoardCalibration> {
        self.calibration.as_ref()
    }

    /// Calibrate on one frame.
    ///
    /// The result replaces the stored calibration unconditionally, even
    /// when detection failed, so a stale board position cannot linger.
    /// The reference frame is rebuilt from this same frame only when the
    /// new calibration clears the confidence threshold.
    pub fn calibrate(
        &mut self,
        frame: &FrameView<'_>,
    ) -> (Option<BoardCalibration>, CalibrationDebug) {
        let (calibration, debug) = self.board_detector.detect(frame);
        self.calibration = calibration;
        self.frame_size = calibration
            .is_some()
            .then_some((frame.width(), frame.height()));

        match &calibration {
            Some(c) if c.confidence > CONFIDENCE_THRESHOLD => {
                self.dart_detector.set_reference(frame);
            }
            Some(c) => {
                log::info!(
                    "calibration confidence {:.2} below threshold; reference frame not rebuilt",
                    c.confidence
                );
            }
            None => {}
        }
        (calibration, debug)
    }

    /// Detect and score darts in one frame.
    ///
    /// Uncalibrated, or handed a frame of a different size than the one
    /// calibrated on, this degrades to the empty fallback result.
    pub fn process_frame(&mut self, frame: &FrameView<'_>) -> FrameResult {
        let Some(calibration) = &self.calibration else {
            return FrameResult::fallback();
        };
        if self.frame_size != Some((frame.width(), frame.height())) {
            log::warn!(
                "frame size changed since calibration ({:?} -> {}x{}); recalibrate",
                self.frame_size,
                frame.width(),
                frame.height()
            );
            return FrameResult::fallback();
        }

        let darts = self.dart_detector.detect(frame, calibration);

        let mean_confidence = if darts.is_empty() {
            0.0
        } else {
            darts.iter().map(|d| d.confidence).sum::<f32>() / darts.len() as f32
        };
        let needs_fallback = mean_confidence < CONFIDENCE_THRESHOLD;

        // score every blob; trusting them is the caller's decision
        let scores = darts
            .iter()
            .map(|d| calculate_score(d.tip_mm.x, d.tip_mm.y))
            .collect();

        FrameResult {
            darts,
            scores,
            needs_fallback,
        }
    }

    /// Rebuild the reference frame, e.g. after the operator signals the
    /// darts were pulled. Prevents removed darts from being re-detected
    /// forever.
    pub fn update_reference(&mut self, frame: &FrameView<'_>) {
        self.dart_detector.set_reference(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    fn dart(confidence: f32, x_mm: f32, y_mm: f32) -> DetectedDart {
        DetectedDart {
            tip_px: Point2::new(0.0, 0.0),
            tip_mm: Point2::new(x_mm, y_mm),
            confidence,
        }
    }

    #[test]
    fn process_frame_without_calibration_falls_back() {
        let mut pipeline = VisionPipeline::default();
        let data = vec![128u8; 64 * 64];
        let frame = FrameView::new(64, 64, 1, &data).unwrap();
        let result = pipeline.process_frame(&frame);
        assert!(result.darts.is_empty());
        assert!(result.scores.is_empty());
        assert!(result.needs_fallback);
    }

    #[test]
    fn best_dart_prefers_confidence_then_center_distance() {
        let darts = vec![dart(0.5, 10.0, 0.0), dart(0.9, 80.0, 0.0), dart(0.9, 20.0, 0.0)];
        let scores = darts
            .iter()
            .map(|d| calculate_score(d.tip_mm.x, d.tip_mm.y))
            .collect();
        let result = FrameResult {
            darts,
            scores,
            needs_fallback: false,
        };
        let (best, _) = result.best_dart().unwrap();
        assert_eq!(best.confidence, 0.9);
        assert_eq!(best.tip_mm.x, 20.0);
    }

    #[test]
    fn best_dart_on_empty_result_is_none() {
        assert!(FrameResult::fallback().best_dart().is_none());
    }
}
