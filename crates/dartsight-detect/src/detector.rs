use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use dartsight_calib::BoardCalibration;
use dartsight_core::morph::{close, elliptical_kernel, open};
use dartsight_core::ops::{absdiff, gaussian_blur, threshold_binary};
use dartsight_core::{blob::extract_blobs, to_gray, FrameView, GrayImage};

use crate::params::DartDetectParams;

/// One dart-like blob found in a frame.
///
/// Ephemeral: results are not carried across frames, and their order is
/// blob-discovery order, not throw chronology.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DetectedDart {
    /// Estimated tip position, px.
    pub tip_px: Point2<f32>,
    /// Tip offset from the board center, mm.
    pub tip_mm: Point2<f32>,
    /// Per-blob trust in [0, 1].
    pub confidence: f32,
}

/// Frame-differencing dart detector.
///
/// Owns the one resource that outlives a call: the smoothed grayscale
/// reference frame. Replacing it is atomic from the caller's view; the
/// old baseline is dropped before `set_reference` returns.
pub struct DartDetector {
    params: DartDetectParams,
    reference: Option<GrayImage>,
}

impl DartDetector {
    pub fn new(params: DartDetectParams) -> Self {
        Self {
            params,
            reference: None,
        }
    }

    pub fn params(&self) -> &DartDetectParams {
        &self.params
    }

    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Store this frame as the dart-free baseline, replacing any prior one.
    pub fn set_reference(&mut self, frame: &FrameView<'_>) {
        let gray = to_gray(frame);
        let smoothed = gaussian_blur(
            &gray.as_view(),
            self.params.blur_kernel,
            self.params.blur_sigma,
        );
        log::debug!(
            "reference frame rebuilt ({}x{})",
            smoothed.width,
            smoothed.height
        );
        self.reference = Some(smoothed);
    }

    pub fn clear_reference(&mut self) {
        self.reference = None;
    }

    /// Find dart-like blobs that appeared since the reference frame.
    ///
    /// Without a reference this returns an empty vector; that is a normal
    /// state before the first confident calibration, not an error.
    pub fn detect(
        &self,
        frame: &FrameView<'_>,
        calibration: &BoardCalibration,
    ) -> Vec<DetectedDart> {
        let Some(reference) = &self.reference else {
            log::debug!("dart detection skipped: no reference frame");
            return Vec::new();
        };

        // transient buffers; all dropped with this scope
        let gray = to_gray(frame);
        let smoothed = gaussian_blur(
            &gray.as_view(),
            self.params.blur_kernel,
            self.params.blur_sigma,
        );
        let diff = match absdiff(&reference.as_view(), &smoothed.as_view()) {
            Ok(diff) => diff,
            Err(e) => {
                log::warn!("dart detection skipped: {e}");
                return Vec::new();
            }
        };
        let mask = threshold_binary(&diff.as_view(), self.params.diff_threshold);
        let kernel = elliptical_kernel(self.params.morph_kernel);
        let opened = open(&mask.as_view(), &kernel);
        let cleaned = close(&opened.as_view(), &kernel);

        let mut darts = Vec::new();
        for blob in extract_blobs(&cleaned.as_view()) {
            if blob.area < self.params.min_area {
                continue;
            }
            let aspect = blob.rect.aspect_ratio();
            if aspect < self.params.min_aspect_ratio {
                continue;
            }

            let Some(tip_px) = nearest_point(&blob.border, calibration.center) else {
                continue;
            };
            let tip_mm = (tip_px - calibration.center) / calibration.pixels_per_mm;

            let size_factor = (blob.area / self.params.full_confidence_area).min(1.0);
            let shape_factor = if aspect > self.params.strong_aspect_ratio {
                1.0
            } else {
                self.params.weak_aspect_factor
            };
            darts.push(DetectedDart {
                tip_px,
                tip_mm: Point2::from(tip_mm),
                confidence: size_factor * shape_factor,
            });
        }
        log::debug!("dart detection: {} blob(s) accepted", darts.len());
        darts
    }
}

fn nearest_point(points: &[Point2<f32>], target: Point2<f32>) -> Option<Point2<f32>> {
    points
        .iter()
        .min_by(|a, b| {
            (*a - target)
                .norm_squared()
                .total_cmp(&(*b - target).norm_squared())
        })
        .copied()
}
