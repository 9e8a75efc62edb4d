use serde::{Deserialize, Serialize};

/// Parameters for dart detection.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DartDetectParams {
    /// Gaussian kernel for smoothing both the reference and the current
    /// frame (odd). Sigma <= 0 derives one from the kernel size.
    pub blur_kernel: usize,
    pub blur_sigma: f32,
    /// Binary threshold on the absolute difference (0..255 scale).
    pub diff_threshold: u8,
    /// Elliptical kernel size for the open/close cleanup passes.
    pub morph_kernel: usize,
    /// Blobs below this pixel area are noise.
    pub min_area: f32,
    /// Blobs rounder than this are hands and shadows, not darts.
    pub min_aspect_ratio: f32,
    /// Area at which the size factor of the confidence saturates.
    pub full_confidence_area: f32,
    /// Aspect ratio above which the shape factor is 1.0 instead of the
    /// weak factor.
    pub strong_aspect_ratio: f32,
    pub weak_aspect_factor: f32,
}

impl Default for DartDetectParams {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            blur_sigma: 0.0,
            diff_threshold: 30,
            morph_kernel: 3,
            min_area: 100.0,
            min_aspect_ratio: 2.0,
            full_confidence_area: 500.0,
            strong_aspect_ratio: 3.0,
            weak_aspect_factor: 0.7,
        }
    }
}
