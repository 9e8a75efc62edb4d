use serde::{Deserialize, Serialize};

use dartsight_core::hough::HoughParams;

/// Parameters for board detection.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoardDetectParams {
    /// Gaussian kernel size for pre-blur (odd). 9 suppresses the board
    /// face texture without washing out the wire rings.
    pub blur_kernel: usize,
    pub blur_sigma: f32,
    #[serde(default)]
    pub hough: HoughParams,
    /// Concentric center tolerance as a fraction of max(frame width,
    /// frame height).
    pub concentric_tol_frac: f32,
    /// Circles that must share a center before the board is trusted.
    pub min_group_size: usize,
    /// Group size at which the concentric sub-score saturates.
    pub ideal_group_size: usize,
    /// Frame inset (fraction per side) the center must fall inside to
    /// earn the bounds bonus.
    pub bounds_margin_frac: f32,
}

impl Default for BoardDetectParams {
    fn default() -> Self {
        Self {
            blur_kernel: 9,
            blur_sigma: 2.0,
            hough: HoughParams::default(),
            concentric_tol_frac: 0.03,
            min_group_size: 2,
            ideal_group_size: 4,
            bounds_margin_frac: 0.1,
        }
    }
}
