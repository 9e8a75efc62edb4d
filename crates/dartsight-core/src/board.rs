//! Physical dartboard geometry (official BDO/WDF dimensions).
//!
//! All radii are millimetres from the board center. Pixel-space results
//! are converted into this frame before scoring, so scores are
//! resolution-independent.

/// Ring radii in mm from center.
pub mod radii {
    pub const BULL: f32 = 6.35;
    pub const OUTER_BULL: f32 = 16.0;
    pub const TREBLE_INNER: f32 = 99.0;
    pub const TREBLE_OUTER: f32 = 107.0;
    pub const DOUBLE_INNER: f32 = 162.0;
    pub const DOUBLE_OUTER: f32 = 170.0;
}

/// Segment numbers in clockwise order starting from 12 o'clock.
pub const SEGMENT_ORDER: [u32; 20] = [
    20, 1, 18, 4, 13, 6, 10, 15, 2, 17, 3, 19, 7, 16, 8, 11, 14, 9, 12, 5,
];

/// Angular width of one segment in degrees.
pub const SEGMENT_ARC_DEG: f32 = 18.0;

/// Expected outer-double to bull radius ratio of a regulation board.
pub const OUTER_TO_BULL_RATIO: f32 = radii::DOUBLE_OUTER / radii::BULL;
