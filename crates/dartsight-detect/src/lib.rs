//! Dart detection against a stored reference frame.
//!
//! The detector owns a single smoothed grayscale baseline of the board at
//! rest. Each call diffs the current frame against it, cleans the mask,
//! and keeps elongated blobs whose shape looks like a dart shaft or
//! flight. The tip is the boundary point nearest the board center: a
//! stuck dart points inward.

mod detector;
mod params;

pub use detector::{DartDetector, DetectedDart};
pub use params::DartDetectParams;
