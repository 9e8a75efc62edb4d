//! Board calibration from a single frame.
//!
//! Circle candidates come from the gradient-voting detector in
//! `dartsight-core`; this crate infers the concentric set belonging to one
//! physical board, derives center and scale, and attaches an explainable
//! confidence plus a diagnostic snapshot of every attempt.

mod detector;
mod params;
mod types;

pub use detector::BoardDetector;
pub use params::BoardDetectParams;
pub use types::{BoardCalibration, CalibrationDebug, CalibrationFailure, ConfidenceBreakdown};
