//! High-level facade for the `dartsight-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the underlying crates
//! - the [`VisionPipeline`] orchestrator that sequences calibration,
//!   reference-frame management and per-frame dart detection
//! - a frame-cadence gate for live sources ([`FrameThrottle`])
//! - (feature `image`) adapters between `image` buffers and pipeline frames
//!
//! ## Quickstart
//!
//! ```no_run
//! use dartsight::imageio;
//! use dartsight::pipeline::VisionPipeline;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let board = imageio::load_gray("board.png")?;
//! let mut pipeline = VisionPipeline::default();
//!
//! let (calibration, debug) = pipeline.calibrate(&imageio::gray_frame(&board)?);
//! println!("{}", debug.reason());
//!
//! if calibration.is_some() {
//!     let result = pipeline.process_frame(&imageio::gray_frame(&board)?);
//!     println!("darts: {} fallback: {}", result.darts.len(), result.needs_fallback);
//! }
//! # Ok(())
//! # }
//! ```

pub use dartsight_calib as calib;
pub use dartsight_core as core;
pub use dartsight_detect as detect;
pub use dartsight_score as score;

pub use dartsight_calib::{BoardCalibration, CalibrationDebug, CalibrationFailure};
pub use dartsight_core::{FrameError, FrameView};
pub use dartsight_detect::DetectedDart;
pub use dartsight_score::{calculate_score, DartScore};

pub mod pipeline;
pub mod throttle;

pub use pipeline::{FrameResult, VisionPipeline, CONFIDENCE_THRESHOLD};
pub use throttle::FrameThrottle;

#[cfg(feature = "image")]
pub mod imageio;
