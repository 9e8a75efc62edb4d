//! Frame types, pure-Rust image operations and dartboard geometry.
//!
//! This crate is the capability surface the detectors are built on: an
//! opaque [`FrameView`] over caller-owned pixels, owned grayscale buffers,
//! and the small set of typed operations the pipeline needs (blur,
//! differencing, thresholding, morphology, blob extraction and circle
//! detection). It does not decode images from disk and it never retains a
//! frame beyond the call it was passed to.

pub mod blob;
pub mod board;
pub mod hough;
mod image;
mod logger;
pub mod morph;
pub mod ops;

pub use image::{to_gray, FrameError, FrameView, GrayImage, GrayImageView};
pub use logger::init_with_level;
