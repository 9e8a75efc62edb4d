//! Adapters between `image` buffers and pipeline frames.

use std::path::Path;

use dartsight_core::{FrameError, FrameView};

/// Errors from loading or adapting image files.
#[derive(thiserror::Error, Debug)]
pub enum ImageIoError {
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Load an image file and convert it to 8-bit grayscale.
pub fn load_gray(path: impl AsRef<Path>) -> Result<::image::GrayImage, ImageIoError> {
    Ok(::image::ImageReader::open(path)?.decode()?.to_luma8())
}

/// View a grayscale buffer as a single-channel pipeline frame.
pub fn gray_frame(img: &::image::GrayImage) -> Result<FrameView<'_>, FrameError> {
    FrameView::new(img.width() as usize, img.height() as usize, 1, img.as_raw())
}

/// View an RGBA buffer as a four-channel pipeline frame.
pub fn rgba_frame(img: &::image::RgbaImage) -> Result<FrameView<'_>, FrameError> {
    FrameView::new(img.width() as usize, img.height() as usize, 4, img.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_buffer_round_trips_into_a_frame() {
        let img = ::image::GrayImage::from_raw(4, 3, vec![7; 12]).unwrap();
        let frame = gray_frame(&img).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.channels(), 1);
    }

    #[test]
    fn rgba_buffer_reports_four_channels() {
        let img = ::image::RgbaImage::from_raw(2, 2, vec![0; 16]).unwrap();
        let frame = rgba_frame(&img).unwrap();
        assert_eq!(frame.channels(), 4);
    }
}
