use thiserror::Error;

/// Errors raised when wrapping or combining pixel buffers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid frame buffer length (expected {expected} bytes, got {got})")]
    InvalidBufferLength { expected: usize, got: usize },

    #[error("invalid frame dimensions (width={width}, height={height}, channels={channels})")]
    InvalidDimensions {
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("image size mismatch ({aw}x{ah} vs {bw}x{bh})")]
    SizeMismatch {
        aw: usize,
        ah: usize,
        bw: usize,
        bh: usize,
    },
}

/// Borrowed view over one caller-owned frame.
///
/// Pixels are interleaved row-major 8-bit samples with 1 (gray), 3 (RGB)
/// or 4 (RGBA) channels. The view is valid for a single pipeline call;
/// nothing downstream stores it.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    width: usize,
    height: usize,
    channels: usize,
    data: &'a [u8],
}

impl<'a> FrameView<'a> {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: &'a [u8],
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 || !matches!(channels, 1 | 3 | 4) {
            return Err(FrameError::InvalidDimensions {
                width,
                height,
                channels,
            });
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .ok_or(FrameError::InvalidDimensions {
                width,
                height,
                channels,
            })?;
        if data.len() != expected {
            return Err(FrameError::InvalidBufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    #[inline]
    pub fn as_view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

impl<'a> GrayImageView<'a> {
    /// Sample with replicated borders.
    #[inline]
    pub fn get_clamped(&self, x: i32, y: i32) -> u8 {
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        self.data[y * self.width + x]
    }
}

/// Convert a frame to grayscale.
///
/// Multi-channel input uses BT.601 luma weights in 8.8 fixed point; a
/// single-channel frame is copied as-is. The alpha channel of RGBA input
/// is ignored.
pub fn to_gray(frame: &FrameView<'_>) -> GrayImage {
    let (w, h, c) = (frame.width(), frame.height(), frame.channels());
    let src = frame.data();
    if c == 1 {
        return GrayImage {
            width: w,
            height: h,
            data: src.to_vec(),
        };
    }

    let mut data = Vec::with_capacity(w * h);
    for px in src.chunks_exact(c) {
        let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
        data.push(((77 * r + 150 * g + 29 * b) >> 8) as u8);
    }
    GrayImage {
        width: w,
        height: h,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_view_rejects_bad_lengths() {
        let buf = [0u8; 11];
        assert!(matches!(
            FrameView::new(3, 4, 1, &buf),
            Err(FrameError::InvalidBufferLength {
                expected: 12,
                got: 11
            })
        ));
    }

    #[test]
    fn frame_view_rejects_bad_channel_counts() {
        let buf = [0u8; 24];
        assert!(FrameView::new(3, 4, 2, &buf).is_err());
        assert!(FrameView::new(3, 4, 1, &buf[..12]).is_ok());
    }

    #[test]
    fn gray_conversion_keeps_single_channel() {
        let buf = [1u8, 2, 3, 4];
        let frame = FrameView::new(2, 2, 1, &buf).unwrap();
        assert_eq!(to_gray(&frame).data, buf);
    }

    #[test]
    fn gray_conversion_weights_green_highest() {
        let red = [255u8, 0, 0];
        let green = [0u8, 255, 0];
        let fr = FrameView::new(1, 1, 3, &red).unwrap();
        let fg = FrameView::new(1, 1, 3, &green).unwrap();
        assert!(to_gray(&fg).data[0] > to_gray(&fr).data[0]);
    }

    #[test]
    fn rgba_alpha_is_ignored() {
        let px = [10u8, 20, 30, 0];
        let frame = FrameView::new(1, 1, 4, &px).unwrap();
        let expected = ((77 * 10 + 150 * 20 + 29 * 30) >> 8) as u8;
        assert_eq!(to_gray(&frame).data[0], expected);
    }
}
