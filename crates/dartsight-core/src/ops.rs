//! Per-frame image operations: Gaussian blur, absolute difference and
//! binary thresholding. Every function allocates its output and borrows
//! its inputs, so buffers live exactly as long as the enclosing call.

use crate::image::{FrameError, GrayImage, GrayImageView};

/// Build a normalized 1-D Gaussian kernel.
///
/// A non-positive sigma derives one from the kernel size the way OpenCV
/// does, so callers can pass `sigma = 0.0` and get sensible smoothing.
fn gaussian_kernel(ksize: usize, sigma: f32) -> Vec<f32> {
    debug_assert!(ksize % 2 == 1, "kernel size must be odd");
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let half = (ksize / 2) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-(i * i) as f32 / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Separable Gaussian blur with replicated borders.
pub fn gaussian_blur(src: &GrayImageView<'_>, ksize: usize, sigma: f32) -> GrayImage {
    let kernel = gaussian_kernel(ksize, sigma);
    let half = (ksize / 2) as i32;
    let (w, h) = (src.width, src.height);

    // Horizontal pass into f32, vertical pass back to u8.
    let mut tmp = vec![0.0f32; w * h];
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let mut acc = 0.0;
            for (k, coef) in kernel.iter().enumerate() {
                acc += coef * src.get_clamped(x + k as i32 - half, y) as f32;
            }
            tmp[y as usize * w + x as usize] = acc;
        }
    }

    let mut out = GrayImage::new(w, h);
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let mut acc = 0.0;
            for (k, coef) in kernel.iter().enumerate() {
                let yy = (y + k as i32 - half).clamp(0, h as i32 - 1);
                acc += coef * tmp[yy as usize * w + x as usize];
            }
            out.data[y as usize * w + x as usize] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Per-pixel absolute difference of two equally sized images.
pub fn absdiff(a: &GrayImageView<'_>, b: &GrayImageView<'_>) -> Result<GrayImage, FrameError> {
    if a.width != b.width || a.height != b.height {
        return Err(FrameError::SizeMismatch {
            aw: a.width,
            ah: a.height,
            bw: b.width,
            bh: b.height,
        });
    }
    let data = a
        .data
        .iter()
        .zip(b.data)
        .map(|(&pa, &pb)| pa.abs_diff(pb))
        .collect();
    Ok(GrayImage {
        width: a.width,
        height: a.height,
        data,
    })
}

/// Binary threshold: strictly greater than `thresh` maps to 255, else 0.
pub fn threshold_binary(src: &GrayImageView<'_>, thresh: u8) -> GrayImage {
    GrayImage {
        width: src.width,
        height: src.height,
        data: src
            .data
            .iter()
            .map(|&v| if v > thresh { 255 } else { 0 })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(w: usize, h: usize, v: u8) -> GrayImage {
        GrayImage {
            width: w,
            height: h,
            data: vec![v; w * h],
        }
    }

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        use approx::assert_relative_eq;
        let k = gaussian_kernel(9, 2.0);
        let sum: f32 = k.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
        assert_eq!(k.len(), 9);
        for i in 0..4 {
            assert_relative_eq!(k[i], k[8 - i], epsilon = 1e-6);
        }
    }

    #[test]
    fn blur_preserves_flat_images() {
        let img = flat(16, 12, 137);
        let blurred = gaussian_blur(&img.as_view(), 5, 0.0);
        assert!(blurred.data.iter().all(|&v| v == 137));
    }

    #[test]
    fn blur_spreads_an_impulse() {
        let mut img = flat(11, 11, 0);
        img.data[5 * 11 + 5] = 255;
        let blurred = gaussian_blur(&img.as_view(), 5, 1.0);
        assert!(blurred.data[5 * 11 + 5] < 255);
        assert!(blurred.data[5 * 11 + 6] > 0);
        assert!(blurred.data[4 * 11 + 5] > 0);
    }

    #[test]
    fn absdiff_is_symmetric() {
        let a = flat(4, 4, 200);
        let b = flat(4, 4, 55);
        let d1 = absdiff(&a.as_view(), &b.as_view()).unwrap();
        let d2 = absdiff(&b.as_view(), &a.as_view()).unwrap();
        assert_eq!(d1.data, d2.data);
        assert!(d1.data.iter().all(|&v| v == 145));
    }

    #[test]
    fn absdiff_rejects_size_mismatch() {
        let a = flat(4, 4, 0);
        let b = flat(4, 5, 0);
        assert!(absdiff(&a.as_view(), &b.as_view()).is_err());
    }

    #[test]
    fn threshold_is_strict() {
        let img = GrayImage {
            width: 3,
            height: 1,
            data: vec![29, 30, 31],
        };
        let t = threshold_binary(&img.as_view(), 30);
        assert_eq!(t.data, vec![0, 0, 255]);
    }
}
