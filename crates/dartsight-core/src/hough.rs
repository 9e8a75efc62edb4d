//! Gradient-voting circle detection.
//!
//! Two-stage transform in the HOUGH_GRADIENT family: Sobel gradients,
//! edge pixels vote along their gradient line into a center accumulator,
//! then each accepted center gets a radius histogram over the edge set.
//! Unlike the classic transform, every supported radius peak at a center
//! yields its own candidate, so nested rings of one physical board come
//! out as separate circles sharing a center.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::image::GrayImageView;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HoughParams {
    /// Minimum distance between accepted centers, px.
    /// `None` derives `image height / 8`.
    pub min_center_dist: Option<f32>,
    /// Sobel gradient magnitude required for a pixel to vote.
    pub edge_threshold: f32,
    /// Votes required at a center peak (counted over its 3x3
    /// neighborhood) and per supported radius.
    pub accumulator_threshold: u32,
    /// Smallest radius reported.
    pub min_radius: f32,
    /// Largest radius reported. `None` caps at the larger image dimension.
    pub max_radius: Option<f32>,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            min_center_dist: None,
            edge_threshold: 100.0,
            accumulator_threshold: 40,
            min_radius: 10.0,
            max_radius: None,
        }
    }
}

/// One detected circle, in pixel units.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CircleCandidate {
    pub center: Point2<f32>,
    pub radius: f32,
    /// Edge-pixel support for this radius.
    pub votes: u32,
}

struct EdgePixel {
    x: f32,
    y: f32,
    // unit gradient direction
    ux: f32,
    uy: f32,
}

/// Detect circles in a (pre-blurred) grayscale image.
pub fn detect_circles(src: &GrayImageView<'_>, params: &HoughParams) -> Vec<CircleCandidate> {
    let (w, h) = (src.width, src.height);
    if w < 3 || h < 3 {
        return Vec::new();
    }

    let max_radius = params.max_radius.unwrap_or(w.max(h) as f32);
    let min_radius = params.min_radius.max(1.0);
    if max_radius <= min_radius {
        return Vec::new();
    }
    let min_center_dist = params.min_center_dist.unwrap_or(h as f32 / 8.0).max(1.0);

    let edges = edge_pixels(src, params.edge_threshold);
    if edges.is_empty() {
        return Vec::new();
    }

    let acc = vote_centers(&edges, w, h, min_radius, max_radius);
    let centers = center_peaks(&acc, w, h, params.accumulator_threshold, min_center_dist);

    let mut out = Vec::new();
    for (cx, cy, _votes) in centers {
        radii_at_center(
            &edges,
            Point2::new(cx, cy),
            min_radius,
            max_radius,
            params.accumulator_threshold,
            &mut out,
        );
    }
    log::debug!(
        "hough: {} edge pixels -> {} circle candidates",
        edges.len(),
        out.len()
    );
    out
}

fn edge_pixels(src: &GrayImageView<'_>, threshold: f32) -> Vec<EdgePixel> {
    let (w, h) = (src.width, src.height);
    let at = |x: i32, y: i32| src.data[y as usize * w + x as usize] as f32;
    let mut edges = Vec::new();
    for y in 1..h as i32 - 1 {
        for x in 1..w as i32 - 1 {
            let gx = at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2.0 * at(x - 1, y)
                - at(x - 1, y + 1);
            let gy = at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2.0 * at(x, y - 1)
                - at(x + 1, y - 1);
            let mag = (gx * gx + gy * gy).sqrt();
            if mag >= threshold {
                edges.push(EdgePixel {
                    x: x as f32,
                    y: y as f32,
                    ux: gx / mag,
                    uy: gy / mag,
                });
            }
        }
    }
    edges
}

/// March each edge pixel's gradient line in both directions, voting for
/// possible centers. Votes bin to the nearest cell; a ray is abandoned
/// once it leaves the image.
fn vote_centers(edges: &[EdgePixel], w: usize, h: usize, min_r: f32, max_r: f32) -> Vec<u32> {
    let mut acc = vec![0u32; w * h];
    for e in edges {
        for sign in [1.0f32, -1.0] {
            let mut t = min_r;
            while t <= max_r {
                let cx = (e.x + sign * e.ux * t).round();
                let cy = (e.y + sign * e.uy * t).round();
                if cx < 0.0 || cy < 0.0 || cx >= w as f32 || cy >= h as f32 {
                    break;
                }
                acc[cy as usize * w + cx as usize] += 1;
                t += 1.0;
            }
        }
    }
    acc
}

/// Peaks of the accumulator above the vote threshold, kept greedily
/// strongest-first with a minimum mutual separation.
///
/// Rays that should meet at one center land in a handful of adjacent
/// cells, so peaks are found on a 3x3 box sum of the accumulator and
/// refined to the vote-weighted centroid of the raw votes around the
/// peak cell.
fn center_peaks(
    acc: &[u32],
    w: usize,
    h: usize,
    threshold: u32,
    min_dist: f32,
) -> Vec<(f32, f32, u32)> {
    let mut smooth = vec![0u32; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut s = 0;
            for dy in 0..3 {
                let row = (y + dy - 1) * w;
                s += acc[row + x - 1] + acc[row + x] + acc[row + x + 1];
            }
            smooth[y * w + x] = s;
        }
    }

    let mut peaks: Vec<(u32, usize, usize)> = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let v = smooth[y * w + x];
            if v < threshold {
                continue;
            }
            let mut is_max = true;
            'scan: for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let n = smooth[(y as i32 + dy) as usize * w + (x as i32 + dx) as usize];
                    if n > v {
                        is_max = false;
                        break 'scan;
                    }
                }
            }
            if is_max {
                peaks.push((v, x, y));
            }
        }
    }
    peaks.sort_by(|a, b| b.0.cmp(&a.0).then(a.2.cmp(&b.2)).then(a.1.cmp(&b.1)));

    let min_dist2 = min_dist * min_dist;
    let mut kept: Vec<(f32, f32, u32)> = Vec::new();
    for (v, x, y) in peaks {
        let (cx, cy) = refine_center(acc, w, h, x, y);
        let far_enough = kept
            .iter()
            .all(|&(kx, ky, _)| (kx - cx).powi(2) + (ky - cy).powi(2) >= min_dist2);
        if far_enough {
            kept.push((cx, cy, v));
        }
    }
    kept
}

/// Vote-weighted centroid of the raw accumulator around a peak cell.
/// Recovers the common sub-pixel crossing point of the voting rays.
fn refine_center(acc: &[u32], w: usize, h: usize, x: usize, y: usize) -> (f32, f32) {
    const R: i32 = 2;
    let (mut sx, mut sy) = (0.0f32, 0.0f32);
    let mut total = 0u64;
    for dy in -R..=R {
        for dx in -R..=R {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                continue;
            }
            let v = acc[ny as usize * w + nx as usize];
            sx += nx as f32 * v as f32;
            sy += ny as f32 * v as f32;
            total += u64::from(v);
        }
    }
    if total == 0 {
        (x as f32, y as f32)
    } else {
        (sx / total as f32, sy / total as f32)
    }
}

/// Histogram edge-pixel distances from one center and emit a candidate
/// for every supported radius peak.
fn radii_at_center(
    edges: &[EdgePixel],
    center: Point2<f32>,
    min_r: f32,
    max_r: f32,
    threshold: u32,
    out: &mut Vec<CircleCandidate>,
) {
    let n_bins = max_r.ceil() as usize + 2;
    let mut hist = vec![0u32; n_bins];
    for e in edges {
        let d = ((e.x - center.x).powi(2) + (e.y - center.y).powi(2)).sqrt();
        if d >= min_r - 1.0 && d <= max_r {
            hist[d.round() as usize] += 1;
        }
    }

    let support = |i: usize| -> u32 {
        let lo = if i > 0 { hist[i - 1] } else { 0 };
        let hi = if i + 1 < n_bins { hist[i + 1] } else { 0 };
        lo + hist[i] + hi
    };

    let first = min_r.round().max(1.0) as usize;
    for i in first..n_bins - 1 {
        let s = support(i);
        if s < threshold {
            continue;
        }
        // peak with plateau handling: rightmost equal bin wins
        if support(i.saturating_sub(1)) > s || support(i + 1) >= s {
            continue;
        }
        // vote-weighted radius over the peak neighborhood
        let (mut num, mut den) = (0.0f32, 0u32);
        for j in i.saturating_sub(1)..=(i + 1).min(n_bins - 1) {
            num += j as f32 * hist[j] as f32;
            den += hist[j];
        }
        if den == 0 {
            continue;
        }
        out.push(CircleCandidate {
            center,
            radius: num / den as f32,
            votes: s,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GrayImage;

    fn ring_image(w: usize, h: usize, cx: f32, cy: f32, radii: &[f32]) -> GrayImage {
        let mut img = GrayImage {
            width: w,
            height: h,
            data: vec![255; w * h],
        };
        for y in 0..h {
            for x in 0..w {
                let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
                if radii.iter().any(|&r| (d - r).abs() <= 1.0) {
                    img.data[y * w + x] = 0;
                }
            }
        }
        img
    }

    #[test]
    fn blank_image_yields_no_candidates() {
        let img = GrayImage {
            width: 64,
            height: 64,
            data: vec![128; 64 * 64],
        };
        let found = detect_circles(&img.as_view(), &HoughParams::default());
        assert!(found.is_empty());
    }

    #[test]
    fn finds_a_single_ring() {
        let img = ring_image(200, 200, 100.0, 100.0, &[60.0]);
        let found = detect_circles(&img.as_view(), &HoughParams::default());
        assert!(!found.is_empty(), "expected at least one candidate");
        let best = found.iter().max_by_key(|c| c.votes).unwrap();
        assert!((best.center.x - 100.0).abs() <= 2.0);
        assert!((best.center.y - 100.0).abs() <= 2.0);
        assert!((best.radius - 60.0).abs() <= 3.0);
    }

    #[test]
    fn localizes_an_off_grid_center() {
        let img = ring_image(200, 200, 100.5, 99.5, &[55.0]);
        let found = detect_circles(&img.as_view(), &HoughParams::default());
        let best = found.iter().max_by_key(|c| c.votes).unwrap();
        assert!((best.center.x - 100.5).abs() <= 1.5, "cx {}", best.center.x);
        assert!((best.center.y - 99.5).abs() <= 1.5, "cy {}", best.center.y);
        assert!((best.radius - 55.0).abs() <= 3.0, "r {}", best.radius);
    }

    #[test]
    fn nested_rings_share_a_center() {
        let img = ring_image(240, 240, 120.0, 120.0, &[35.0, 90.0]);
        let found = detect_circles(&img.as_view(), &HoughParams::default());
        let near_small = found
            .iter()
            .any(|c| (c.radius - 35.0).abs() <= 3.0 && (c.center.x - 120.0).abs() <= 3.0);
        let near_large = found
            .iter()
            .any(|c| (c.radius - 90.0).abs() <= 3.0 && (c.center.x - 120.0).abs() <= 3.0);
        assert!(near_small, "inner ring missing: {found:?}");
        assert!(near_large, "outer ring missing: {found:?}");
    }

    #[test]
    fn determinism_on_identical_input() {
        let img = ring_image(160, 160, 80.0, 80.0, &[40.0]);
        let a = detect_circles(&img.as_view(), &HoughParams::default());
        let b = detect_circles(&img.as_view(), &HoughParams::default());
        assert_eq!(a.len(), b.len());
        for (ca, cb) in a.iter().zip(&b) {
            assert_eq!(ca.center, cb.center);
            assert_eq!(ca.radius, cb.radius);
            assert_eq!(ca.votes, cb.votes);
        }
    }
}
