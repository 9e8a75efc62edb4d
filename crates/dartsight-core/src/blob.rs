//! Connected-component blob extraction over a binary mask, plus the
//! minimal geometry needed to judge blob shape: convex hull and
//! rotating-calipers minimum-area rectangle.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::image::GrayImageView;

/// Minimum-area bounding rectangle of a point set.
///
/// Extents include the one-pixel footprint of boundary samples, so a
/// single-pixel blob reports a 1x1 rectangle rather than a degenerate one.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RotatedRect {
    pub width: f32,
    pub height: f32,
    /// Orientation of the `width` axis, radians.
    pub angle: f32,
}

impl RotatedRect {
    /// Long side over short side, at least 1.
    pub fn aspect_ratio(&self) -> f32 {
        let long = self.width.max(self.height);
        let short = self.width.min(self.height).max(1.0);
        (long / short).max(1.0)
    }
}

/// One connected foreground region of the mask.
#[derive(Clone, Debug)]
pub struct Blob {
    /// Pixel count of the whole component.
    pub area: f32,
    /// Outer boundary pixels, in fill-discovery order.
    pub border: Vec<Point2<f32>>,
    pub rect: RotatedRect,
}

/// Extract 8-connected foreground blobs in raster discovery order.
pub fn extract_blobs(mask: &GrayImageView<'_>) -> Vec<Blob> {
    let (w, h) = (mask.width, mask.height);
    let set = |x: i32, y: i32| -> bool {
        x >= 0 && y >= 0 && x < w as i32 && y < h as i32 && mask.data[y as usize * w + x as usize] != 0
    };

    let mut visited = vec![false; w * h];
    let mut blobs = Vec::new();
    let mut stack = Vec::new();

    for sy in 0..h {
        for sx in 0..w {
            let start = sy * w + sx;
            if visited[start] || mask.data[start] == 0 {
                continue;
            }

            let mut area = 0usize;
            let mut border = Vec::new();
            visited[start] = true;
            stack.push((sx as i32, sy as i32));

            while let Some((x, y)) = stack.pop() {
                area += 1;
                let on_border =
                    !set(x - 1, y) || !set(x + 1, y) || !set(x, y - 1) || !set(x, y + 1);
                if on_border {
                    border.push(Point2::new(x as f32, y as f32));
                }
                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let (nx, ny) = (x + dx, y + dy);
                        if set(nx, ny) {
                            let idx = ny as usize * w + nx as usize;
                            if !visited[idx] {
                                visited[idx] = true;
                                stack.push((nx, ny));
                            }
                        }
                    }
                }
            }

            let rect = min_area_rect(&border);
            blobs.push(Blob {
                area: area as f32,
                border,
                rect,
            });
        }
    }
    blobs
}

/// Convex hull by Andrew's monotone chain, counter-clockwise.
pub fn convex_hull(points: &[Point2<f32>]) -> Vec<Point2<f32>> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup_by(|a, b| a == b);

    let cross = |o: &Point2<f32>, a: &Point2<f32>, b: &Point2<f32>| {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };

    let mut hull: Vec<Point2<f32>> = Vec::with_capacity(pts.len() + 1);
    for p in &pts {
        while hull.len() >= 2 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }
    let lower_len = hull.len() + 1;
    for p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(*p);
    }
    hull.pop();
    hull
}

/// Minimum-area rectangle of a point set via rotating calipers over the
/// convex hull.
pub fn min_area_rect(points: &[Point2<f32>]) -> RotatedRect {
    let hull = convex_hull(points);
    match hull.len() {
        0 => {
            return RotatedRect {
                width: 0.0,
                height: 0.0,
                angle: 0.0,
            }
        }
        1 => {
            return RotatedRect {
                width: 1.0,
                height: 1.0,
                angle: 0.0,
            }
        }
        2 => {
            let d = hull[1] - hull[0];
            return RotatedRect {
                width: d.norm() + 1.0,
                height: 1.0,
                angle: d.y.atan2(d.x),
            };
        }
        _ => {}
    }

    let mut best = RotatedRect {
        width: f32::INFINITY,
        height: f32::INFINITY,
        angle: 0.0,
    };
    let mut best_area = f32::INFINITY;

    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        let edge = b - a;
        let len = edge.norm();
        if len <= f32::EPSILON {
            continue;
        }
        let (ux, uy) = (edge.x / len, edge.y / len);

        let mut min_u = f32::INFINITY;
        let mut max_u = f32::NEG_INFINITY;
        let mut min_v = f32::INFINITY;
        let mut max_v = f32::NEG_INFINITY;
        for p in &hull {
            let u = p.x * ux + p.y * uy;
            let v = -p.x * uy + p.y * ux;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        // +1 accounts for the pixel footprint of boundary samples
        let width = max_u - min_u + 1.0;
        let height = max_v - min_v + 1.0;
        let area = width * height;
        if area < best_area {
            best_area = area;
            best = RotatedRect {
                width,
                height,
                angle: uy.atan2(ux),
            };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GrayImage;

    fn mask_with_rect(w: usize, h: usize, x0: usize, y0: usize, rw: usize, rh: usize) -> GrayImage {
        let mut img = GrayImage::new(w, h);
        for y in y0..y0 + rh {
            for x in x0..x0 + rw {
                img.data[y * w + x] = 255;
            }
        }
        img
    }

    #[test]
    fn extracts_one_rectangle_blob() {
        let img = mask_with_rect(40, 30, 5, 10, 12, 4);
        let blobs = extract_blobs(&img.as_view());
        assert_eq!(blobs.len(), 1);
        let blob = &blobs[0];
        assert_eq!(blob.area, (12 * 4) as f32);
        let (long, short) = (
            blob.rect.width.max(blob.rect.height),
            blob.rect.width.min(blob.rect.height),
        );
        assert!((long - 12.0).abs() < 0.5, "long side {long}");
        assert!((short - 4.0).abs() < 0.5, "short side {short}");
        assert!((blob.rect.aspect_ratio() - 3.0).abs() < 0.2);
    }

    #[test]
    fn blobs_come_out_in_raster_order() {
        let mut img = mask_with_rect(40, 40, 2, 2, 4, 4);
        for y in 20..24 {
            for x in 10..14 {
                img.data[y * 40 + x] = 255;
            }
        }
        let blobs = extract_blobs(&img.as_view());
        assert_eq!(blobs.len(), 2);
        assert!(blobs[0].border[0].y < blobs[1].border[0].y);
    }

    #[test]
    fn diagonal_touch_is_one_component() {
        let mut img = GrayImage::new(8, 8);
        img.data[1 * 8 + 1] = 255;
        img.data[2 * 8 + 2] = 255;
        let blobs = extract_blobs(&img.as_view());
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].area, 2.0);
    }

    #[test]
    fn single_pixel_blob_has_unit_rect() {
        let mut img = GrayImage::new(8, 8);
        img.data[3 * 8 + 3] = 255;
        let blobs = extract_blobs(&img.as_view());
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].rect.aspect_ratio(), 1.0);
    }

    #[test]
    fn min_area_rect_follows_a_tilted_segment() {
        let pts: Vec<Point2<f32>> = (0..20).map(|i| Point2::new(i as f32, i as f32)).collect();
        let rect = min_area_rect(&pts);
        assert!(rect.aspect_ratio() > 10.0);
    }

    #[test]
    fn hull_of_a_square_has_four_vertices() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
            Point2::new(2.0, 2.0),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
    }
}
