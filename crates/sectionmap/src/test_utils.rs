//! Shared synthetic data for unit tests.

use image::{GrayImage, Luma};

fn segment_distance(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let d = [b[0] - a[0], b[1] - a[1]];
    let len2 = d[0] * d[0] + d[1] * d[1];
    let t = if len2 > 0.0 {
        (((p[0] - a[0]) * d[0] + (p[1] - a[1]) * d[1]) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (p[0] - (a[0] + t * d[0])).hypot(p[1] - (a[1] + t * d[1]))
}

/// Render a dark image with a bright ridge along the edges of a polygon.
///
/// A pixel at distance `d` from the nearest edge has value
/// `round(peak · max(0, 1 − d / half_width))`.
pub(crate) fn draw_ridge_quad_image(
    w: u32,
    h: u32,
    vertices: &[[f64; 2]],
    half_width: f64,
    peak: u8,
) -> GrayImage {
    let n = vertices.len();
    let mut img = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let p = [x as f64, y as f64];
            let d = (0..n)
                .map(|i| segment_distance(p, vertices[i], vertices[(i + 1) % n]))
                .fold(f64::INFINITY, f64::min);
            let v = (1.0 - d / half_width).max(0.0);
            img.put_pixel(x, y, Luma([(peak as f64 * v).round() as u8]));
        }
    }
    img
}

/// Scattered samples of the plane `z = 2x + 3y + 1`.
pub(crate) fn plane_samples() -> Vec<crate::FocusSample> {
    [
        [0.0, 0.0],
        [100.0, 5.0],
        [10.0, 90.0],
        [95.0, 100.0],
        [50.0, 40.0],
        [30.0, 60.0],
        [70.0, 75.0],
    ]
    .into_iter()
    .map(|[x, y]| crate::FocusSample::new(x, y, 2.0 * x + 3.0 * y + 1.0))
    .collect()
}
