//! Edge-response image for contour refinement.

use image::{GrayImage, ImageBuffer, Luma};

/// Float edge-response image (higher = stronger edge).
pub type EdgeResponse = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Sobel gradient magnitude of `gray`, smoothed with a Gaussian of `sigma`
/// pixels (no smoothing when `sigma <= 0`).
///
/// The result can be passed straight to [`crate::optimize_contour`].
pub fn edge_response(gray: &GrayImage, sigma: f32) -> EdgeResponse {
    let (w, h) = gray.dimensions();
    let gx = imageproc::gradients::horizontal_sobel(gray);
    let gy = imageproc::gradients::vertical_sobel(gray);

    let mag: Vec<f32> = gx
        .as_raw()
        .iter()
        .zip(gy.as_raw())
        .map(|(&x, &y)| {
            let x = x as f32;
            let y = y as f32;
            (x * x + y * y).sqrt()
        })
        .collect();
    let mut out = EdgeResponse::from_raw(w, h, mag).unwrap_or_else(|| EdgeResponse::new(w, h));

    if sigma > 0.0 && w > 0 && h > 0 {
        out = imageproc::filter::gaussian_blur_f32(&out, sigma);
    }
    tracing::debug!(width = w, height = h, sigma, "computed edge response");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::EdgeImage;

    #[test]
    fn step_edge_peaks_on_boundary() {
        let mut gray = GrayImage::new(40, 20);
        for y in 0..20 {
            for x in 20..40 {
                gray.put_pixel(x, y, Luma([200]));
            }
        }
        let resp = edge_response(&gray, 1.0);
        let on_edge = resp.sample(19.5, 10.0);
        assert!(on_edge > resp.sample(5.0, 10.0) + 100.0);
        assert!(on_edge > resp.sample(34.0, 10.0) + 100.0);
    }

    #[test]
    fn flat_image_has_no_response() {
        let gray = GrayImage::from_pixel(16, 16, Luma([77]));
        let resp = edge_response(&gray, 0.0);
        assert!(resp.as_raw().iter().all(|&v| v == 0.0));
    }
}
