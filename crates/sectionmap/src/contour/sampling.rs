//! Sub-pixel image access for contour scoring.

use image::{ImageBuffer, Luma};

/// Offset keeping clamped positions strictly inside the last pixel cell.
const BORDER_EPS: f64 = 1e-4;

/// A single-channel image the contour optimizer can score against.
///
/// Higher values mean "closer to an edge". Values are raw intensities (no
/// normalization), so a `GrayImage` yields 0..=255.
pub trait EdgeImage {
    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Raw value of pixel `(x, y)`. Callers guarantee the index is in bounds.
    fn value(&self, x: u32, y: u32) -> f64;

    /// Bilinear sample at a sub-pixel position.
    ///
    /// The position is clamped to `[0, w - 1 - ε] × [0, h - 1 - ε]`, so
    /// positions outside the image read the border. Empty images sample as 0.
    #[inline]
    fn sample(&self, x: f64, y: f64) -> f64 {
        let (w, h) = self.dimensions();
        if w == 0 || h == 0 {
            return 0.0;
        }
        if w == 1 || h == 1 {
            let xi = if x.is_finite() { x.round().clamp(0.0, (w - 1) as f64) } else { 0.0 };
            let yi = if y.is_finite() { y.round().clamp(0.0, (h - 1) as f64) } else { 0.0 };
            return self.value(xi as u32, yi as u32);
        }

        let x = clamp_coord(x, w);
        let y = clamp_coord(y, h);
        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let fx = x - x0 as f64;
        let fy = y - y0 as f64;

        let p00 = self.value(x0, y0);
        let p10 = self.value(x0 + 1, y0);
        let p01 = self.value(x0, y0 + 1);
        let p11 = self.value(x0 + 1, y0 + 1);

        let top = p00 + fx * (p10 - p00);
        let bottom = p01 + fx * (p11 - p01);
        top + fy * (bottom - top)
    }
}

#[inline]
fn clamp_coord(v: f64, extent: u32) -> f64 {
    let hi = extent as f64 - 1.0 - BORDER_EPS;
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, hi)
    }
}

macro_rules! impl_edge_image_for_luma {
    ($($t:ty),*) => {
        $(
            impl EdgeImage for ImageBuffer<Luma<$t>, Vec<$t>> {
                #[inline]
                fn dimensions(&self) -> (u32, u32) {
                    ImageBuffer::dimensions(self)
                }

                #[inline]
                fn value(&self, x: u32, y: u32) -> f64 {
                    self.get_pixel(x, y)[0] as f64
                }
            }
        )*
    };
}

impl_edge_image_for_luma!(u8, u16, f32);

impl<T: EdgeImage + ?Sized> EdgeImage for &T {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn value(&self, x: u32, y: u32) -> f64 {
        (**self).value(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::GrayImage;

    #[test]
    fn test_bilinear_midpoint() {
        let mut img = GrayImage::new(4, 4);
        img.put_pixel(1, 1, Luma([100]));
        img.put_pixel(2, 1, Luma([200]));
        img.put_pixel(1, 2, Luma([100]));
        img.put_pixel(2, 2, Luma([200]));
        assert_abs_diff_eq!(img.sample(1.5, 1.5), 150.0, epsilon = 1e-9);
        assert_abs_diff_eq!(img.sample(1.0, 1.0), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_out_of_bounds_reads_border() {
        let mut img = GrayImage::new(3, 3);
        for y in 0..3 {
            img.put_pixel(2, y, Luma([90]));
        }
        assert_abs_diff_eq!(img.sample(50.0, 1.0), 90.0, epsilon = 0.01);
        assert_abs_diff_eq!(img.sample(-5.0, 1.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_float_and_u16_buffers() {
        let mut f = ImageBuffer::<Luma<f32>, Vec<f32>>::new(2, 2);
        f.put_pixel(1, 0, Luma([2.0]));
        assert_abs_diff_eq!(f.sample(0.5, 0.0), 1.0, epsilon = 1e-9);

        let mut w = ImageBuffer::<Luma<u16>, Vec<u16>>::new(2, 2);
        w.put_pixel(0, 1, Luma([4000]));
        assert_abs_diff_eq!(w.sample(0.0, 0.25), 1000.0, epsilon = 1e-9);
    }
}
