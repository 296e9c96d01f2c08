use nalgebra::DVector;

use super::sampling::EdgeImage;

/// Edge-alignment score of a closed polygon: an approximate line integral of
/// image intensity along its edges.
///
/// Each edge `i → (i + 1) mod n` gets `max(1, round(len / spacing))` samples
/// starting at its start vertex and stopping before its end vertex, each
/// weighted by `len / samples`. Every vertex is therefore sampled exactly
/// once around the polygon.
///
/// Longer edges accumulate more score at equal mean intensity, so on a
/// plateau the score grows with the perimeter.
///
/// The sample count per edge is capped at `⌈(w + h) / spacing⌉`, the count
/// for the longest edge that fits inside the image. Edges running far
/// outside the image only read clamped border values anyway.
pub fn contour_score<I: EdgeImage + ?Sized>(
    image: &I,
    vertices: &[[f64; 2]],
    edge_sample_distance: f64,
) -> f64 {
    let n = vertices.len();
    (0..n)
        .map(|i| edge_score(image, vertices[i], vertices[(i + 1) % n], edge_sample_distance))
        .sum()
}

/// Same as [`contour_score`] over a flattened `[x0, y0, x1, y1, ...]` vector.
pub(crate) fn score_vector<I: EdgeImage + ?Sized>(
    image: &I,
    v: &DVector<f64>,
    edge_sample_distance: f64,
) -> f64 {
    let n = v.len() / 2;
    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            edge_score(
                image,
                [v[2 * i], v[2 * i + 1]],
                [v[2 * j], v[2 * j + 1]],
                edge_sample_distance,
            )
        })
        .sum()
}

#[inline]
fn edge_score<I: EdgeImage + ?Sized>(image: &I, a: [f64; 2], b: [f64; 2], spacing: f64) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let len = dx.hypot(dy);
    let (w, h) = image.dimensions();
    let cap = ((f64::from(w) + f64::from(h)) / spacing).ceil();
    let n = ((len / spacing).round().min(cap) as usize).max(1);
    let weight = len / n as f64;

    let mut acc = 0.0;
    for k in 0..n {
        let t = k as f64 / n as f64;
        acc += image.sample(a[0] + t * dx, a[1] + t * dy);
    }
    acc * weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{GrayImage, Luma};

    #[test]
    fn uniform_image_scores_intensity_times_perimeter() {
        let img = GrayImage::from_pixel(200, 200, Luma([10]));
        let square = [[50.0, 50.0], [150.0, 50.0], [150.0, 150.0], [50.0, 150.0]];
        assert_relative_eq!(contour_score(&img, &square, 10.0), 4000.0, max_relative = 1e-12);
        assert_relative_eq!(contour_score(&img, &square, 7.0), 4000.0, max_relative = 1e-12);

        let tri = [[20.0, 20.0], [80.0, 20.0], [20.0, 100.0]];
        assert_relative_eq!(contour_score(&img, &tri, 10.0), 10.0 * 240.0, max_relative = 1e-12);
    }

    #[test]
    fn each_vertex_sampled_once_with_coarse_spacing() {
        // spacing larger than every edge: one sample per edge, at its start vertex.
        let mut img = GrayImage::new(20, 20);
        img.put_pixel(2, 2, Luma([100]));
        let square = [[2.0, 2.0], [12.0, 2.0], [12.0, 12.0], [2.0, 12.0]];
        assert_relative_eq!(contour_score(&img, &square, 1000.0), 1000.0, max_relative = 1e-12);
    }

    #[test]
    fn far_away_edges_use_bounded_sample_count() {
        let img = GrayImage::from_pixel(20, 20, Luma([10]));
        let sliver = [[0.0, 0.0], [1e300, 0.0]];
        assert_relative_eq!(contour_score(&img, &sliver, 1.0), 2e301, max_relative = 1e-12);
    }

    #[test]
    fn flattened_vector_matches_vertex_form() {
        let img = crate::test_utils::draw_ridge_quad_image(
            120,
            120,
            &[[20.0, 20.0], [100.0, 25.0], [95.0, 100.0], [25.0, 90.0]],
            6.0,
            50,
        );
        let verts = [[22.0, 18.0], [101.0, 27.0], [93.0, 99.0], [24.0, 92.0]];
        let flat = DVector::from_iterator(8, verts.iter().flatten().copied());
        assert_eq!(
            contour_score(&img, &verts, 10.0),
            score_vector(&img, &flat, 10.0)
        );
    }
}
