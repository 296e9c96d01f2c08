//! Polygon helpers: signed area, centroid, winding and outline simplification.
//!
//! Winding is always reported for the coordinates as given. For image-frame
//! outlines (y pointing down) a [`Orientation::Positive`] polygon appears
//! clockwise on screen; in a y-up stage frame it is counter-clockwise.

use serde::{Deserialize, Serialize};

/// Winding of a closed polygon, from the sign of its shoelace area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Positive signed area.
    Positive,
    /// Negative signed area.
    Negative,
    /// Zero area (collinear or coincident vertices).
    Degenerate,
}

impl Orientation {
    /// Winding of `points`, treated as a closed polygon.
    pub fn of(points: &[[f64; 2]]) -> Self {
        let a = signed_area(points);
        if a > 0.0 {
            Self::Positive
        } else if a < 0.0 {
            Self::Negative
        } else {
            Self::Degenerate
        }
    }
}

/// Shoelace area of a closed polygon (last vertex connects back to the first).
pub fn signed_area(points: &[[f64; 2]]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        acc += p[0] * q[1] - q[0] * p[1];
    }
    0.5 * acc
}

/// Area centroid of a closed polygon.
///
/// Falls back to the vertex mean when the polygon has (numerically) zero area.
pub fn centroid(points: &[[f64; 2]]) -> Option<[f64; 2]> {
    if points.is_empty() {
        return None;
    }
    let n = points.len();
    let area = signed_area(points);
    if area.abs() < 1e-12 {
        let sx: f64 = points.iter().map(|p| p[0]).sum();
        let sy: f64 = points.iter().map(|p| p[1]).sum();
        return Some([sx / n as f64, sy / n as f64]);
    }
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let cross = p[0] * q[1] - q[0] * p[1];
        cx += (p[0] + q[0]) * cross;
        cy += (p[1] + q[1]) * cross;
    }
    Some([cx / (6.0 * area), cy / (6.0 * area)])
}

/// Perimeter of a closed polygon.
pub fn perimeter(points: &[[f64; 2]]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let p = points[i];
            let q = points[(i + 1) % n];
            ((q[0] - p[0]).powi(2) + (q[1] - p[1]).powi(2)).sqrt()
        })
        .sum()
}

/// Importance of vertex `v`: turning angle times the product of its two
/// adjacent edge lengths.
///
/// A straight run (turning angle near 0) scores near 0 by construction.
/// Near-reversal spikes, where the outline doubles back with a turning angle
/// above `π − acute_threshold`, and vertices with a zero-length neighbour
/// edge score exactly 0, so they are dropped first.
fn vertex_importance(poly: &[[f64; 2]], v: usize, acute_threshold: f64) -> f64 {
    let n = poly.len();
    let vp = (v + 1) % n;
    let vm = (v + n - 1) % n;

    let d1 = [poly[v][0] - poly[vm][0], poly[v][1] - poly[vm][1]];
    let d2 = [poly[vp][0] - poly[v][0], poly[vp][1] - poly[v][1]];
    let len1 = d1[0].hypot(d1[1]);
    let len2 = d2[0].hypot(d2[1]);
    let len12 = len1 * len2;
    if len12 < 1e-20 {
        return 0.0;
    }

    let cos = ((d1[0] * d2[0] + d1[1] * d2[1]) / len12).clamp(-1.0, 1.0);
    let angle = cos.acos();
    if angle > std::f64::consts::PI - acute_threshold {
        0.0
    } else {
        angle * len12
    }
}

/// Simplify a closed outline to `target` vertices.
///
/// Repeatedly drops the least important vertex (turning angle times the
/// adjacent edge lengths) and re-scores only its two former neighbours.
/// Outlines that already have `target` vertices or fewer are returned
/// unchanged. Typical use: reduce a
/// traced section outline to the 4-vertex initial contour for
/// [`crate::optimize_contour`].
pub fn reduce_polygon(points: &[[f64; 2]], target: usize, acute_threshold: f64) -> Vec<[f64; 2]> {
    let mut poly = points.to_vec();
    if poly.len() <= target || poly.len() < 3 {
        return poly;
    }

    let mut importance: Vec<f64> = (0..poly.len())
        .map(|v| vertex_importance(&poly, v, acute_threshold))
        .collect();

    while poly.len() > target.max(3) {
        let Some(i) = importance
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
        else {
            break;
        };

        poly.remove(i);
        importance.remove(i);

        let n = poly.len();
        let vm = (i + n - 1) % n;
        let vp = i % n;
        importance[vp] = vertex_importance(&poly, vp, acute_threshold);
        importance[vm] = vertex_importance(&poly, vm, acute_threshold);
    }

    poly
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn dense_rectangle(x0: f64, y0: f64, w: f64, h: f64, per_side: usize) -> Vec<[f64; 2]> {
        let corners = [[x0, y0], [x0 + w, y0], [x0 + w, y0 + h], [x0, y0 + h]];
        let mut out = Vec::new();
        for i in 0..4 {
            let a = corners[i];
            let b = corners[(i + 1) % 4];
            for k in 0..per_side {
                let t = k as f64 / per_side as f64;
                out.push([a[0] + t * (b[0] - a[0]), a[1] + t * (b[1] - a[1])]);
            }
        }
        out
    }

    #[test]
    fn signed_area_follows_winding() {
        let sq = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
        assert_abs_diff_eq!(signed_area(&sq), 100.0, epsilon = 1e-12);
        let rev: Vec<_> = sq.iter().rev().copied().collect();
        assert_abs_diff_eq!(signed_area(&rev), -100.0, epsilon = 1e-12);
        assert_eq!(Orientation::of(&sq), Orientation::Positive);
        assert_eq!(Orientation::of(&rev), Orientation::Negative);
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let line = [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        assert_eq!(Orientation::of(&line), Orientation::Degenerate);
        let c = centroid(&line).unwrap();
        assert_abs_diff_eq!(c[0], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn centroid_of_offset_rectangle() {
        let r = [[2.0, 4.0], [12.0, 4.0], [12.0, 8.0], [2.0, 8.0]];
        let c = centroid(&r).unwrap();
        assert_abs_diff_eq!(c[0], 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c[1], 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(perimeter(&r), 28.0, epsilon = 1e-12);
    }

    #[test]
    fn reduce_keeps_rectangle_corners() {
        let dense = dense_rectangle(20.0, 30.0, 80.0, 50.0, 12);
        let reduced = reduce_polygon(&dense, 4, 0.0);
        assert_eq!(reduced.len(), 4);
        let expected = [[20.0, 30.0], [100.0, 30.0], [100.0, 80.0], [20.0, 80.0]];
        for e in expected {
            assert!(
                reduced
                    .iter()
                    .any(|p| (p[0] - e[0]).abs() < 1e-9 && (p[1] - e[1]).abs() < 1e-9),
                "corner {:?} missing from {:?}",
                e,
                reduced
            );
        }
    }

    #[test]
    fn spikes_and_straight_runs_score_zero() {
        let spike = [[0.0, 0.0], [10.0, 0.0], [0.0, 0.5]];
        assert_eq!(vertex_importance(&spike, 1, 0.1), 0.0);
        assert!(vertex_importance(&spike, 1, 0.01) > 0.0);

        let straight = [[0.0, 0.0], [5.0, 0.0], [10.0, 0.0], [5.0, 5.0]];
        assert_eq!(vertex_importance(&straight, 1, 0.1), 0.0);

        let corner = [[0.0, 0.0], [4.0, 0.0], [4.0, 3.0]];
        assert_abs_diff_eq!(
            vertex_importance(&corner, 1, 0.1),
            std::f64::consts::FRAC_PI_2 * 12.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn reduce_is_noop_for_small_polygons() {
        let tri = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        assert_eq!(reduce_polygon(&tri, 4, 0.0), tri.to_vec());
    }
}
