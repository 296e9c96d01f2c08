//! Sibson natural-neighbor interpolation over a Delaunay triangulation.
//!
//! For a query point q, the triangles whose circumcircles strictly contain q
//! form the insertion cavity. Inserting q would give it a Voronoi cell
//! carved out of the cells of the cavity's boundary vertices; the area each
//! neighbor loses is its weight (Watson's construction from circumcenters).
//! Outside the convex hull, on a hull edge, or without a proper
//! triangulation the value falls back to IDW with power 1.
#![cfg_attr(not(feature = "natural-neighbor"), allow(dead_code))]

use std::collections::{HashMap, HashSet};

use super::idw::{idw_value, COINCIDENT_EPS};
use super::{FocusDomain, FocusGrid, FocusSample, InterpolationMethod, Interpolator};

/// Relative tolerance for treating three points as collinear.
const COLLINEAR_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
struct Circumcircle {
    center: [f64; 2],
    r2: f64,
}

#[derive(Debug, Clone)]
struct Mesh {
    triangles: Vec<[usize; 3]>,
    circles: Vec<Circumcircle>,
}

/// Natural-neighbor interpolation, precomputed on a grid.
///
/// Point queries read the prepared grid: the node is
/// `floor((p − min) / step)` clamped to the grid, so results are quantized to
/// grid resolution and `point_sample` returns `None` until `prepare` ran.
#[derive(Debug, Clone)]
pub struct NaturalNeighborInterpolator {
    samples: Vec<FocusSample>,
    mesh: Option<Mesh>,
    grid: Option<FocusGrid>,
}

fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn dist2(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

fn circumcenter(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Option<[f64; 2]> {
    let d = 2.0 * orient(a, b, c);
    let scale = dist2(a, b).max(dist2(b, c)).max(dist2(a, c));
    if !d.is_finite() || d.abs() <= COLLINEAR_EPS * scale {
        return None;
    }
    let aa = a[0] * a[0] + a[1] * a[1];
    let bb = b[0] * b[0] + b[1] * b[1];
    let cc = c[0] * c[0] + c[1] * c[1];
    let ux = (aa * (b[1] - c[1]) + bb * (c[1] - a[1]) + cc * (a[1] - b[1])) / d;
    let uy = (aa * (c[0] - b[0]) + bb * (a[0] - c[0]) + cc * (b[0] - a[0])) / d;
    Some([ux, uy])
}

/// Area of a convex point set, ordered by angle around its mean.
fn convex_area(points: &mut [[f64; 2]]) -> f64 {
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let cy = points.iter().map(|p| p[1]).sum::<f64>() / n;
    points.sort_by(|p, q| {
        let ap = (p[1] - cy).atan2(p[0] - cx);
        let aq = (q[1] - cy).atan2(q[0] - cx);
        ap.partial_cmp(&aq).unwrap_or(std::cmp::Ordering::Equal)
    });
    crate::polygon::signed_area(points).abs()
}

impl Mesh {
    #[cfg(feature = "natural-neighbor")]
    fn build(samples: &[FocusSample]) -> Option<Self> {
        if samples.len() < 3 {
            return None;
        }
        let points: Vec<delaunator::Point> = samples
            .iter()
            .map(|s| delaunator::Point { x: s.x, y: s.y })
            .collect();
        let tri = delaunator::triangulate(&points);

        let mut triangles = Vec::with_capacity(tri.triangles.len() / 3);
        let mut circles = Vec::with_capacity(tri.triangles.len() / 3);
        for t in tri.triangles.chunks_exact(3) {
            let idx = [t[0], t[1], t[2]];
            let [a, b, c] = idx.map(|i| samples[i].position());
            let Some(center) = circumcenter(a, b, c) else {
                continue;
            };
            triangles.push(idx);
            circles.push(Circumcircle {
                center,
                r2: dist2(center, a),
            });
        }

        if triangles.is_empty() {
            None
        } else {
            Some(Self { triangles, circles })
        }
    }

    #[cfg(not(feature = "natural-neighbor"))]
    fn build(_samples: &[FocusSample]) -> Option<Self> {
        None
    }

    fn contains(&self, samples: &[FocusSample], q: [f64; 2]) -> bool {
        self.triangles.iter().any(|t| {
            let [a, b, c] = t.map(|i| samples[i].position());
            let o = [orient(a, b, q), orient(b, c, q), orient(c, a, q)];
            o.iter().all(|&v| v >= 0.0) || o.iter().all(|&v| v <= 0.0)
        })
    }

    /// Sibson value at `q`, or `None` where the construction does not apply.
    fn sibson(&self, samples: &[FocusSample], q: [f64; 2]) -> Option<f64> {
        if !self.contains(samples, q) {
            return None;
        }

        let cavity: Vec<usize> = (0..self.triangles.len())
            .filter(|&t| dist2(self.circles[t].center, q) < self.circles[t].r2)
            .collect();
        if cavity.is_empty() {
            return None;
        }

        let mut edges = HashSet::new();
        for &t in &cavity {
            let [a, b, c] = self.triangles[t];
            edges.extend([(a, b), (b, c), (c, a)]);
        }
        let boundary: HashMap<usize, usize> = edges
            .iter()
            .filter(|(a, b)| !edges.contains(&(*b, *a)))
            .map(|&(a, b)| (a, b))
            .collect();

        let &start = boundary.keys().next()?;
        let mut ring = vec![start];
        let mut v = *boundary.get(&start)?;
        while v != start {
            if ring.len() > boundary.len() {
                return None;
            }
            ring.push(v);
            v = *boundary.get(&v)?;
        }

        let m = ring.len();
        let mut total = 0.0;
        let mut acc = 0.0;
        for i in 0..m {
            let p1 = ring[(i + m - 1) % m];
            let p2 = ring[i];
            let p3 = ring[(i + 1) % m];
            let c1 = circumcenter(q, samples[p1].position(), samples[p2].position())?;
            let c2 = circumcenter(q, samples[p2].position(), samples[p3].position())?;

            let mut cell = vec![c1, c2];
            cell.extend(
                cavity
                    .iter()
                    .filter(|&&t| self.triangles[t].contains(&p2))
                    .map(|&t| self.circles[t].center),
            );
            let area = convex_area(&mut cell);
            total += area;
            acc += area * samples[p2].z;
        }

        let z = acc / total;
        (total > 0.0 && z.is_finite()).then_some(z)
    }
}

impl NaturalNeighborInterpolator {
    /// Triangulate `samples`. With fewer than three non-collinear samples
    /// every query falls back to IDW.
    pub fn new(samples: Vec<FocusSample>) -> Self {
        let mesh = Mesh::build(&samples);
        if mesh.is_none() && !samples.is_empty() {
            tracing::debug!(
                n_samples = samples.len(),
                "no usable triangulation; natural neighbor falls back to IDW"
            );
        }
        Self {
            samples,
            mesh,
            grid: None,
        }
    }

    /// Interpolated value at an arbitrary position (no grid quantization).
    pub fn value_at(&self, q: [f64; 2]) -> Option<f64> {
        if let Some(s) = self
            .samples
            .iter()
            .find(|s| dist2(s.position(), q) < COINCIDENT_EPS * COINCIDENT_EPS)
        {
            return Some(s.z);
        }
        self.mesh
            .as_ref()
            .and_then(|m| m.sibson(&self.samples, q))
            .or_else(|| idw_value(&self.samples, q, 1.0))
    }
}

impl Interpolator for NaturalNeighborInterpolator {
    fn prepare(&mut self, domain: &FocusDomain) {
        let grid = FocusGrid::from_fn(domain, |p| self.value_at(p).unwrap_or(f64::NAN));
        self.grid = Some(grid);
    }

    fn point_sample(&self, pos: [f64; 2]) -> Option<f64> {
        self.grid.as_ref()?.lookup(pos)
    }

    fn grid_samples(&self) -> Option<&FocusGrid> {
        self.grid.as_ref()
    }

    fn method(&self) -> InterpolationMethod {
        InterpolationMethod::NaturalNeighbor
    }
}

#[cfg(all(test, feature = "natural-neighbor"))]
mod tests {
    use super::*;
    use crate::test_utils::plane_samples;
    use approx::assert_abs_diff_eq;

    fn plane(p: [f64; 2]) -> f64 {
        2.0 * p[0] + 3.0 * p[1] + 1.0
    }

    #[test]
    fn reproduces_linear_field_inside_hull() {
        let nn = NaturalNeighborInterpolator::new(plane_samples());
        for q in [[50.0, 50.0], [20.0, 30.0], [60.0, 60.0], [80.0, 50.0], [40.0, 80.0], [51.0, 41.0]] {
            assert_abs_diff_eq!(nn.value_at(q).unwrap(), plane(q), epsilon = 1e-9);
        }
    }

    #[test]
    fn cocircular_square_center() {
        let samples = vec![
            FocusSample::new(0.0, 0.0, 0.0),
            FocusSample::new(10.0, 0.0, 1.0),
            FocusSample::new(10.0, 10.0, 2.0),
            FocusSample::new(0.0, 10.0, 3.0),
        ];
        let nn = NaturalNeighborInterpolator::new(samples);
        assert_abs_diff_eq!(nn.value_at([5.0, 5.0]).unwrap(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn exact_at_samples() {
        let nn = NaturalNeighborInterpolator::new(plane_samples());
        for s in plane_samples() {
            assert_eq!(nn.value_at([s.x, s.y]), Some(s.z));
        }
    }

    #[test]
    fn outside_hull_falls_back_to_idw() {
        let samples = plane_samples();
        let nn = NaturalNeighborInterpolator::new(samples.clone());
        let q = [-40.0, 150.0];
        assert_eq!(nn.value_at(q), idw_value(&samples, q, 1.0));
    }

    #[test]
    fn collinear_samples_fall_back_to_idw() {
        let samples = vec![
            FocusSample::new(0.0, 0.0, 1.0),
            FocusSample::new(5.0, 5.0, 2.0),
            FocusSample::new(10.0, 10.0, 3.0),
        ];
        let nn = NaturalNeighborInterpolator::new(samples.clone());
        let q = [3.0, 7.0];
        assert_eq!(nn.value_at(q), idw_value(&samples, q, 1.0));
    }

    #[test]
    fn point_queries_are_quantized_to_grid() {
        let mut nn = NaturalNeighborInterpolator::new(plane_samples());
        assert_eq!(nn.point_sample([50.0, 50.0]), None);

        let domain = FocusDomain::new(0.0, 100.0, 0.0, 100.0, 10.0).unwrap();
        nn.prepare(&domain);
        let a = nn.point_sample([50.2, 50.3]).unwrap();
        let b = nn.point_sample([59.9, 59.0]).unwrap();
        assert_eq!(a, b);
        assert_abs_diff_eq!(a, plane([50.0, 50.0]), epsilon = 1e-9);
        assert_eq!(nn.grid_samples().unwrap().values().shape(), (10, 10));
    }
}
