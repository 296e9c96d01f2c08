use nalgebra::DVector;

/// Snapshot of one ascent step.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationState {
    /// Flattened `[x0, y0, x1, y1, ...]` contour after this step.
    pub vector: DVector<f64>,
    /// Contour the step started from.
    pub previous: DVector<f64>,
    /// 1-based step number.
    pub iteration: usize,
    /// Largest per-vertex displacement between `previous` and `vector`.
    pub max_displacement: f64,
    /// Score of `previous` (the point the gradient was evaluated at).
    pub score: f64,
}

impl IterationState {
    /// `vector` reshaped into vertices.
    pub fn vertices(&self) -> Vec<[f64; 2]> {
        unflatten(&self.vector)
    }
}

/// Outcome of [`crate::optimize_contour`].
///
/// Running out of iterations is a normal outcome (`converged == false`);
/// `final_max_displacement` tells how far the contour was still moving.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ContourOptimization {
    /// Refined vertices, in input order.
    pub vertices: Vec<[f64; 2]>,
    /// Number of ascent steps taken.
    pub iterations: usize,
    /// Max per-vertex displacement of the last step.
    pub final_max_displacement: f64,
    /// `true` if the displacement fell below the threshold before the cap.
    pub converged: bool,
    /// Score of the initial contour.
    pub initial_score: f64,
    /// Score of the refined contour.
    pub final_score: f64,
}

pub(crate) fn flatten(vertices: &[[f64; 2]]) -> DVector<f64> {
    DVector::from_iterator(vertices.len() * 2, vertices.iter().flatten().copied())
}

pub(crate) fn unflatten(v: &DVector<f64>) -> Vec<[f64; 2]> {
    v.as_slice()
        .chunks_exact(2)
        .map(|c| [c[0], c[1]])
        .collect()
}

/// Largest Euclidean displacement of any vertex between two flattened contours.
pub(crate) fn max_vertex_displacement(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
    a.as_slice()
        .chunks_exact(2)
        .zip(b.as_slice().chunks_exact(2))
        .map(|(p, q)| nalgebra::Vector2::new(q[0] - p[0], q[1] - p[1]).norm())
        .fold(0.0, f64::max)
}
