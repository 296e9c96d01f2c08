//! Contour refinement: numerical-gradient ascent of a polygon onto the
//! bright ridges of an edge-response image.

mod config;
mod optimizer;
pub mod preprocess;
mod result;
mod sampling;
mod score;

pub use config::ContourOptimizerConfig;
pub use optimizer::{optimize_contour, optimize_quad, ContourIterations};
pub use result::{ContourOptimization, IterationState};
pub use sampling::EdgeImage;
pub use score::contour_score;

// ── Error type ─────────────────────────────────────────────────────────────

/// Invalid input to the contour optimizer.
///
/// Not converging is not an error; see [`ContourOptimization::converged`].
#[derive(Debug, Clone, PartialEq)]
pub enum ContourError {
    /// A contour needs at least 3 vertices.
    TooFewVertices {
        /// Number of vertices provided.
        got: usize,
    },
    /// Vertex `index` has a NaN or infinite coordinate.
    NonFiniteVertex {
        /// Index of the offending vertex.
        index: usize,
    },
    /// A configuration field is out of range.
    InvalidConfig {
        /// Field name.
        field: &'static str,
        /// Constraint that was violated.
        reason: &'static str,
    },
}

impl std::fmt::Display for ContourError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewVertices { got } => {
                write!(f, "contour needs at least 3 vertices, got {}", got)
            }
            Self::NonFiniteVertex { index } => {
                write!(f, "vertex {} has a non-finite coordinate", index)
            }
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid optimizer config: {} {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ContourError {}
