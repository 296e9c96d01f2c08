use super::{FocusDomain, FocusGrid};

/// A scattered-data interpolation strategy for focus heights.
///
/// `prepare` builds the dense grid for a domain; `point_sample` answers a
/// single query. Whether a point query is computed exactly or read from the
/// prepared grid is up to the implementation.
pub trait Interpolator {
    /// Build (or rebuild) the grid over `domain`.
    fn prepare(&mut self, domain: &FocusDomain);

    /// Interpolated height at `pos`, or `None` if the interpolator cannot
    /// answer yet (no samples, or not prepared when a grid is required).
    fn point_sample(&self, pos: [f64; 2]) -> Option<f64>;

    /// Grid from the last `prepare`, if any.
    fn grid_samples(&self) -> Option<&FocusGrid>;

    /// Strategy implemented by this interpolator.
    fn method(&self) -> InterpolationMethod;
}

/// Interpolation strategy, chosen once when a surface is built.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Inverse-distance weighting with weights `1 / d^power`.
    InverseDistance { power: f64 },
    /// Sibson natural-neighbor interpolation on a Delaunay triangulation.
    NaturalNeighbor,
}

impl Default for InterpolationMethod {
    fn default() -> Self {
        Self::preferred()
    }
}

impl InterpolationMethod {
    /// Natural neighbor when compiled in, otherwise linear IDW.
    pub fn preferred() -> Self {
        if cfg!(feature = "natural-neighbor") {
            Self::NaturalNeighbor
        } else {
            Self::InverseDistance { power: 1.0 }
        }
    }

    /// The method that will actually run in this build.
    ///
    /// Natural neighbor without the `natural-neighbor` feature degrades to
    /// IDW with power 1.
    pub fn resolve(self) -> Self {
        match self {
            Self::NaturalNeighbor if !cfg!(feature = "natural-neighbor") => {
                tracing::warn!("natural-neighbor interpolation not compiled in; using IDW (power 1)");
                Self::InverseDistance { power: 1.0 }
            }
            other => other,
        }
    }
}
