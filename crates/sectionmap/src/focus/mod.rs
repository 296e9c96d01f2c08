//! Focus surface estimation from a sparse set of measured focus heights.

mod domain;
mod grid;
mod idw;
mod interpolator;
mod natural_neighbor;
mod surface;

pub use domain::FocusDomain;
pub use grid::FocusGrid;
pub use idw::IdwInterpolator;
pub use interpolator::{InterpolationMethod, Interpolator};
pub use natural_neighbor::NaturalNeighborInterpolator;
pub use surface::FocusSurface;

/// A measured focus height `z` at stage position `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FocusSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl FocusSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn position(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ── Error type ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum FocusError {
    /// Interpolation requested with no samples.
    NoSamples,
    /// Domain bounds or step are invalid.
    InvalidDomain(&'static str),
    /// IDW power must be finite and ≥ 1.
    InvalidExponent(f64),
    /// A sample has a NaN or infinite coordinate.
    NonFiniteSample,
}

impl std::fmt::Display for FocusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSamples => write!(f, "focus interpolation is undefined without samples"),
            Self::InvalidDomain(reason) => write!(f, "invalid focus domain: {}", reason),
            Self::InvalidExponent(k) => write!(f, "IDW power must be finite and >= 1, got {}", k),
            Self::NonFiniteSample => write!(f, "focus sample has a non-finite coordinate"),
        }
    }
}

impl std::error::Error for FocusError {}
