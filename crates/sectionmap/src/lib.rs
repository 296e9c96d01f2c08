//! sectionmap — geometry and estimation engine for serial-section correlative
//! microscopy.
//!
//! Three independent components:
//!
//! 1. **Quad mapping** – invert the bilinear map of a section outline to get
//!    normalized `(ξ, η)` coordinates, map them into another section, and
//!    propagate a point of interest along a chain of serial sections.
//! 2. **Contour refinement** – numerical-gradient ascent of an approximate
//!    outline onto the bright ridges of an edge-response image.
//! 3. **Focus surface** – interpolate sparse focus measurements onto a dense
//!    stage grid by inverse-distance weighting or natural-neighbor
//!    interpolation.
//!
//! # Public API
//! - [`Quad`], [`transform_point`], [`propagate_point`] for chain mapping
//! - [`optimize_contour`] / [`optimize_quad`] with [`ContourOptimizerConfig`]
//! - [`FocusSurface`] with [`FocusDomain`] and [`InterpolationMethod`]
//! - [`io`] for section-outline JSON and focus-sample files
//!
//! Points are `[x, y]` in image pixels (y down) or stage units; a component
//! never mixes frames.

pub mod contour;
pub mod focus;
pub mod io;
pub mod polygon;
mod quad;

#[cfg(test)]
pub(crate) mod test_utils;

pub use contour::{
    contour_score, optimize_contour, optimize_quad, ContourError, ContourIterations,
    ContourOptimization, ContourOptimizerConfig, EdgeImage, IterationState,
};
pub use focus::{
    FocusDomain, FocusError, FocusGrid, FocusSample, FocusSurface, IdwInterpolator,
    InterpolationMethod, Interpolator, NaturalNeighborInterpolator,
};
pub use polygon::{reduce_polygon, Orientation};
pub use quad::{
    normalize_point, propagate_point, solve_eta, transform_point, unnormalize_point, ChainError,
    EtaRoots, MappingError, Quad, QuadError,
};
