//! Quadrilateral section outlines and the bilinear frame mapping between them.

mod mapping;
mod types;

pub use mapping::{
    normalize_point, propagate_point, solve_eta, transform_point, unnormalize_point, ChainError,
    EtaRoots, MappingError,
};
pub use types::{Quad, QuadError};
