//! The quadrilateral type shared by chain mapping and contour refinement.

use serde::{Deserialize, Serialize};

use crate::polygon::{signed_area, Orientation};

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors raised when building a [`Quad`].
#[derive(Debug, Clone, PartialEq)]
pub enum QuadError {
    /// A corner coordinate is NaN or infinite.
    NonFinite {
        /// Index of the offending corner.
        corner: usize,
    },
    /// The outline does not have exactly four corners.
    WrongVertexCount {
        /// Number of vertices provided.
        got: usize,
    },
}

impl std::fmt::Display for QuadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite { corner } => write!(f, "corner {} has a non-finite coordinate", corner),
            Self::WrongVertexCount { got } => {
                write!(f, "a quadrilateral needs 4 vertices, got {}", got)
            }
        }
    }
}

impl std::error::Error for QuadError {}

// ── Quad ───────────────────────────────────────────────────────────────────

/// Four section-outline corners interpreted as a bilinear patch.
///
/// Corners are stored with [`Orientation::Positive`] winding, i.e. positive
/// shoelace area in the coordinates as given. For y-down image coordinates
/// that is clockwise on screen, and also clockwise in the y-flipped frame the
/// mapping functions work in. A negatively
/// wound input is reversed around corner 0 (`[c0, c3, c2, c1]`), so corner 0
/// keeps its role and every quad in a chain shares the same winding. The
/// starting corner itself is never changed; callers must still pick the same
/// physical corner first for every section.
///
/// Degenerate (zero-area, collinear) quads are accepted here and rejected by
/// the mapping functions instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[[f64; 2]; 4]", into = "[[f64; 2]; 4]")]
pub struct Quad {
    corners: [[f64; 2]; 4],
    input_orientation: Orientation,
}

impl Quad {
    /// Build a quad, canonicalizing its winding.
    pub fn new(corners: [[f64; 2]; 4]) -> Result<Self, QuadError> {
        if let Some(corner) = corners
            .iter()
            .position(|c| !c[0].is_finite() || !c[1].is_finite())
        {
            return Err(QuadError::NonFinite { corner });
        }

        let input_orientation = Orientation::of(&corners);
        let corners = match input_orientation {
            Orientation::Negative => [corners[0], corners[3], corners[2], corners[1]],
            _ => corners,
        };

        Ok(Self {
            corners,
            input_orientation,
        })
    }

    /// Build a quad from an outline slice that must hold exactly 4 vertices.
    pub fn from_slice(points: &[[f64; 2]]) -> Result<Self, QuadError> {
        let corners: [[f64; 2]; 4] = points
            .try_into()
            .map_err(|_| QuadError::WrongVertexCount { got: points.len() })?;
        Self::new(corners)
    }

    /// Corners in canonical order.
    #[inline]
    pub fn corners(&self) -> &[[f64; 2]; 4] {
        &self.corners
    }

    /// Corner `i` (0..4) in canonical order.
    #[inline]
    pub fn corner(&self, i: usize) -> [f64; 2] {
        self.corners[i % 4]
    }

    /// Winding of the corners as they were supplied to [`Quad::new`].
    pub fn input_orientation(&self) -> Orientation {
        self.input_orientation
    }

    /// `true` if construction reversed the supplied corner order.
    pub fn was_reordered(&self) -> bool {
        self.input_orientation == Orientation::Negative
    }

    /// Signed shoelace area (non-negative after canonicalization).
    pub fn area(&self) -> f64 {
        signed_area(&self.corners)
    }

    /// Corner coordinates flattened as `[x0, y0, x1, y1, ...]`.
    pub fn to_flat(&self) -> [f64; 8] {
        let mut v = [0.0; 8];
        for (i, c) in self.corners.iter().enumerate() {
            v[2 * i] = c[0];
            v[2 * i + 1] = c[1];
        }
        v
    }
}

impl TryFrom<[[f64; 2]; 4]> for Quad {
    type Error = QuadError;

    fn try_from(corners: [[f64; 2]; 4]) -> Result<Self, Self::Error> {
        Self::new(corners)
    }
}

impl From<Quad> for [[f64; 2]; 4] {
    fn from(q: Quad) -> Self {
        q.corners
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_winding_is_kept() {
        let c = [[12.0, 18.0], [110.0, 10.0], [118.0, 96.0], [6.0, 88.0]];
        let q = Quad::new(c).unwrap();
        assert_eq!(q.corners(), &c);
        assert!(!q.was_reordered());
        assert!(q.area() > 0.0);
    }

    #[test]
    fn negative_winding_is_reversed_around_first_corner() {
        let c = [[12.0, 18.0], [6.0, 88.0], [118.0, 96.0], [110.0, 10.0]];
        let q = Quad::new(c).unwrap();
        assert!(q.was_reordered());
        assert_eq!(q.input_orientation(), Orientation::Negative);
        assert_eq!(
            q.corners(),
            &[[12.0, 18.0], [110.0, 10.0], [118.0, 96.0], [6.0, 88.0]]
        );
    }

    #[test]
    fn non_finite_corner_is_rejected() {
        let c = [[0.0, 0.0], [1.0, f64::NAN], [1.0, 1.0], [0.0, 1.0]];
        assert_eq!(Quad::new(c), Err(QuadError::NonFinite { corner: 1 }));
    }

    #[test]
    fn from_slice_checks_vertex_count() {
        let tri = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        assert_eq!(
            Quad::from_slice(&tri),
            Err(QuadError::WrongVertexCount { got: 3 })
        );
    }

    #[test]
    fn serde_uses_plain_corner_arrays() {
        let q = Quad::new([[0.0, 0.0], [10.0, 0.0], [10.0, 5.0], [0.0, 5.0]]).unwrap();
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, "[[0.0,0.0],[10.0,0.0],[10.0,5.0],[0.0,5.0]]");
        let back: Quad = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }
}
