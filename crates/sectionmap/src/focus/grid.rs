use nalgebra::DMatrix;

use super::FocusDomain;

/// Dense focus heights over a [`FocusDomain`].
///
/// Row `iy`, column `ix` holds the height at [`FocusDomain::node`]`(ix, iy)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusGrid {
    domain: FocusDomain,
    values: DMatrix<f64>,
}

impl FocusGrid {
    /// Evaluate `f` at every node of `domain`.
    pub(crate) fn from_fn(domain: &FocusDomain, mut f: impl FnMut([f64; 2]) -> f64) -> Self {
        let values = DMatrix::from_fn(domain.ny(), domain.nx(), |iy, ix| f(domain.node(ix, iy)));
        Self {
            domain: *domain,
            values,
        }
    }

    pub fn domain(&self) -> &FocusDomain {
        &self.domain
    }

    /// Heights, one row per y node.
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Height at node `(ix, iy)`, if in range.
    pub fn get(&self, ix: usize, iy: usize) -> Option<f64> {
        self.values.get((iy, ix)).copied()
    }

    /// Height of the node whose cell contains `pos` (see [`FocusDomain::cell_of`]).
    pub fn lookup(&self, pos: [f64; 2]) -> Option<f64> {
        let (ix, iy) = self.domain.cell_of(pos);
        self.get(ix, iy)
    }

    /// Heights as nested rows, for serialization.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values
            .row_iter()
            .map(|r| r.iter().copied().collect())
            .collect()
    }

    /// Smallest and largest height, ignoring non-finite nodes.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_follow_y_nodes() {
        let d = FocusDomain::new(0.0, 3.0, 10.0, 12.0, 1.0).unwrap();
        let g = FocusGrid::from_fn(&d, |p| p[0] + 100.0 * p[1]);
        assert_eq!(g.values().shape(), (2, 3));
        assert_eq!(g.get(2, 1), Some(2.0 + 1100.0));
        assert_eq!(g.get(3, 0), None);
        assert_eq!(g.to_rows()[0], vec![1000.0, 1001.0, 1002.0]);
        assert_eq!(g.lookup([1.7, 11.2]), Some(1101.0));
        assert_eq!(g.range(), Some((1000.0, 1102.0)));
    }
}
