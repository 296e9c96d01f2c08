use super::FocusError;

/// Rectangular stage region covered by a focus grid.
///
/// Grid nodes sit at `(xmin + ix·step, ymin + iy·step)` for
/// `ix < ceil((xmax − xmin) / step)` and likewise in y; the upper bound is
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawDomain", into = "RawDomain")]
pub struct FocusDomain {
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
    step: f64,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct RawDomain {
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
    step: f64,
}

impl TryFrom<RawDomain> for FocusDomain {
    type Error = FocusError;

    fn try_from(r: RawDomain) -> Result<Self, Self::Error> {
        Self::new(r.xmin, r.xmax, r.ymin, r.ymax, r.step)
    }
}

impl From<FocusDomain> for RawDomain {
    fn from(d: FocusDomain) -> Self {
        Self {
            xmin: d.xmin,
            xmax: d.xmax,
            ymin: d.ymin,
            ymax: d.ymax,
            step: d.step,
        }
    }
}

impl FocusDomain {
    /// Validated domain: finite bounds, `xmin < xmax`, `ymin < ymax`, `step > 0`.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64, step: f64) -> Result<Self, FocusError> {
        let all_finite = [xmin, xmax, ymin, ymax, step].iter().all(|v| v.is_finite());
        if !all_finite {
            return Err(FocusError::InvalidDomain("bounds and step must be finite"));
        }
        if xmin >= xmax || ymin >= ymax {
            return Err(FocusError::InvalidDomain("min must be below max on both axes"));
        }
        if step <= 0.0 {
            return Err(FocusError::InvalidDomain("step must be > 0"));
        }
        Ok(Self {
            xmin,
            xmax,
            ymin,
            ymax,
            step,
        })
    }

    /// Bounding box of `points` grown by `margin` (x, y) on every side.
    ///
    /// Typical use: the tile centers of an acquisition plus the focus sample
    /// positions, with half a tile as margin.
    pub fn enclosing(points: &[[f64; 2]], margin: [f64; 2], step: f64) -> Result<Self, FocusError> {
        if points.is_empty() {
            return Err(FocusError::InvalidDomain("no points to enclose"));
        }
        let mut lo = [f64::INFINITY; 2];
        let mut hi = [f64::NEG_INFINITY; 2];
        for p in points {
            for k in 0..2 {
                lo[k] = lo[k].min(p[k]);
                hi[k] = hi[k].max(p[k]);
            }
        }
        Self::new(
            lo[0] - margin[0],
            hi[0] + margin[0],
            lo[1] - margin[1],
            hi[1] + margin[1],
            step,
        )
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of grid nodes along x.
    pub fn nx(&self) -> usize {
        ((self.xmax - self.xmin) / self.step).ceil() as usize
    }

    /// Number of grid nodes along y.
    pub fn ny(&self) -> usize {
        ((self.ymax - self.ymin) / self.step).ceil() as usize
    }

    /// Stage position of node `(ix, iy)`.
    #[inline]
    pub fn node(&self, ix: usize, iy: usize) -> [f64; 2] {
        [
            self.xmin + ix as f64 * self.step,
            self.ymin + iy as f64 * self.step,
        ]
    }

    /// Node whose cell contains `pos`: `floor((p − min) / step)`, clamped to
    /// the grid. Positions outside the domain snap to the nearest edge node.
    pub fn cell_of(&self, pos: [f64; 2]) -> (usize, usize) {
        let clamp = |v: f64, n: usize| -> usize {
            if v.is_nan() || v <= 0.0 {
                0
            } else {
                (v.floor() as usize).min(n.saturating_sub(1))
            }
        };
        (
            clamp((pos[0] - self.xmin) / self.step, self.nx()),
            clamp((pos[1] - self.ymin) / self.step, self.ny()),
        )
    }
}
