use super::{FocusDomain, FocusError, FocusGrid, FocusSample, InterpolationMethod, Interpolator};

/// Distance below which a query is treated as sitting on a sample.
pub(super) const COINCIDENT_EPS: f64 = 1e-9;

/// Inverse-distance-weighted average of `samples` at `pos`.
///
/// Returns the sample's own height when `pos` coincides with it, and `None`
/// when `samples` is empty.
pub(crate) fn idw_value(samples: &[FocusSample], pos: [f64; 2], power: f64) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    let mut nearest = (f64::INFINITY, 0.0);
    let mut weights = Vec::with_capacity(samples.len());
    for s in samples {
        let d = (s.x - pos[0]).hypot(s.y - pos[1]);
        if d < nearest.0 {
            nearest = (d, s.z);
        }
        weights.push(d.powf(-power));
    }

    if nearest.0 < COINCIDENT_EPS {
        return Some(nearest.1);
    }
    // Normalize first so a lone sample gets weight exactly 1.
    let weight_sum: f64 = weights.iter().sum();
    Some(
        weights
            .iter()
            .zip(samples)
            .map(|(w, s)| (w / weight_sum) * s.z)
            .sum(),
    )
}

/// Inverse-distance weighting: `z(p) = Σ wᵢ zᵢ / Σ wᵢ`, `wᵢ = 1 / dᵢᵏ`.
///
/// Higher powers flatten the surface around each sample (plateaus) and
/// sharpen the transitions between them.
#[derive(Debug, Clone)]
pub struct IdwInterpolator {
    samples: Vec<FocusSample>,
    power: f64,
    grid: Option<FocusGrid>,
}

impl IdwInterpolator {
    /// Power must be finite and at least 1.
    pub fn new(samples: Vec<FocusSample>, power: f64) -> Result<Self, FocusError> {
        if !power.is_finite() || power < 1.0 {
            return Err(FocusError::InvalidExponent(power));
        }
        Ok(Self {
            samples,
            power,
            grid: None,
        })
    }

    pub fn power(&self) -> f64 {
        self.power
    }
}

impl Interpolator for IdwInterpolator {
    fn prepare(&mut self, domain: &FocusDomain) {
        self.grid = Some(FocusGrid::from_fn(domain, |p| {
            idw_value(&self.samples, p, self.power).unwrap_or(f64::NAN)
        }));
    }

    fn point_sample(&self, pos: [f64; 2]) -> Option<f64> {
        idw_value(&self.samples, pos, self.power)
    }

    fn grid_samples(&self) -> Option<&FocusGrid> {
        self.grid.as_ref()
    }

    fn method(&self) -> InterpolationMethod {
        InterpolationMethod::InverseDistance { power: self.power }
    }
}
