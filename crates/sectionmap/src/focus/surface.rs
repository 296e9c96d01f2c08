use super::{
    FocusDomain, FocusError, FocusGrid, FocusSample, IdwInterpolator, InterpolationMethod,
    Interpolator, NaturalNeighborInterpolator,
};

type BoxedInterpolator = Box<dyn Interpolator + Send + Sync>;

/// Focus heights measured at a few stage positions, interpolated on demand.
///
/// Samples are append-only until [`FocusSurface::reset`] or
/// [`FocusSurface::load`]. Any change to samples or domain drops the prepared
/// interpolator; the next query rebuilds it.
pub struct FocusSurface {
    domain: FocusDomain,
    method: InterpolationMethod,
    samples: Vec<FocusSample>,
    prepared: Option<BoxedInterpolator>,
}

impl std::fmt::Debug for FocusSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusSurface")
            .field("domain", &self.domain)
            .field("method", &self.method)
            .field("n_samples", &self.samples.len())
            .field("prepared", &self.prepared.is_some())
            .finish()
    }
}

impl FocusSurface {
    /// Empty surface using [`InterpolationMethod::preferred`].
    pub fn new(domain: FocusDomain) -> Self {
        Self {
            domain,
            method: InterpolationMethod::preferred(),
            samples: Vec::new(),
            prepared: None,
        }
    }

    /// Empty surface with an explicit strategy.
    ///
    /// Natural neighbor without the `natural-neighbor` feature resolves to
    /// IDW (power 1) here, once.
    pub fn with_method(domain: FocusDomain, method: InterpolationMethod) -> Result<Self, FocusError> {
        let method = method.resolve();
        if let InterpolationMethod::InverseDistance { power } = method {
            if !power.is_finite() || power < 1.0 {
                return Err(FocusError::InvalidExponent(power));
            }
        }
        Ok(Self {
            domain,
            method,
            samples: Vec::new(),
            prepared: None,
        })
    }

    pub fn domain(&self) -> &FocusDomain {
        &self.domain
    }

    /// Strategy in effect (after feature resolution).
    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    pub fn samples(&self) -> &[FocusSample] {
        &self.samples
    }

    /// `true` if a grid for the current samples and domain is cached.
    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    /// Record a focus measurement.
    pub fn add_sample(&mut self, pos: [f64; 2], z: f64) -> Result<(), FocusError> {
        let sample = FocusSample::new(pos[0], pos[1], z);
        if !sample.is_finite() {
            return Err(FocusError::NonFiniteSample);
        }
        self.samples.push(sample);
        self.prepared = None;
        Ok(())
    }

    /// Drop all samples and the cached grid.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.prepared = None;
    }

    /// Replace domain and samples at once.
    pub fn load(&mut self, domain: FocusDomain, samples: Vec<FocusSample>) -> Result<(), FocusError> {
        if samples.iter().any(|s| !s.is_finite()) {
            return Err(FocusError::NonFiniteSample);
        }
        self.domain = domain;
        self.samples = samples;
        self.prepared = None;
        Ok(())
    }

    /// Replace the domain, keeping the samples.
    pub fn set_domain(&mut self, domain: FocusDomain) {
        self.domain = domain;
        self.prepared = None;
    }

    fn prepare(&mut self) -> Result<&BoxedInterpolator, FocusError> {
        if self.samples.is_empty() {
            return Err(FocusError::NoSamples);
        }
        if self.prepared.is_none() {
            let samples = self.samples.clone();
            let mut interp: BoxedInterpolator = match self.method {
                InterpolationMethod::InverseDistance { power } => {
                    Box::new(IdwInterpolator::new(samples, power)?)
                }
                InterpolationMethod::NaturalNeighbor => {
                    Box::new(NaturalNeighborInterpolator::new(samples))
                }
            };
            interp.prepare(&self.domain);
            tracing::debug!(
                n_samples = self.samples.len(),
                nx = self.domain.nx(),
                ny = self.domain.ny(),
                method = ?self.method,
                "prepared focus surface"
            );
            self.prepared = Some(interp);
        }
        self.prepared.as_ref().ok_or(FocusError::NoSamples)
    }

    /// Interpolated focus height at `pos`, preparing the grid if needed.
    pub fn point_sample(&mut self, pos: [f64; 2]) -> Result<f64, FocusError> {
        self.prepare()?
            .point_sample(pos)
            .ok_or(FocusError::NoSamples)
    }

    /// Dense grid over the domain, preparing it if needed.
    pub fn grid_samples(&mut self) -> Result<&FocusGrid, FocusError> {
        self.prepare()?.grid_samples().ok_or(FocusError::NoSamples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn domain() -> FocusDomain {
        FocusDomain::new(0.0, 100.0, 0.0, 100.0, 10.0).unwrap()
    }

    fn idw1() -> InterpolationMethod {
        InterpolationMethod::InverseDistance { power: 1.0 }
    }

    #[test]
    fn empty_surface_has_no_value() {
        let mut s = FocusSurface::new(domain());
        assert_eq!(s.point_sample([1.0, 1.0]), Err(FocusError::NoSamples));
        assert!(matches!(s.grid_samples(), Err(FocusError::NoSamples)));
    }

    #[test]
    fn adding_sample_invalidates_grid() {
        let mut s = FocusSurface::with_method(domain(), idw1()).unwrap();
        s.add_sample([0.0, 0.0], 1.0).unwrap();
        assert_abs_diff_eq!(s.point_sample([50.0, 50.0]).unwrap(), 1.0, epsilon = 1e-12);
        assert!(s.is_prepared());

        s.add_sample([100.0, 100.0], 3.0).unwrap();
        assert!(!s.is_prepared());
        assert_abs_diff_eq!(s.point_sample([50.0, 50.0]).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn reset_and_load() {
        let mut s = FocusSurface::with_method(domain(), idw1()).unwrap();
        s.add_sample([10.0, 10.0], 5.0).unwrap();
        s.reset();
        assert!(s.samples().is_empty());
        assert_eq!(s.point_sample([1.0, 1.0]), Err(FocusError::NoSamples));

        let d2 = FocusDomain::new(0.0, 4.0, 0.0, 2.0, 1.0).unwrap();
        s.load(d2, vec![FocusSample::new(1.0, 1.0, 7.0)]).unwrap();
        let g = s.grid_samples().unwrap();
        assert_eq!(g.values().shape(), (2, 4));
        for &v in g.values().iter() {
            assert_abs_diff_eq!(v, 7.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn non_finite_sample_rejected() {
        let mut s = FocusSurface::new(domain());
        assert_eq!(
            s.add_sample([f64::NAN, 0.0], 1.0),
            Err(FocusError::NonFiniteSample)
        );
        assert!(s.samples().is_empty());
    }

    #[test]
    fn set_domain_rebuilds_grid() {
        let mut s = FocusSurface::with_method(domain(), idw1()).unwrap();
        s.add_sample([0.0, 0.0], 1.0).unwrap();
        assert_eq!(s.grid_samples().unwrap().values().shape(), (10, 10));
        s.set_domain(FocusDomain::new(0.0, 50.0, 0.0, 20.0, 10.0).unwrap());
        assert_eq!(s.grid_samples().unwrap().values().shape(), (2, 5));
    }

    #[test]
    fn invalid_power_rejected_at_construction() {
        let err = FocusSurface::with_method(
            domain(),
            InterpolationMethod::InverseDistance { power: 0.0 },
        )
        .unwrap_err();
        assert_eq!(err, FocusError::InvalidExponent(0.0));
    }

    #[cfg(feature = "natural-neighbor")]
    #[test]
    fn preferred_method_is_natural_neighbor() {
        let s = FocusSurface::new(domain());
        assert_eq!(s.method(), InterpolationMethod::NaturalNeighbor);
    }

    #[cfg(not(feature = "natural-neighbor"))]
    #[test]
    fn natural_neighbor_degrades_to_linear_idw() {
        let linear = InterpolationMethod::InverseDistance { power: 1.0 };
        assert_eq!(InterpolationMethod::preferred(), linear);
        assert_eq!(FocusSurface::new(domain()).method(), linear);

        let mut s =
            FocusSurface::with_method(domain(), InterpolationMethod::NaturalNeighbor).unwrap();
        assert_eq!(s.method(), linear);
        s.add_sample([0.0, 0.0], 1.0).unwrap();
        s.add_sample([100.0, 0.0], 3.0).unwrap();
        assert_abs_diff_eq!(s.point_sample([50.0, 0.0]).unwrap(), 2.0, epsilon = 1e-12);
        assert_eq!(s.grid_samples().unwrap().values().shape(), (10, 10));
    }
}
