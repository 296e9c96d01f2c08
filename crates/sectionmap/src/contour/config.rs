use super::ContourError;

/// Parameters of the gradient-ascent contour refinement.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ContourOptimizerConfig {
    /// Forward-difference step (pixels) for the numerical gradient.
    pub gradient_h: f64,
    /// Hard cap on the number of ascent steps.
    pub max_iterations: usize,
    /// Multiplier applied to the gradient in each ascent step.
    pub gradient_step_size: f64,
    /// Target spacing (pixels) between score samples along an edge.
    pub edge_sample_distance: f64,
    /// Stop once no vertex moves farther than this (pixels) in one step.
    pub vertex_distance_threshold: f64,
}

impl Default for ContourOptimizerConfig {
    fn default() -> Self {
        Self {
            gradient_h: 1.0,
            max_iterations: 100,
            gradient_step_size: 5e-3,
            edge_sample_distance: 100.0,
            vertex_distance_threshold: 0.5,
        }
    }
}

impl ContourOptimizerConfig {
    /// Reject configurations the optimizer cannot run with.
    pub fn validate(&self) -> Result<(), ContourError> {
        let positive = |name: &'static str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ContourError::InvalidConfig {
                    field: name,
                    reason: "must be finite and > 0",
                })
            }
        };
        positive("gradient_h", self.gradient_h)?;
        positive("edge_sample_distance", self.edge_sample_distance)?;
        positive("vertex_distance_threshold", self.vertex_distance_threshold)?;
        if !self.gradient_step_size.is_finite() {
            return Err(ContourError::InvalidConfig {
                field: "gradient_step_size",
                reason: "must be finite",
            });
        }
        if self.max_iterations == 0 {
            return Err(ContourError::InvalidConfig {
                field: "max_iterations",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
