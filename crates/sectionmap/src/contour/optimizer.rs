//! Gradient-ascent refinement of a polygon onto image edges.

use nalgebra::DVector;

use super::config::ContourOptimizerConfig;
use super::result::{flatten, max_vertex_displacement, unflatten, ContourOptimization, IterationState};
use super::sampling::EdgeImage;
use super::score::score_vector;
use super::ContourError;
use crate::quad::{Quad, QuadError};

/// Iterator over ascent steps, one [`IterationState`] per step.
///
/// Ends after the first step whose displacement falls below the configured
/// threshold, or after `max_iterations` steps. A step that would produce a
/// non-finite coordinate is discarded and ends the run (see
/// [`ContourIterations::diverged`]). Dropping it early abandons the
/// optimization with no side effects.
pub struct ContourIterations<'a, I: EdgeImage + ?Sized> {
    image: &'a I,
    config: ContourOptimizerConfig,
    current: DVector<f64>,
    iteration: usize,
    finished: bool,
    diverged: bool,
}

impl<'a, I: EdgeImage + ?Sized> ContourIterations<'a, I> {
    /// Validate inputs and set up the ascent from `initial`.
    pub fn new(
        image: &'a I,
        initial: &[[f64; 2]],
        config: &ContourOptimizerConfig,
    ) -> Result<Self, ContourError> {
        config.validate()?;
        if initial.len() < 3 {
            return Err(ContourError::TooFewVertices {
                got: initial.len(),
            });
        }
        if let Some(index) = initial
            .iter()
            .position(|p| !p[0].is_finite() || !p[1].is_finite())
        {
            return Err(ContourError::NonFiniteVertex { index });
        }

        Ok(Self {
            image,
            config: config.clone(),
            current: flatten(initial),
            iteration: 0,
            finished: false,
            diverged: false,
        })
    }

    /// Contour the next step will start from.
    pub fn current(&self) -> &DVector<f64> {
        &self.current
    }

    /// `true` if the run stopped because a step left the finite range.
    /// [`current`](Self::current) then holds the last finite contour.
    pub fn diverged(&self) -> bool {
        self.diverged
    }

    /// Forward-difference gradient; perturbs one coordinate at a time.
    fn gradient(&self, base_score: f64) -> DVector<f64> {
        let h = self.config.gradient_h;
        let spacing = self.config.edge_sample_distance;
        let mut probe = self.current.clone();
        DVector::from_fn(self.current.len(), |i, _| {
            let orig = probe[i];
            probe[i] = orig + h;
            let s = score_vector(self.image, &probe, spacing);
            probe[i] = orig;
            (s - base_score) / h
        })
    }
}

impl<I: EdgeImage + ?Sized> Iterator for ContourIterations<'_, I> {
    type Item = IterationState;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.iteration >= self.config.max_iterations {
            return None;
        }

        let base_score = score_vector(self.image, &self.current, self.config.edge_sample_distance);
        let grad = self.gradient(base_score);
        let next = &self.current + grad * self.config.gradient_step_size;
        if next.iter().any(|v| !v.is_finite()) {
            tracing::warn!(
                iteration = self.iteration + 1,
                step_size = self.config.gradient_step_size,
                "contour ascent step left the finite range; stopping"
            );
            self.finished = true;
            self.diverged = true;
            return None;
        }
        let max_displacement = max_vertex_displacement(&self.current, &next);

        self.iteration += 1;
        if max_displacement < self.config.vertex_distance_threshold {
            self.finished = true;
        }

        let previous = std::mem::replace(&mut self.current, next);
        tracing::trace!(
            iteration = self.iteration,
            score = base_score,
            max_displacement,
            "contour ascent step"
        );

        Some(IterationState {
            vector: self.current.clone(),
            previous,
            iteration: self.iteration,
            max_displacement,
            score: base_score,
        })
    }
}

/// Refine `initial` so its edges follow the bright ridges of `image`.
///
/// Runs [`ContourIterations`] to completion. Returns an error only for
/// invalid input; a run that hits `max_iterations` is reported through
/// [`ContourOptimization::converged`].
pub fn optimize_contour<I: EdgeImage + ?Sized>(
    image: &I,
    initial: &[[f64; 2]],
    config: &ContourOptimizerConfig,
) -> Result<ContourOptimization, ContourError> {
    let mut steps = ContourIterations::new(image, initial, config)?;
    let initial_score = score_vector(image, steps.current(), config.edge_sample_distance);

    let mut iterations = 0;
    let mut final_max_displacement = 0.0;
    for state in steps.by_ref() {
        iterations = state.iteration;
        final_max_displacement = state.max_displacement;
    }

    let converged =
        !steps.diverged() && iterations > 0 && final_max_displacement < config.vertex_distance_threshold;
    let final_score = score_vector(image, steps.current(), config.edge_sample_distance);

    if converged {
        tracing::debug!(iterations, final_score, "contour optimization converged");
    } else {
        tracing::debug!(
            iterations,
            final_max_displacement,
            "contour optimization hit the iteration cap"
        );
    }

    Ok(ContourOptimization {
        vertices: unflatten(steps.current()),
        iterations,
        final_max_displacement,
        converged,
        initial_score,
        final_score,
    })
}

/// [`optimize_contour`] for a section quad, returning the refined quad.
pub fn optimize_quad<I: EdgeImage + ?Sized>(
    image: &I,
    quad: &Quad,
    config: &ContourOptimizerConfig,
) -> Result<(Quad, ContourOptimization), ContourError> {
    let result = optimize_contour(image, quad.corners(), config)?;
    let refined = Quad::from_slice(&result.vertices).map_err(|e| match e {
        QuadError::NonFinite { corner } => ContourError::NonFiniteVertex { index: corner },
        QuadError::WrongVertexCount { got } => ContourError::TooFewVertices { got },
    })?;
    Ok((refined, result))
}
