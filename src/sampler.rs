// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The per-point convergence test.  Everything here is a pure
//! function of its inputs; the sampler carries no state between
//! pixels, which is what lets the engine run it from as many threads
//! as it likes against shared read-only data.

use complex::Complex;
use polynomial::{ComplexPolynomial, ComplexRootedPolynomial};

/// Maximum distance between successive iterates to declare
/// convergence.
pub const CONVERGENCE_THRESHOLD: f64 = 0.001;

/// Maximum distance from a converged point to a root to classify the
/// point as belonging to that root.
pub const ROOT_THRESHOLD: f64 = 0.002;

/// Iteration budget per point before giving up on convergence.
pub const MAX_ITERATIONS: usize = 4096;

/// Runs the Newton-Raphson iteration for one starting point and maps
/// the outcome to a classification index: 0 for no convergence, i+1
/// for convergence to the i-th root.  That 1-based mapping, with 0
/// reserved, is what the palette downstream is built against.
#[derive(Clone, Debug)]
pub struct NewtonSampler {
    rooted: ComplexRootedPolynomial,
    polynomial: ComplexPolynomial,
    derivative: ComplexPolynomial,
    convergence_threshold: f64,
    root_threshold: f64,
    max_iterations: usize,
}

impl NewtonSampler {
    /// Build a sampler with the default thresholds and iteration
    /// budget.  The derivative is expanded once here, not per pixel.
    pub fn new(rooted: ComplexRootedPolynomial) -> NewtonSampler {
        NewtonSampler::with_thresholds(
            rooted,
            CONVERGENCE_THRESHOLD,
            ROOT_THRESHOLD,
            MAX_ITERATIONS,
        )
    }

    /// Build a sampler with explicit thresholds and iteration budget.
    pub fn with_thresholds(
        rooted: ComplexRootedPolynomial,
        convergence_threshold: f64,
        root_threshold: f64,
        max_iterations: usize,
    ) -> NewtonSampler {
        let polynomial = rooted.to_polynomial();
        let derivative = polynomial.derive();
        NewtonSampler {
            rooted,
            polynomial,
            derivative,
            convergence_threshold,
            root_threshold,
            max_iterations,
        }
    }

    /// The number of color classes a result buffer produced with this
    /// sampler uses, counting the reserved "no convergence" class 0.
    pub fn num_colors(&self) -> i16 {
        self.polynomial.order() as i16 + 1
    }

    /// Iterate z := z - P(z)/P'(z) from the given starting point until
    /// two successive iterates are within the convergence threshold or
    /// the budget runs out, then classify the landing spot by its
    /// closest root.  At least one step is always taken.
    ///
    /// Wherever P' vanishes the step is undefined; such points exist
    /// in every interesting image, so that condition classifies as 0
    /// rather than surfacing the division error.
    pub fn classify(&self, z0: Complex) -> i16 {
        let mut zn = z0;
        let mut iterations = 0;
        loop {
            let step = match self.polynomial.apply(zn).divide(self.derivative.apply(zn)) {
                Ok(step) => step,
                Err(_) => return 0,
            };
            let next = zn - step;
            let moved = (next - zn).module();
            zn = next;
            iterations += 1;
            if moved <= self.convergence_threshold || iterations >= self.max_iterations {
                break;
            }
        }
        match self.rooted.index_of_closest_root(zn, self.root_threshold) {
            Some(at) => at as i16 + 1,
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic() -> NewtonSampler {
        // z^2 - 1, roots at 1 and -1
        NewtonSampler::new(ComplexRootedPolynomial::new(
            Complex::ONE,
            vec![Complex::ONE, Complex::ONE_NEG],
        ))
    }

    #[test]
    fn converges_to_the_nearest_root() {
        let sampler = quadratic();
        assert_eq!(sampler.classify(Complex::new(1.5, 0.2)), 1);
        assert_eq!(sampler.classify(Complex::new(-1.5, -0.2)), 2);
    }

    #[test]
    fn a_starting_point_on_a_root_stays_there() {
        let sampler = quadratic();
        assert_eq!(sampler.classify(Complex::ONE), 1);
        assert_eq!(sampler.classify(Complex::ONE_NEG), 2);
    }

    #[test]
    fn the_critical_point_classifies_as_zero() {
        // P'(0) = 0 for z^2 - 1: the step is undefined there, which is
        // a pixel value, not a crash.
        let sampler = quadratic();
        assert_eq!(sampler.classify(Complex::ZERO), 0);
    }

    #[test]
    fn the_imaginary_axis_never_converges() {
        // Newton on z^2 - 1 maps the imaginary axis to itself, so no
        // iterate ever approaches either root.
        let sampler = quadratic();
        assert_eq!(sampler.classify(Complex::new(0.0, 1.3)), 0);
        assert_eq!(sampler.classify(Complex::new(0.0, -0.7)), 0);
    }

    #[test]
    fn the_iteration_budget_is_respected() {
        let sampler = NewtonSampler::with_thresholds(
            ComplexRootedPolynomial::new(Complex::ONE, vec![Complex::ONE, Complex::ONE_NEG]),
            1e-12,
            1e-12,
            1,
        );
        // One step from far away gets nowhere near a root.
        assert_eq!(sampler.classify(Complex::new(100.0, 100.0)), 0);
    }

    #[test]
    fn num_colors_counts_the_background_class() {
        assert_eq!(quadratic().num_colors(), 3);
    }
}
