#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Newton-Raphson fractal generator
//!
//! A Newton fractal classifies every point of a rectangular window of
//! the complex plane by which root of a polynomial the Newton-Raphson
//! iteration converges to when started from that point.  Near the
//! roots the classification is boringly stable; along the basin
//! boundaries the iteration is chaotic, and coloring each pixel by the
//! index of its root produces the familiar braided images.
//!
//! The polynomial is given by its roots, f(z) = (z - z1)(z - z2)...,
//! so the classification is a closest-root lookup against the same
//! roots that define the function.  The pixel grid is cut into
//! horizontal bands ("tracks") and the bands are fed through a job
//! queue to a fixed pool of worker threads, each of which writes into
//! its own disjoint slice of the output buffer.

extern crate crossbeam;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate itertools;
#[macro_use]
extern crate log;

#[cfg(test)]
extern crate rand;

pub mod complex;
pub mod engine;
pub mod errors;
pub mod polynomial;
pub mod sampler;
pub mod viewport;

pub use complex::Complex;
pub use engine::{Completion, ParallelFractalEngine};
pub use errors::FractalError;
pub use polynomial::{ComplexPolynomial, ComplexRootedPolynomial};
pub use sampler::NewtonSampler;
pub use viewport::Viewport;
