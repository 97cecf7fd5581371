//! The error taxonomy of the crate.  Everything that can go wrong
//! outside of a worker thread funnels through [`FractalError`].

/// The failure conditions of the crate.  Cancellation of an in-flight
/// request is deliberately not among them; an abandoned request is a
/// normal outcome, not an error.
#[derive(Debug, Fail, PartialEq)]
pub enum FractalError {
    /// A string that could not be read as a complex number.  Carries
    /// the offending input so it can be shown to whoever typed it.
    #[fail(display = "cannot parse {:?} as a complex number", _0)]
    InvalidComplex(String),

    /// Division by a complex number of zero modulus.  The convergence
    /// loop recovers from this locally; anywhere else it propagates.
    #[fail(display = "division by a zero-modulus complex number")]
    DivisionByZero,

    /// A worker or track count that is not at least one.
    #[fail(display = "{} must be at least 1, got {}", name, value)]
    BadConfiguration {
        /// Which knob was out of range.
        name: &'static str,
        /// The rejected value.
        value: usize,
    },
}
