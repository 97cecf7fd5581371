//! The two faces of a polynomial over the complex numbers: a
//! coefficient form that evaluates cheaply and differentiates
//! symbolically, and a rooted form that knows where its zeros are and
//! can say which one a point has landed on.

use complex::Complex;

/// A polynomial in coefficient form, highest degree first.  Built
/// once, read-only afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexPolynomial {
    coefficients: Vec<Complex>,
}

impl ComplexPolynomial {
    /// Constructor.  At least one coefficient is required; the zero
    /// polynomial is `[0]`, not `[]`.
    pub fn new(coefficients: Vec<Complex>) -> ComplexPolynomial {
        assert!(
            !coefficients.is_empty(),
            "a polynomial has at least one coefficient"
        );
        ComplexPolynomial { coefficients }
    }

    /// The order (degree) of the polynomial.
    pub fn order(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Evaluate at a point, by Horner's rule.  This runs once per
    /// Newton step per pixel, so it stays O(order) with no powers.
    pub fn apply(&self, z: Complex) -> Complex {
        let mut acc = self.coefficients[0];
        for &coefficient in &self.coefficients[1..] {
            acc = acc * z + coefficient;
        }
        acc
    }

    /// The symbolic derivative, in coefficient form.  An order-0
    /// polynomial derives to the order-0 zero polynomial; callers that
    /// go on to divide by an evaluation of the result guard that
    /// themselves.
    pub fn derive(&self) -> ComplexPolynomial {
        let order = self.order();
        if order == 0 {
            return ComplexPolynomial::new(vec![Complex::ZERO]);
        }
        let derived = self.coefficients[..order]
            .iter()
            .enumerate()
            .map(|(at, &coefficient)| coefficient * (order - at) as f64)
            .collect();
        ComplexPolynomial::new(derived)
    }
}

/// A polynomial in rooted form, scale * (z - z1)(z - z2)..., which is
/// how the fractal is specified.  The position of a root in the list
/// is its identity: pixels that converge to `roots[i]` are classified
/// as color index i+1 downstream, so the order is significant and
/// duplicates are allowed (they merely shadow each other).
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexRootedPolynomial {
    scale: Complex,
    roots: Vec<Complex>,
}

impl ComplexRootedPolynomial {
    /// Constructor.  At least one root is required.
    pub fn new(scale: Complex, roots: Vec<Complex>) -> ComplexRootedPolynomial {
        assert!(!roots.is_empty(), "a rooted polynomial has at least one root");
        ComplexRootedPolynomial { scale, roots }
    }

    /// The order of the polynomial, which is the number of roots.
    pub fn order(&self) -> usize {
        self.roots.len()
    }

    /// Evaluate directly in product form.  The coefficient form is the
    /// one used per-pixel; this exists so the two representations can
    /// be checked against each other.
    pub fn apply(&self, z: Complex) -> Complex {
        self.roots.iter().fold(self.scale, |acc, &root| acc * (z - root))
    }

    /// Expand into coefficient form by convolving (1, -root) into the
    /// running coefficient vector, once per root.  Quadratic in the
    /// number of roots, and done once per request, never per pixel.
    pub fn to_polynomial(&self) -> ComplexPolynomial {
        let mut coefficients = vec![self.scale];
        for &root in &self.roots {
            let mut next = vec![Complex::ZERO; coefficients.len() + 1];
            for (at, &coefficient) in coefficients.iter().enumerate() {
                next[at] = next[at] + coefficient;
                next[at + 1] = next[at + 1] + coefficient * -root;
            }
            coefficients = next;
        }
        ComplexPolynomial::new(coefficients)
    }

    /// The index of the root nearest to a point, provided that nearest
    /// distance is strictly under the threshold.  On an exact tie the
    /// first root in scan order wins; that choice decides pixel colors
    /// on basin boundaries, so it is part of the contract.
    pub fn index_of_closest_root(&self, z: Complex, threshold: f64) -> Option<usize> {
        let mut closest: Option<(usize, f64)> = None;
        for (at, &root) in self.roots.iter().enumerate() {
            let distance = (z - root).module();
            match closest {
                Some((_, best)) if distance >= best => {}
                _ => closest = Some((at, distance)),
            }
        }
        match closest {
            Some((at, distance)) if distance < threshold => Some(at),
            _ => None,
        }
    }
}
