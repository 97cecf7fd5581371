//! An immutable complex number and its algebra.  The standard
//! arithmetic lives in `std::ops` impls; division gets a named method
//! because it is the one operation that can fail, and the convergence
//! loop needs that failure as a value rather than a panic.

use errors::FractalError;
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// A complex number.  Plain old data; every operation returns a new
/// value and equality is structural.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Complex {
    /// The real component.
    pub re: f64,
    /// The imaginary component.
    pub im: f64,
}

impl Complex {
    /// 0+0i.
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };
    /// 1+0i.
    pub const ONE: Complex = Complex { re: 1.0, im: 0.0 };
    /// -1+0i.
    pub const ONE_NEG: Complex = Complex { re: -1.0, im: 0.0 };
    /// 0+1i.
    pub const IM: Complex = Complex { re: 0.0, im: 1.0 };
    /// 0-1i.
    pub const IM_NEG: Complex = Complex { re: 0.0, im: -1.0 };

    /// Constructor.
    pub fn new(re: f64, im: f64) -> Complex {
        Complex { re, im }
    }

    /// The modulus, the Euclidean distance of the value from the
    /// origin of the complex plane.
    pub fn module(&self) -> f64 {
        (self.re * self.re + self.im * self.im).sqrt()
    }

    /// Division.  Fails when the divisor has zero modulus, which the
    /// convergence loop hits wherever the derivative of the polynomial
    /// vanishes, so the failure has to be an ordinary value.
    pub fn divide(self, divisor: Complex) -> Result<Complex, FractalError> {
        let norm = divisor.re * divisor.re + divisor.im * divisor.im;
        if norm == 0.0 {
            return Err(FractalError::DivisionByZero);
        }
        Ok(Complex::new(
            (self.re * divisor.re + self.im * divisor.im) / norm,
            (self.im * divisor.re - self.re * divisor.im) / norm,
        ))
    }

    /// Raise to a non-negative integer power, by De Moivre on the
    /// magnitude and angle.  Negative exponents are not a thing this
    /// crate needs.
    pub fn power(self, n: u32) -> Complex {
        let r = self.module().powi(n as i32);
        let theta = self.im.atan2(self.re) * f64::from(n);
        Complex::new(r * theta.cos(), r * theta.sin())
    }

    /// The n distinct n-th roots of the value, in angle order starting
    /// from the principal root.  n must be at least 1.
    pub fn nth_roots(self, n: u32) -> Vec<Complex> {
        assert!(n >= 1, "there is no such thing as a 0th root");
        let r = self.module().powf(1.0 / f64::from(n));
        let theta = self.im.atan2(self.re);
        (0..n)
            .map(|k| {
                let angle = (theta + 2.0 * PI * f64::from(k)) / f64::from(n);
                Complex::new(r * angle.cos(), r * angle.sin())
            })
            .collect()
    }
}

impl Add for Complex {
    type Output = Complex;

    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Complex;

    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Neg for Complex {
    type Output = Complex;

    fn neg(self) -> Complex {
        Complex::new(-self.re, -self.im)
    }
}

impl Mul for Complex {
    type Output = Complex;

    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

/// Scaling by a real factor, which is what the symbolic derivative
/// multiplies coefficients by.
impl Mul<f64> for Complex {
    type Output = Complex;

    fn mul(self, rhs: f64) -> Complex {
        Complex::new(self.re * rhs, self.im * rhs)
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.im.is_sign_negative() {
            write!(f, "{}-i{}", self.re, -self.im)
        } else {
            write!(f, "{}+i{}", self.re, self.im)
        }
    }
}

/// The accepted text forms, whitespace-insensitively: a bare real
/// ("0", "-1.5"), a bare imaginary with a literal i before or after
/// the magnitude ("i", "-i", "i2", "2i"), or a real followed by a
/// signed imaginary ("1.0+i", "4 - i 7.0", "2+i2").
impl FromStr for Complex {
    type Err = FractalError;

    fn from_str(text: &str) -> Result<Complex, FractalError> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(FractalError::InvalidComplex(text.to_string()));
        }
        // A sign anywhere past the first character separates the real
        // term from the imaginary term; a leading sign belongs to the
        // first term.
        let split = compact
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c == '+' || c == '-')
            .map(|(at, _)| at);
        let parsed = match split {
            None => {
                if compact.contains('i') {
                    parse_imaginary(&compact).map(|im| Complex::new(0.0, im))
                } else {
                    compact.parse::<f64>().ok().map(|re| Complex::new(re, 0.0))
                }
            }
            Some(at) => {
                let re = compact[..at].parse::<f64>().ok();
                let im = parse_imaginary(&compact[at..]);
                match (re, im) {
                    (Some(re), Some(im)) => Some(Complex::new(re, im)),
                    _ => None,
                }
            }
        };
        parsed.ok_or_else(|| FractalError::InvalidComplex(text.to_string()))
    }
}

/// Reads one imaginary term: an optional sign, then a magnitude with
/// the i on either side of it.  A lone "i" means 1.
fn parse_imaginary(term: &str) -> Option<f64> {
    let (sign, body) = if term.starts_with('-') {
        (-1.0, &term[1..])
    } else if term.starts_with('+') {
        (1.0, &term[1..])
    } else {
        (1.0, term)
    };
    let magnitude = if body.starts_with('i') {
        &body[1..]
    } else if body.ends_with('i') {
        &body[..body.len() - 1]
    } else {
        return None;
    };
    if magnitude.is_empty() {
        return Some(sign);
    }
    if magnitude.starts_with('+') || magnitude.starts_with('-') {
        return None;
    }
    magnitude.parse::<f64>().ok().map(|m| sign * m)
}
