/// A complex number with 64-bit floating-point components.
///
/// Amplitudes of the state vectors used to check that a rewritten circuit
/// still implements the same unitary.
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Tolerance used by `PartialEq` and the approximate comparisons.
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex::new(0.0, 0.0);
    pub const ONE: Complex = Complex::new(1.0, 0.0);
    pub const I: Complex = Complex::new(0.0, 1.0);

    #[inline(always)]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// e^(iθ)
    #[inline(always)]
    pub fn cis(theta: f64) -> Self {
        Self::new(theta.cos(), theta.sin())
    }

    /// |z|²
    #[inline(always)]
    pub fn norm_sq(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    #[inline(always)]
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    #[inline(always)]
    pub fn scale(self, s: f64) -> Self {
        Self::new(self.re * s, self.im * s)
    }

    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        (self - other).norm_sq() < eps * eps
    }
}

impl Add for Complex {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

/// (a + bi)(c + di) = (ac - bd) + (ad + bc)i
impl Mul for Complex {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Div for Complex {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        (self * rhs.conj()).scale(1.0 / rhs.norm_sq())
    }
}

impl Neg for Complex {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl PartialEq for Complex {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(*other, EPSILON)
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im >= 0.0 {
            write!(f, "{:.6} + {:.6}i", self.re, self.im)
        } else {
            write!(f, "{:.6} - {:.6}i", self.re, self.im.abs())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_mul_i_squared() {
        assert_eq!(Complex::I * Complex::I, Complex::new(-1.0, 0.0));
    }

    #[test]
    fn test_mul() {
        // (1 + 2i)(3 + 4i) = -5 + 10i
        assert_eq!(Complex::new(1.0, 2.0) * Complex::new(3.0, 4.0), Complex::new(-5.0, 10.0));
    }

    #[test]
    fn test_div_by_self_is_one() {
        let z = Complex::new(1.0, 2.0);
        assert_eq!(z / z, Complex::ONE);
    }

    #[test]
    fn test_cis_quarter_turn() {
        assert_eq!(Complex::cis(PI / 2.0), Complex::I);
    }

    #[test]
    fn test_norm_sq_and_neg() {
        assert!((Complex::new(3.0, 4.0).norm_sq() - 25.0).abs() < 1e-12);
        assert_eq!(-Complex::new(1.0, -2.0), Complex::new(-1.0, 2.0));
    }

    #[test]
    fn test_display_sign() {
        assert_eq!(Complex::new(1.0, -0.5).to_string(), "1.000000 - 0.500000i");
    }
}
