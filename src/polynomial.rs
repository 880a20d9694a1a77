//! Univariate polynomials with exact rational coefficients, as the solver sees equations.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};

use crate::expr::{Expr, Rational};
use num_traits::{One, ToPrimitive, Zero};

/// Highest degree [`Poly::from_expr`] will expand an expression to.
pub const MAX_DEGREE: usize = 64;

/// Coefficients keyed by exponent; zero coefficients are never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    coeffs: BTreeMap<usize, Rational>,
}

impl Poly {
    pub fn zero() -> Self {
        Poly {
            coeffs: BTreeMap::new(),
        }
    }

    pub fn one() -> Self {
        Poly::from_constant(Rational::one())
    }

    pub fn from_constant(c: Rational) -> Self {
        let mut coeffs = BTreeMap::new();
        if !c.is_zero() {
            coeffs.insert(0, c);
        }
        Poly { coeffs }
    }

    /// `x^1` in whatever variable the caller has in mind.
    pub fn monomial() -> Self {
        let mut coeffs = BTreeMap::new();
        coeffs.insert(1, Rational::one());
        Poly { coeffs }
    }

    /// Interpret `expr` as a polynomial in `var`. Returns `None` when `expr` involves any other
    /// symbol, a division by something non-constant, a non-natural exponent, or would expand
    /// past [`MAX_DEGREE`].
    pub fn from_expr(expr: &Expr, var: &str) -> Option<Self> {
        if !expr.contains_var(var) {
            return extract_rational(expr).map(Poly::from_constant);
        }
        match expr {
            Expr::Variable(v) if v == var => Some(Poly::monomial()),
            Expr::Add(a, b) => Some(Self::from_expr(a, var)? + Self::from_expr(b, var)?),
            Expr::Sub(a, b) => Some(Self::from_expr(a, var)? - Self::from_expr(b, var)?),
            Expr::Mul(a, b) => Self::from_expr(a, var)?.checked_mul(&Self::from_expr(b, var)?),
            Expr::Div(a, b) => {
                let denom = extract_rational(b).filter(|d| !d.is_zero())?;
                Some(Self::from_expr(a, var)?.scale(&(Rational::one() / denom)))
            }
            Expr::Neg(inner) => Some(-Self::from_expr(inner, var)?),
            Expr::Pow(base, exp) => {
                let power = extract_natural(exp)?;
                Self::from_expr(base, var)?.checked_pow(power)
            }
            _ => None,
        }
    }

    pub fn degree(&self) -> Option<usize> {
        self.coeffs.keys().next_back().copied()
    }

    pub fn coeff(&self, power: usize) -> Rational {
        self.coeffs
            .get(&power)
            .cloned()
            .unwrap_or_else(Rational::zero)
    }

    /// `None` when the product would exceed [`MAX_DEGREE`].
    pub fn checked_mul(&self, rhs: &Poly) -> Option<Poly> {
        let degree = self.degree().unwrap_or(0) + rhs.degree().unwrap_or(0);
        if degree > MAX_DEGREE {
            return None;
        }
        Some(self.clone() * rhs.clone())
    }

    /// Square-and-multiply; `None` when `exp` or the resulting degree exceeds [`MAX_DEGREE`].
    pub fn checked_pow(&self, exp: usize) -> Option<Poly> {
        let degree = self.degree().unwrap_or(0).checked_mul(exp)?;
        if exp > MAX_DEGREE || degree > MAX_DEGREE {
            return None;
        }
        let mut result = Poly::one();
        let mut base = self.clone();
        let mut n = exp;
        while n > 0 {
            if n & 1 == 1 {
                result = result * base.clone();
            }
            n >>= 1;
            if n > 0 {
                base = base.clone() * base;
            }
        }
        Some(result)
    }

    pub fn scale(&self, k: &Rational) -> Self {
        if k.is_zero() {
            return Poly::zero();
        }
        let coeffs = self
            .coeffs
            .iter()
            .map(|(exp, coeff)| (*exp, coeff * k))
            .collect();
        Poly { coeffs }
    }

    pub fn linear_root(&self) -> Option<Rational> {
        if self.degree()? != 1 {
            return None;
        }
        let a = self.coeff(1);
        let b = self.coeff(0);
        Some(-b / a)
    }

    fn accumulate(coeffs: &mut BTreeMap<usize, Rational>, exp: usize, value: Rational) {
        if value.is_zero() {
            return;
        }
        match coeffs.entry(exp) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(mut entry) => {
                let updated = entry.get() + value;
                if updated.is_zero() {
                    entry.remove();
                } else {
                    *entry.get_mut() = updated;
                }
            }
        }
    }
}

impl Add for Poly {
    type Output = Poly;
    fn add(self, rhs: Poly) -> Poly {
        let mut coeffs = self.coeffs;
        for (exp, coeff) in rhs.coeffs {
            Poly::accumulate(&mut coeffs, exp, coeff);
        }
        Poly { coeffs }
    }
}

impl Sub for Poly {
    type Output = Poly;
    fn sub(self, rhs: Poly) -> Poly {
        self + (-rhs)
    }
}

impl Mul for Poly {
    type Output = Poly;
    fn mul(self, rhs: Poly) -> Poly {
        let mut coeffs = BTreeMap::new();
        for (exp_a, coeff_a) in &self.coeffs {
            for (exp_b, coeff_b) in &rhs.coeffs {
                Poly::accumulate(&mut coeffs, exp_a + exp_b, coeff_a * coeff_b);
            }
        }
        Poly { coeffs }
    }
}

impl Neg for Poly {
    type Output = Poly;
    fn neg(self) -> Poly {
        let coeffs = self
            .coeffs
            .into_iter()
            .map(|(exp, coeff)| (exp, -coeff))
            .collect();
        Poly { coeffs }
    }
}

fn extract_natural(exp: &Expr) -> Option<usize> {
    match extract_rational(exp)? {
        c if c.is_integer() => c.to_integer().to_usize(),
        _ => None,
    }
}

/// Folds a symbol-free expression to its value.
fn extract_rational(expr: &Expr) -> Option<Rational> {
    match expr {
        Expr::Constant(n) => Some(n.clone()),
        Expr::Neg(inner) => extract_rational(inner).map(|n| -n),
        Expr::Add(a, b) => Some(extract_rational(a)? + extract_rational(b)?),
        Expr::Sub(a, b) => Some(extract_rational(a)? - extract_rational(b)?),
        Expr::Mul(a, b) => Some(extract_rational(a)? * extract_rational(b)?),
        Expr::Div(a, b) => {
            let denom = extract_rational(b).filter(|d| !d.is_zero())?;
            Some(extract_rational(a)? / denom)
        }
        Expr::Pow(base, exp) => {
            let base = extract_rational(base)?;
            let exp = extract_rational(exp).filter(|e| e.is_integer())?;
            let k = exp.to_integer().to_i32()?;
            if k < 0 && base.is_zero() {
                return None;
            }
            Some(base.pow(k))
        }
        Expr::Variable(_) => None,
    }
}
