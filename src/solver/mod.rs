//! Exact equation solving: Gaussian elimination for linear systems, closed-form roots for
//! univariate quadratics.

use std::collections::{BTreeMap, HashMap};

use crate::error::{CasError, Result};
use crate::expr::{Expr, Rational};
use crate::polynomial::Poly;
use crate::simplify::simplify;
use num_bigint::BigInt;
use num_integer::Roots;
use num_traits::{One, Signed, Zero};

/// Trial-division bound when pulling square factors out of a discriminant.
const SQUARE_FACTOR_LIMIT: u32 = 10_000;

/// One assignment of values to (some of) the solved-for variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    values: BTreeMap<String, Expr>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, var: impl Into<String>, value: Expr) {
        self.values.insert(var.into(), value);
    }

    pub fn get(&self, var: &str) -> Option<&Expr> {
        self.values.get(var)
    }

    /// Pairs in variable-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Expr)> for Solution {
    fn from_iter<I: IntoIterator<Item = (String, Expr)>>(iter: I) -> Self {
        Solution {
            values: iter.into_iter().collect(),
        }
    }
}

struct LinearDecomposition {
    coeffs: Vec<Rational>,
    constant: Rational,
    residual: Expr,
}

#[derive(Default)]
struct Pivots {
    rows: Vec<usize>,
    columns: Vec<usize>,
    inconsistent: bool,
}

/// Solve a system of equations provided as (lhs, rhs) pairs for `vars`.
///
/// An empty result means the system has no solution. A linear system with free variables yields
/// a single solution expressing the pivot variables in terms of the free ones; an identity yields
/// a single empty solution. Non-linear input is only handled when it is a polynomial of degree
/// at most two in exactly one of `vars`.
pub fn solve_system(
    vars: Vec<impl Into<String>>,
    equations: Vec<(Expr, Expr)>,
) -> Result<Vec<Solution>> {
    let variables: Vec<String> = vars.into_iter().map(Into::into).collect();
    let var_map: HashMap<String, usize> = variables
        .iter()
        .enumerate()
        .map(|(i, v)| (v.clone(), i))
        .collect();

    let mut normalized_equations = Vec::with_capacity(equations.len());
    let mut decompositions = Vec::with_capacity(equations.len());
    let mut nonlinear = false;

    for (lhs, rhs) in equations {
        let normalized = simplify(Expr::Sub(lhs.boxed(), rhs.boxed()));
        let decomp = decompose_linear(&normalized, &var_map);
        nonlinear |= !decomp.residual.is_zero();
        normalized_equations.push(normalized);
        decompositions.push(decomp);
    }

    if nonlinear {
        return solve_nonlinear(&variables, &normalized_equations);
    }

    Ok(solve_linear(&variables, &decompositions))
}

fn solve_linear(variables: &[String], decompositions: &[LinearDecomposition]) -> Vec<Solution> {
    let n_vars = variables.len();
    let mut matrix = build_augmented(decompositions, n_vars);
    let pivots = rref(&mut matrix, n_vars);

    if pivots.inconsistent {
        return Vec::new();
    }

    let free: Vec<usize> = (0..n_vars)
        .filter(|col| !pivots.columns.contains(col))
        .collect();

    let solution: Solution = pivots
        .rows
        .iter()
        .zip(pivots.columns.iter())
        .map(|(&row, &col)| {
            // x_col = b_row - sum(a_row,f * x_f) over the free columns.
            let mut value = Expr::Constant(matrix.get(row, n_vars).clone());
            for &f in &free {
                let coeff = matrix.get(row, f);
                if coeff.is_zero() {
                    continue;
                }
                let term = Expr::Mul(
                    Expr::Constant(-coeff.clone()).boxed(),
                    Expr::Variable(variables[f].clone()).boxed(),
                );
                value = Expr::Add(value.boxed(), term.boxed());
            }
            (variables[col].clone(), simplify(value))
        })
        .collect();

    vec![solution]
}

fn solve_nonlinear(variables: &[String], equations: &[Expr]) -> Result<Vec<Solution>> {
    let [equation] = equations else {
        return Err(CasError::Unsupported(
            "non-linear systems of equations".to_string(),
        ));
    };
    let present: Vec<&String> = variables
        .iter()
        .filter(|v| equation.contains_var(v))
        .collect();
    let [var] = present.as_slice() else {
        return Err(CasError::Unsupported(
            "non-linear equation in several variables".to_string(),
        ));
    };

    let poly = Poly::from_expr(equation, var).ok_or_else(|| {
        CasError::Unsupported(format!("equation is not polynomial in {var}"))
    })?;

    let roots = match poly.degree() {
        None => return Ok(vec![Solution::new()]),
        Some(0) => Vec::new(),
        Some(1) => poly.linear_root().map(Expr::Constant).into_iter().collect(),
        Some(2) => quadratic_roots(&poly),
        Some(d) => {
            return Err(CasError::Unsupported(format!(
                "polynomial equations of degree {d}"
            )));
        }
    };

    Ok(roots
        .into_iter()
        .map(|root| std::iter::once(((*var).clone(), root)).collect::<Solution>())
        .collect())
}

/// Real roots of a degree-2 polynomial in ascending order.
fn quadratic_roots(poly: &Poly) -> Vec<Expr> {
    let a = poly.coeff(2);
    let b = poly.coeff(1);
    let c = poly.coeff(0);
    let two_a = &a * Rational::from_integer(2.into());
    let disc = &b * &b - Rational::from_integer(4.into()) * &a * &c;
    let center = -&b / &two_a;

    if disc.is_negative() {
        return Vec::new();
    }
    if disc.is_zero() {
        return vec![Expr::Constant(center)];
    }

    // sqrt(n/d) == sqrt(n*d)/d == outside/d * sqrt(inside)
    let (outside, inside) = split_square(&(disc.numer() * disc.denom()));
    let scale = (Rational::from_integer(outside) / Rational::from_integer(disc.denom().clone())
        / &two_a)
        .abs();

    if inside.is_one() {
        return vec![
            Expr::Constant(&center - &scale),
            Expr::Constant(&center + &scale),
        ];
    }

    let radical = Expr::Pow(
        Expr::Constant(Rational::from_integer(inside)).boxed(),
        Expr::Constant(Rational::new(1.into(), 2.into())).boxed(),
    );
    let offset = |sign: Rational| {
        simplify(Expr::Add(
            Expr::Constant(center.clone()).boxed(),
            Expr::Mul(Expr::Constant(sign * &scale).boxed(), radical.clone().boxed()).boxed(),
        ))
    };
    vec![offset(-Rational::one()), offset(Rational::one())]
}

/// Writes `m` as `outside^2 * inside`, pulling out square factors found by trial division.
/// Perfect squares are recognised exactly regardless of size.
fn split_square(m: &BigInt) -> (BigInt, BigInt) {
    let root = m.sqrt();
    if &root * &root == *m {
        return (root, BigInt::one());
    }

    let mut outside = BigInt::one();
    let mut inside = m.clone();
    let mut p = 2u32;
    while p <= SQUARE_FACTOR_LIMIT {
        let square = BigInt::from(p) * BigInt::from(p);
        if square > inside {
            break;
        }
        while (&inside % &square).is_zero() {
            inside /= &square;
            outside *= p;
        }
        p += 1;
    }
    (outside, inside)
}

fn decompose_linear(expr: &Expr, var_map: &HashMap<String, usize>) -> LinearDecomposition {
    let mut coeffs = vec![Rational::zero(); var_map.len()];
    let mut constant = Rational::zero();
    let mut residual_terms = Vec::new();
    collect_linear_terms(
        expr,
        Rational::one(),
        &mut coeffs,
        &mut constant,
        &mut residual_terms,
        var_map,
    );
    let residual = residual_terms
        .into_iter()
        .reduce(|acc, t| Expr::Add(acc.boxed(), t.boxed()))
        .map(simplify)
        .unwrap_or_else(|| Expr::Constant(Rational::zero()));
    LinearDecomposition {
        coeffs,
        constant,
        residual,
    }
}

fn collect_linear_terms(
    expr: &Expr,
    scale: Rational,
    coeffs: &mut [Rational],
    constant: &mut Rational,
    residual_terms: &mut Vec<Expr>,
    var_map: &HashMap<String, usize>,
) {
    match expr {
        Expr::Constant(c) => {
            *constant += scale * c.clone();
        }
        Expr::Variable(name) => {
            if let Some(&idx) = var_map.get(name) {
                coeffs[idx] += scale;
            } else {
                residual_terms.push(scale_expr(scale, expr.clone()));
            }
        }
        Expr::Add(a, b) => {
            collect_linear_terms(a, scale.clone(), coeffs, constant, residual_terms, var_map);
            collect_linear_terms(b, scale, coeffs, constant, residual_terms, var_map);
        }
        Expr::Sub(a, b) => {
            collect_linear_terms(a, scale.clone(), coeffs, constant, residual_terms, var_map);
            collect_linear_terms(b, -scale, coeffs, constant, residual_terms, var_map);
        }
        Expr::Neg(a) => collect_linear_terms(a, -scale, coeffs, constant, residual_terms, var_map),
        Expr::Mul(a, b) => {
            if let Some(c) = constant_of(a) {
                collect_linear_terms(b, scale * c, coeffs, constant, residual_terms, var_map);
            } else if let Some(c) = constant_of(b) {
                collect_linear_terms(a, scale * c, coeffs, constant, residual_terms, var_map);
            } else {
                residual_terms.push(scale_expr(scale, expr.clone()));
            }
        }
        Expr::Div(a, b) => match constant_of(b) {
            Some(c) if !c.is_zero() => {
                collect_linear_terms(a, scale / c, coeffs, constant, residual_terms, var_map)
            }
            _ => residual_terms.push(scale_expr(scale, expr.clone())),
        },
        _ => residual_terms.push(scale_expr(scale, expr.clone())),
    }
}

fn constant_of(expr: &Expr) -> Option<Rational> {
    match expr {
        Expr::Constant(c) => Some(c.clone()),
        Expr::Neg(inner) => constant_of(inner).map(|c| -c),
        _ => None,
    }
}

fn scale_expr(scale: Rational, expr: Expr) -> Expr {
    if scale.is_zero() {
        Expr::Constant(Rational::zero())
    } else if scale.is_one() {
        expr
    } else {
        Expr::Mul(Expr::Constant(scale).boxed(), expr.boxed())
    }
}

fn build_augmented(rows: &[LinearDecomposition], n_vars: usize) -> Matrix {
    let cols = n_vars + 1;
    let mut data = Vec::with_capacity(rows.len() * cols);
    for row in rows {
        data.extend(row.coeffs.iter().take(n_vars).cloned());
        data.push(-row.constant.clone());
    }
    Matrix {
        rows: rows.len(),
        cols,
        data,
    }
}

fn rref(matrix: &mut Matrix, n_vars: usize) -> Pivots {
    let mut pivots = Pivots::default();
    let rows = matrix.rows;
    let cols = matrix.cols;
    let mut row = 0;
    for col in 0..n_vars {
        if row >= rows {
            break;
        }

        let mut pivot_row = None;
        let mut pivot_abs = Rational::zero();
        for r in row..rows {
            let value = matrix.get(r, col);
            if !value.is_zero() && value.abs() > pivot_abs {
                pivot_abs = value.abs();
                pivot_row = Some(r);
            }
        }

        let Some(pivot_idx) = pivot_row else {
            continue;
        };

        matrix.swap_rows(row, pivot_idx);

        // Normalize pivot row.
        let pivot_value = matrix.get(row, col).clone();
        for c in col..cols {
            *matrix.get_mut(row, c) /= pivot_value.clone();
        }

        let row_start = row * cols;
        let (before, rest) = matrix.data.split_at_mut(row_start);
        let (pivot_row_slice, after) = rest.split_at_mut(cols);
        let pivot_row_ref: &[Rational] = &*pivot_row_slice;

        for rrow in before.chunks_exact_mut(cols).chain(after.chunks_exact_mut(cols)) {
            let factor = rrow[col].clone();
            if factor.is_zero() {
                continue;
            }
            for c in col..cols {
                rrow[c] -= &factor * &pivot_row_ref[c];
            }
        }

        pivots.rows.push(row);
        pivots.columns.push(col);
        row += 1;
    }

    pivots.inconsistent = (row..rows).any(|r| {
        let row_slice = matrix.row(r);
        row_slice[..n_vars].iter().all(Zero::is_zero) && !row_slice[n_vars].is_zero()
    });
    pivots
}

struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Rational>,
}

impl Matrix {
    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn get(&self, row: usize, col: usize) -> &Rational {
        &self.data[self.idx(row, col)]
    }

    fn get_mut(&mut self, row: usize, col: usize) -> &mut Rational {
        let idx = self.idx(row, col);
        &mut self.data[idx]
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let cols = self.cols;
        for offset in 0..cols {
            self.data.swap(a * cols + offset, b * cols + offset);
        }
    }

    fn row(&self, row: usize) -> &[Rational] {
        let start = self.idx(row, 0);
        &self.data[start..start + self.cols]
    }
}
