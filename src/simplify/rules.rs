use std::collections::{BTreeMap, HashMap};

use crate::error::{self, CasError};
use crate::expr::{Expr, Rational, one, zero};
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

const DISTRIBUTE_TERM_LIMIT: usize = 64;

/// Constant powers whose result would need more bits than this stay unevaluated.
const FOLD_BITS_LIMIT: u64 = 1 << 16;

/// Passes `simplify_fully` runs before giving up on reaching a fixed point.
const FIXPOINT_LIMIT: usize = 64;

/// Sorted non-constant factors of a term; terms with equal keys are like terms.
#[derive(Clone, Eq, PartialEq, PartialOrd, Ord)]
struct CanonKey(Vec<Expr>);

/// One bottom-up rewrite pass, memoised so repeated subtrees are only simplified once.
#[derive(Default)]
struct Pass {
    memo: HashMap<Expr, Expr>,
    /// Set once any rewrite produced `n/0` or `0^-k`, even if a later rule discarded it.
    undefined: bool,
}

impl Pass {
    fn run(&mut self, expr: Expr) -> Expr {
        if let Some(done) = self.memo.get(&expr) {
            return done.clone();
        }
        let key = expr.clone();
        let out = match expr {
            Expr::Add(a, b) => simplify_add(self.run(*a), self.run(*b)),
            Expr::Sub(a, b) => simplify_sub(self.run(*a), self.run(*b)),
            Expr::Mul(a, b) => simplify_mul(self.run(*a), self.run(*b)),
            Expr::Div(a, b) => simplify_div(self.run(*a), self.run(*b)),
            Expr::Pow(a, b) => simplify_pow(self.run(*a), self.run(*b)),
            Expr::Neg(a) => simplify_neg(self.run(*a)),
            leaf @ (Expr::Variable(_) | Expr::Constant(_)) => leaf,
        };
        self.undefined |= is_undefined(&out);
        self.memo.insert(key, out.clone());
        out
    }

    fn fixpoint(&mut self, expr: Expr, max_passes: usize) -> Expr {
        let mut current = expr;
        for _ in 0..max_passes {
            let next = self.run(current.clone());
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

/// A single bottom-up pass.
pub fn simplify(expr: Expr) -> Expr {
    Pass::default().run(expr)
}

/// Repeat passes until the expression stops changing.
pub fn simplify_fully(expr: Expr) -> Expr {
    simplify_with_limit(expr, FIXPOINT_LIMIT)
}

/// Like [`simplify_fully`] but stops after `max_passes`, returning the last value.
pub fn simplify_with_limit(expr: Expr, max_passes: usize) -> Expr {
    Pass::default().fixpoint(expr, max_passes)
}

/// Like [`simplify_fully`], but fails with [`CasError::DivisionByZero`] when any subexpression
/// divides by zero. `1/0*0` is an error, not `0`.
pub fn simplify_checked(expr: Expr) -> error::Result<Expr> {
    let mut pass = Pass::default();
    let out = pass.fixpoint(expr, FIXPOINT_LIMIT);
    if pass.undefined {
        return Err(CasError::DivisionByZero);
    }
    Ok(out)
}

pub fn simplify_add(x: Expr, y: Expr) -> Expr {
    rebuild_sum(collect_sum(flatten_sum(&x).into_iter().chain(flatten_sum(&y))))
}

pub fn simplify_sub(x: Expr, y: Expr) -> Expr {
    simplify_add(x, simplify_neg(y))
}

fn flatten_sum(expr: &Expr) -> Vec<Expr> {
    match expr {
        Expr::Add(a, b) => {
            let mut out = flatten_sum(a);
            out.extend(flatten_sum(b));
            out
        }
        Expr::Sub(a, b) => {
            let mut out = flatten_sum(a);
            out.extend(flatten_sum(b).into_iter().map(simplify_neg));
            out
        }
        Expr::Neg(a) => flatten_sum(a).into_iter().map(simplify_neg).collect(),
        other => vec![other.clone()],
    }
}

fn count_sum_terms(expr: &Expr) -> usize {
    match expr {
        Expr::Add(a, b) | Expr::Sub(a, b) => count_sum_terms(a) + count_sum_terms(b),
        Expr::Neg(inner) => count_sum_terms(inner),
        _ => 1,
    }
}

fn split_coeff(expr: &Expr) -> (Rational, Expr) {
    match expr {
        Expr::Constant(c) => (c.clone(), one()),
        Expr::Neg(e) => {
            let (c, b) = split_coeff(e);
            (-c, b)
        }
        Expr::Mul(a, b) => {
            let (ca, ba) = split_coeff(a);
            let (cb, bb) = split_coeff(b);
            (ca * cb, product_of(ba, bb))
        }
        other => (Rational::one(), other.clone()),
    }
}

fn canonical_factors(expr: &Expr) -> Vec<Expr> {
    let mut factors = factors(expr);
    factors.sort();
    factors
}

fn mul_from_sorted_factors(factors: &[Expr]) -> Expr {
    factors
        .iter()
        .cloned()
        .reduce(|acc, item| Expr::Mul(acc.boxed(), item.boxed()))
        .unwrap_or_else(one)
}

fn product_of(a: Expr, b: Expr) -> Expr {
    merge_factors(factors(&a).into_iter().chain(factors(&b)).collect())
}

fn factors(expr: &Expr) -> Vec<Expr> {
    match expr {
        Expr::Mul(a, b) => {
            let mut out = factors(a);
            out.extend(factors(b));
            out
        }
        t if is_one(t) => vec![],
        t => vec![t.clone()],
    }
}

fn collect_sum<I>(terms: I) -> BTreeMap<CanonKey, Rational>
where
    I: IntoIterator<Item = Expr>,
{
    let mut like_terms = BTreeMap::new();
    for term in terms {
        let (c, base) = split_coeff(&term);
        if c.is_zero() {
            continue;
        }
        *like_terms
            .entry(CanonKey(canonical_factors(&base)))
            .or_insert_with(Rational::zero) += c;
    }
    like_terms
}

/// Highest degree first, ties broken by key, constant last.
fn rebuild_sum(mut like_terms: BTreeMap<CanonKey, Rational>) -> Expr {
    let constant = like_terms
        .remove(&CanonKey(Vec::new()))
        .unwrap_or_else(Rational::zero);

    let mut items: Vec<(CanonKey, Rational)> = like_terms
        .into_iter()
        .filter(|(_, coef)| !coef.is_zero())
        .collect();
    items.sort_by(|(a, _), (b, _)| {
        term_degree(&b.0)
            .cmp(&term_degree(&a.0))
            .then_with(|| a.cmp(b))
    });

    let mut terms: Vec<Expr> = items
        .into_iter()
        .map(|(CanonKey(factors), coef)| term_from(&coef, mul_from_sorted_factors(&factors)))
        .collect();
    if !constant.is_zero() {
        terms.push(Expr::Constant(constant));
    }

    terms
        .into_iter()
        .reduce(|acc, term| Expr::Add(acc.boxed(), term.boxed()))
        .unwrap_or_else(zero)
}

/// Total degree of a monomial, counting non-constant exponents as 1.
fn term_degree(factors: &[Expr]) -> Rational {
    factors
        .iter()
        .map(|f| match f {
            Expr::Pow(_, exp) => match &**exp {
                Expr::Constant(k) => k.clone(),
                _ => Rational::one(),
            },
            _ => Rational::one(),
        })
        .fold(Rational::zero(), |acc, d| acc + d)
}

fn term_from(coef: &Rational, base: Expr) -> Expr {
    if coef.is_zero() {
        return zero();
    }

    if is_one(&base) {
        return Expr::Constant(coef.clone());
    }

    if coef.is_one() {
        return base;
    }

    if coef == &-Rational::one() {
        return simplify_neg(base);
    }

    Expr::Mul(Expr::Constant(coef.clone()).boxed(), base.boxed())
}

/// The two operands of an `Add` or `Sub` node.
struct Sum {
    left: Expr,
    right: Expr,
    subtract: bool,
}

impl Sum {
    fn split(expr: Expr) -> Result<Sum, Expr> {
        match expr {
            Expr::Add(a, b) => Ok(Sum {
                left: *a,
                right: *b,
                subtract: false,
            }),
            Expr::Sub(a, b) => Ok(Sum {
                left: *a,
                right: *b,
                subtract: true,
            }),
            other => Err(other),
        }
    }

    fn into_expr(self) -> Expr {
        if self.subtract {
            Expr::Sub(self.left.boxed(), self.right.boxed())
        } else {
            Expr::Add(self.left.boxed(), self.right.boxed())
        }
    }

    fn term_count(&self) -> usize {
        count_sum_terms(&self.left) + count_sum_terms(&self.right)
    }
}

pub fn simplify_mul(x: Expr, y: Expr) -> Expr {
    let x = match Sum::split(x) {
        Ok(sum) => return distribute(sum, y, true),
        Err(x) => x,
    };
    let y = match Sum::split(y) {
        Ok(sum) => return distribute(sum, x, false),
        Err(y) => y,
    };

    match (x, y) {
        (Expr::Constant(xc), Expr::Constant(yc)) => Expr::Constant(xc * yc),
        (x, y) if is_zero(&x) || is_zero(&y) => zero(),
        (x, y) if is_one(&x) => y,
        (x, y) if is_one(&y) => x,
        (x, y) => {
            let (c, b) = split_coeff(&Expr::Mul(x.boxed(), y.boxed()));
            term_from(&c, b)
        }
    }
}

/// Multiply `other` into both operands of `sum`, keeping operand order. Products that would
/// expand past `DISTRIBUTE_TERM_LIMIT` terms are left as they are.
fn distribute(sum: Sum, other: Expr, sum_first: bool) -> Expr {
    let ordered = |term: Expr, other: Expr| {
        if sum_first {
            (term, other)
        } else {
            (other, term)
        }
    };

    if sum.term_count() * count_sum_terms(&other) > DISTRIBUTE_TERM_LIMIT {
        let (a, b) = ordered(sum.into_expr(), other);
        return Expr::Mul(a.boxed(), b.boxed());
    }

    let (la, lb) = ordered(sum.left, other.clone());
    let (ra, rb) = ordered(sum.right, other);
    let left = simplify_mul(la, lb);
    let right = simplify_mul(ra, rb);
    if sum.subtract {
        simplify_sub(left, right)
    } else {
        simplify_add(left, right)
    }
}

pub fn simplify_div(x: Expr, y: Expr) -> Expr {
    match (x, y) {
        (Expr::Constant(n), Expr::Constant(d)) => {
            if d.is_zero() {
                Expr::Div(Expr::Constant(n).boxed(), Expr::Constant(d).boxed())
            } else {
                Expr::Constant(n / d)
            }
        }
        // Left unevaluated so callers can report it.
        (x, y) if is_zero(&y) => Expr::Div(x.boxed(), y.boxed()),
        (x, _) if is_zero(&x) => zero(),
        (x, y) if is_one(&y) => x,
        (x, y) => {
            let (cx, bx) = split_coeff(&x);
            let (cy, by) = split_coeff(&y);
            if cy.is_zero() {
                return Expr::Div(x.boxed(), y.boxed());
            }
            let c = cx / cy;
            if bx == by && !is_one(&bx) {
                Expr::Constant(c)
            } else {
                let core = if is_one(&by) {
                    bx
                } else {
                    Expr::Div(bx.boxed(), by.boxed())
                };
                if c.is_one() {
                    core
                } else {
                    simplify_mul(Expr::Constant(c), core)
                }
            }
        }
    }
}

pub fn simplify_pow(x: Expr, y: Expr) -> Expr {
    match (x, y) {
        (_, Expr::Constant(e)) if e.is_zero() => one(),
        (base, Expr::Constant(e)) if e.is_one() => base,
        (Expr::Constant(b), Expr::Constant(e)) => {
            if e.is_integer() {
                let k: BigInt = e.to_integer();
                let bits = b.numer().bits().max(b.denom().bits());
                let power = k
                    .abs()
                    .to_u32()
                    .filter(|&p| bits <= 1 || bits.saturating_mul(p.into()) <= FOLD_BITS_LIMIT);
                if let Some(power) = power {
                    if k >= BigInt::zero() {
                        let num = b.numer().pow(power);
                        let den = b.denom().pow(power);
                        return Expr::Constant(Rational::new(num, den));
                    } else if b.is_zero() {
                        return Expr::Pow(Expr::Constant(b).boxed(), Expr::Constant(e).boxed());
                    } else {
                        let num = b.denom().pow(power);
                        let den = b.numer().pow(power);
                        return Expr::Constant(Rational::new(num, den));
                    }
                }
            }
            Expr::Pow(Expr::Constant(b).boxed(), Expr::Constant(e).boxed())
        }
        // (b^m)^n == b^(m*n) holds for integer n.
        (Expr::Pow(base, inner), Expr::Constant(e)) if e.is_integer() => match *inner {
            Expr::Constant(m) => simplify_pow(*base, Expr::Constant(m * e)),
            other => Expr::Pow(Expr::Pow(base, other.boxed()).boxed(), Expr::Constant(e).boxed()),
        },
        (x, y) => Expr::Pow(x.boxed(), y.boxed()),
    }
}

pub fn simplify_neg(expr: Expr) -> Expr {
    match expr {
        Expr::Constant(x) => Expr::Constant(-x),
        Expr::Neg(x) => *x,
        other => Expr::Neg(other.boxed()),
    }
}

fn is_zero(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(r) if r.is_zero())
}

fn is_one(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(r) if r.is_one())
}

/// `n/0` or `0^-k`, the two shapes the rewrite rules refuse to evaluate.
fn is_undefined(expr: &Expr) -> bool {
    match expr {
        Expr::Div(_, d) => is_zero(d),
        Expr::Pow(base, exp) => {
            is_zero(base) && matches!(&**exp, Expr::Constant(e) if e.is_negative())
        }
        _ => false,
    }
}

/// Builds a product from `items`, merging repeated factors into powers (`x*x^2` -> `x^3`).
/// Powers of constants stay opaque so they never leak back into the coefficient.
fn merge_factors(items: Vec<Expr>) -> Expr {
    let mut powers: BTreeMap<Expr, Rational> = BTreeMap::new();
    for item in items {
        if is_one(&item) {
            continue;
        }
        let (base, exp) = match item {
            Expr::Pow(base, exp) => match (*base, *exp) {
                (base, Expr::Constant(k)) if !matches!(base, Expr::Constant(_)) => (base, k),
                (base, exp) => (Expr::Pow(base.boxed(), exp.boxed()), Rational::one()),
            },
            other => (other, Rational::one()),
        };
        *powers.entry(base).or_insert_with(Rational::zero) += exp;
    }

    powers
        .into_iter()
        .filter(|(_, exp)| !exp.is_zero())
        .map(|(base, exp)| {
            if exp.is_one() {
                base
            } else {
                Expr::Pow(base.boxed(), Expr::Constant(exp).boxed())
            }
        })
        .reduce(|acc, item| Expr::Mul(acc.boxed(), item.boxed()))
        .unwrap_or_else(one)
}
