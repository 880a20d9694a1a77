use crate::expr::Expr;
use num_rational::BigRational;
use num_traits::{One, Signed};

/// Render `expr` with the minimum parentheses needed to read it back unambiguously.
pub fn pretty(expr: &Expr) -> String {
    fn pp(ctx: u8, expr: &Expr) -> String {
        match expr {
            Expr::Variable(v) => v.clone(),
            Expr::Constant(r) => show_rational(ctx, r),

            Expr::Add(a, b) | Expr::Sub(a, b) => {
                // A negative right operand flips the operator instead of printing `+-`.
                let (neg_b, b_inner) = split_neg(b);
                let minus = neg_b != matches!(expr, Expr::Sub(..));
                let op = if minus { '-' } else { '+' };
                bracket(ctx, 1, format!("{}{op}{}", pp(1, a), pp(2, &b_inner)))
            }

            Expr::Mul(_, _) => {
                let mut factors = Vec::new();
                collect_mul_factors(expr, &mut factors);
                let mut neg = false;
                let mut parts = Vec::with_capacity(factors.len());
                for factor in factors {
                    let (is_neg, inner) = split_neg(&factor);
                    neg ^= is_neg;
                    if !inner.is_one() {
                        parts.push(pp(2, &inner));
                    }
                }
                if parts.is_empty() {
                    parts.push("1".to_string());
                }
                let body = parts.join("*");
                if neg {
                    bracket(ctx, 2, format!("-{body}"))
                } else {
                    bracket(ctx, 2, body)
                }
            }

            Expr::Div(a, b) => {
                let (na, a_inner) = split_neg(a);
                let (nb, b_inner) = split_neg(b);
                let body = format!("{}/{}", pp(2, &a_inner), pp(3, &b_inner));
                if na ^ nb {
                    bracket(ctx, 2, format!("-{body}"))
                } else {
                    bracket(ctx, 2, body)
                }
            }

            Expr::Pow(a, b) => bracket(ctx, 3, format!("{}^{}", pp(4, a), pp(3, b))),

            Expr::Neg(a) => {
                let (is_neg, inner) = split_neg(a);
                if is_neg {
                    pp(ctx, &inner)
                } else {
                    bracket(ctx, 2, format!("-{}", pp(2, &inner)))
                }
            }
        }
    }

    pp(0, expr)
}

fn collect_mul_factors(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Mul(a, b) => {
            collect_mul_factors(a, out);
            collect_mul_factors(b, out);
        }
        other => out.push(other.clone()),
    }
}

fn split_neg(expr: &Expr) -> (bool, Expr) {
    match expr {
        Expr::Neg(inner) => (true, *inner.clone()),
        Expr::Constant(r) if r.is_negative() => (true, Expr::Constant(-r)),
        Expr::Mul(a, b) => {
            let (na, a_inner) = split_neg(a);
            let (nb, b_inner) = split_neg(b);
            if na ^ nb {
                (true, Expr::Mul(a_inner.boxed(), b_inner.boxed()))
            } else {
                (false, expr.clone())
            }
        }
        other => (false, other.clone()),
    }
}

fn bracket(ctx: u8, prec: u8, body: String) -> String {
    if prec < ctx {
        format!("({body})")
    } else {
        body
    }
}

/// Negative values bind like unary minus and fractions like division.
fn show_rational(ctx: u8, r: &BigRational) -> String {
    let n = r.numer();
    let d = r.denom();
    let body = if d.is_one() {
        format!("{}", n.abs())
    } else {
        format!("{}/{}", n.abs(), d)
    };
    match (r.is_negative(), d.is_one()) {
        (false, true) => body,
        (false, false) => bracket(ctx, 2, body),
        (true, _) => bracket(ctx, 2, format!("-{body}")),
    }
}
