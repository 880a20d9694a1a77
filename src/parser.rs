use crate::error::{CasError, Result};
use crate::expr::{Expr, Rational};
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit0, digit1, multispace0, one_of, satisfy};
use nom::combinator::{all_consuming, map, map_res, opt, recognize};
use nom::error::VerboseError;
use nom::multi::{fold_many0, many0};
use nom::sequence::{delimited, pair, preceded};
use num_bigint::BigInt;
use num_traits::{Num, One};

/// Deepest parenthesis nesting accepted.
pub const MAX_NESTING: usize = 32;

/// Most binary operators accepted in one expression. Runs of unary signs do not count.
pub const MAX_OPERATORS: usize = 512;

/// Parse formal algebraic text (explicit `*`, single-letter identifiers) into an [`Expr`].
pub fn parse_expr(input: &str) -> Result<Expr> {
    if input.trim().is_empty() {
        return Err(CasError::Parse("empty expression".to_string()));
    }
    check_size(input)?;
    match all_consuming(ws(parse_add_sub))(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(CasError::Parse(describe(input, &e)))
        }
        Err(nom::Err::Incomplete(_)) => Err(CasError::Parse("incomplete input".to_string())),
    }
}

/// Rejects input whose tree would be too deep to parse and simplify recursively.
fn check_size(input: &str) -> Result<()> {
    let mut depth = 0usize;
    let mut operators = 0usize;
    let mut after_operand = false;
    for c in input.chars().filter(|c| !c.is_whitespace()) {
        match c {
            '(' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(CasError::Parse(format!(
                        "parentheses nested deeper than {MAX_NESTING}"
                    )));
                }
            }
            ')' => depth = depth.saturating_sub(1),
            '+' | '-' | '*' | '/' | '^' if after_operand => {
                operators += 1;
                if operators > MAX_OPERATORS {
                    return Err(CasError::Parse(format!(
                        "more than {MAX_OPERATORS} operators"
                    )));
                }
            }
            _ => {}
        }
        after_operand = c.is_alphanumeric() || c == '.' || c == ')';
    }
    Ok(())
}

fn describe(input: &str, err: &VerboseError<&str>) -> String {
    // The deepest error carries the furthest position nom reached.
    let rest = err
        .errors
        .iter()
        .map(|(rest, _)| *rest)
        .min_by_key(|rest| rest.len())
        .unwrap_or(input);
    let offset = input.len() - rest.len();
    match rest.trim_start().chars().next() {
        Some(c) => format!("unexpected `{c}` at position {offset}"),
        None => "unexpected end of input".to_string(),
    }
}

fn parse_add_sub(input: &str) -> IResult<&str, Expr, VerboseError<&str>> {
    let (rest, init) = parse_mul_div(input)?;
    fold_many0(
        pair(ws(alt((char('+'), char('-')))), parse_mul_div),
        move || init.clone(),
        |acc, (op, rhs)| match op {
            '+' => Expr::Add(acc.boxed(), rhs.boxed()),
            _ => Expr::Sub(acc.boxed(), rhs.boxed()),
        },
    )(rest)
}

fn parse_mul_div(input: &str) -> IResult<&str, Expr, VerboseError<&str>> {
    let (rest, init) = parse_unary(input)?;
    fold_many0(
        pair(ws(alt((char('*'), char('/')))), parse_unary),
        move || init.clone(),
        |acc, (op, rhs)| match op {
            '*' => Expr::Mul(acc.boxed(), rhs.boxed()),
            _ => Expr::Div(acc.boxed(), rhs.boxed()),
        },
    )(rest)
}

fn parse_unary(input: &str) -> IResult<&str, Expr, VerboseError<&str>> {
    let (rest, negate) = parse_signs(input)?;
    let (rest, expr) = parse_pow(rest)?;
    Ok((rest, signed(negate, expr)))
}

/// A run of unary signs folded to its parity, so `--x` reads as `x`.
fn parse_signs(input: &str) -> IResult<&str, bool, VerboseError<&str>> {
    fold_many0(
        ws(one_of("+-")),
        || false,
        |negate, sign| negate ^ (sign == '-'),
    )(input)
}

fn signed(negate: bool, expr: Expr) -> Expr {
    if negate {
        Expr::Neg(expr.boxed())
    } else {
        expr
    }
}

/// `^` and `**` bind tighter than unary minus on their left, so `-x^2` is `-(x^2)`, and
/// associate to the right: `a^-b^c` is `a^(-(b^c))`.
fn parse_pow(input: &str) -> IResult<&str, Expr, VerboseError<&str>> {
    let (rest, base) = parse_primary(input)?;
    let (rest, mut chain) = many0(pair(
        preceded(ws(alt((tag("**"), tag("^")))), parse_signs),
        parse_primary,
    ))(rest)?;
    let Some((negate, top)) = chain.pop() else {
        return Ok((rest, base));
    };
    let mut exponent = signed(negate, top);
    while let Some((negate, operand)) = chain.pop() {
        exponent = signed(negate, Expr::Pow(operand.boxed(), exponent.boxed()));
    }
    Ok((rest, Expr::Pow(base.boxed(), exponent.boxed())))
}

fn parse_primary(input: &str) -> IResult<&str, Expr, VerboseError<&str>> {
    alt((parse_parens, parse_number, parse_identifier))(input)
}

fn parse_parens(input: &str) -> IResult<&str, Expr, VerboseError<&str>> {
    delimited(ws(char('(')), parse_add_sub, ws(char(')')))(input)
}

fn parse_number(input: &str) -> IResult<&str, Expr, VerboseError<&str>> {
    map(ws(parse_decimal), Expr::Constant)(input)
}

fn parse_identifier(input: &str) -> IResult<&str, Expr, VerboseError<&str>> {
    map(ws(satisfy(char::is_alphabetic)), |c| {
        Expr::Variable(c.to_string())
    })(input)
}

/// Reads `12`, `1.25` or `.5` exactly.
fn parse_decimal(input: &str) -> IResult<&str, Rational, VerboseError<&str>> {
    map_res(
        recognize(alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        ))),
        decimal_to_rational,
    )(input)
}

fn decimal_to_rational(text: &str) -> std::result::Result<Rational, num_bigint::ParseBigIntError> {
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    let digits = format!("{int_part}{frac_part}");
    let numer = BigInt::from_str_radix(&digits, 10)?;
    let mut denom = BigInt::one();
    for _ in 0..frac_part.len() {
        denom *= 10;
    }
    Ok(Rational::new(numer, denom))
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, VerboseError<&'a str>>
where
    F: FnMut(&'a str) -> IResult<&'a str, O, VerboseError<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}
