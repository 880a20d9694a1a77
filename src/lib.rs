//! An algebra calculator: informal input such as `23x - 8y = 99` goes in, a simplified
//! expression or a solved equation comes out.
//!
//! [`Calculator`] is the entry point. It normalizes the input, hands it to an
//! [`AlgebraEngine`] and keeps a bounded history of successful evaluations. The default engine,
//! [`Cas`], is built from the parser, simplifier and solver in this crate.

pub mod calculator;
pub mod engine;
pub mod error;
pub mod expr;
pub mod format;
pub mod parser;
pub mod polynomial;
pub mod simplify;
pub mod solver;

pub use calculator::{
    Calculator, Evaluation, EvaluationRequest, EvaluationResult, HISTORY_CAPACITY, HistoryLog,
    HistoryRecord, VariableSet, classify, dispatch, extract_variables, normalize,
};
pub use engine::{AlgebraEngine, Cas, Equation, Symbol, SymbolTable};
pub use error::{CasError, ErrorKind, EvalError, Result};
pub use expr::{Expr, Rational, add, mul, neg, one, pow, rational, zero};
pub use format::{pretty, pretty_solution, pretty_solutions};
pub use parser::parse_expr;
pub use polynomial::Poly;
pub use simplify::{simplify, simplify_checked, simplify_fully, simplify_with_limit, substitute};
pub use solver::{Solution, solve_system};
