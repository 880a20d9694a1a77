//! The seam between the calculator front end and the symbolic algebra engine.
//!
//! [`AlgebraEngine`] is what the dispatcher talks to; [`Cas`] is the engine built from this
//! crate's parser, simplifier and solver. Every fallible call returns a [`CasError`] whose variant
//! tells the caller what kind of failure occurred.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CasError, Result};
use crate::expr::Expr;
use crate::parser::parse_expr;
use crate::simplify::simplify_checked;
use crate::solver::{Solution, solve_system};

/// A declared single-character variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(char);

impl Symbol {
    pub fn name(self) -> char {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The set of symbols an expression may refer to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: BTreeMap<char, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declaring the same name twice returns the same symbol.
    pub fn declare(&mut self, name: char) -> Symbol {
        *self.symbols.entry(name).or_insert(Symbol(name))
    }

    pub fn get(&self, name: char) -> Option<Symbol> {
        self.symbols.get(&name).copied()
    }

    /// Declared symbols in name order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.symbols.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn is_declared(&self, name: &str) -> bool {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.symbols.contains_key(&c),
            _ => false,
        }
    }
}

impl FromIterator<char> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let mut table = SymbolTable::new();
        for name in iter {
            table.declare(name);
        }
        table
    }
}

/// `lhs = rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}

pub trait AlgebraEngine {
    /// Parse formal text, rejecting any identifier not declared in `symbols`.
    fn parse(&self, text: &str, symbols: &SymbolTable) -> Result<Expr>;

    fn simplify(&self, expr: Expr) -> Result<Expr>;

    fn build_equation(&self, lhs: Expr, rhs: Expr) -> Equation {
        Equation { lhs, rhs }
    }

    /// Every solution found for `variables`; an empty result means there is none.
    fn solve(&self, equation: &Equation, variables: &[Symbol]) -> Result<Vec<Solution>>;
}

/// The in-crate engine: nom parser, rule-based simplifier and exact solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cas;

impl AlgebraEngine for Cas {
    fn parse(&self, text: &str, symbols: &SymbolTable) -> Result<Expr> {
        let expr = parse_expr(text)?;
        check_declared(&expr, symbols)?;
        Ok(expr)
    }

    fn simplify(&self, expr: Expr) -> Result<Expr> {
        simplify_checked(expr)
    }

    fn solve(&self, equation: &Equation, variables: &[Symbol]) -> Result<Vec<Solution>> {
        let lhs = self.simplify(equation.lhs.clone())?;
        let rhs = self.simplify(equation.rhs.clone())?;
        let names: Vec<String> = variables.iter().map(|s| s.name().to_string()).collect();
        solve_system(names, vec![(lhs, rhs)])
    }
}

fn check_declared(expr: &Expr, symbols: &SymbolTable) -> Result<()> {
    match expr {
        Expr::Variable(name) if !symbols.is_declared(name) => {
            Err(CasError::UndeclaredSymbol(name.clone()))
        }
        Expr::Variable(_) | Expr::Constant(_) => Ok(()),
        Expr::Add(a, b)
        | Expr::Sub(a, b)
        | Expr::Mul(a, b)
        | Expr::Div(a, b)
        | Expr::Pow(a, b) => {
            check_declared(a, symbols)?;
            check_declared(b, symbols)
        }
        Expr::Neg(a) => check_declared(a, symbols),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_is_idempotent() {
        let mut table = SymbolTable::new();
        let first = table.declare('x');
        let second = table.declare('x');
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get('x'), Some(first));
    }

    #[test]
    fn parse_rejects_undeclared_symbols() {
        let table: SymbolTable = ['x'].into_iter().collect();
        assert!(Cas.parse("2*x+1", &table).is_ok());
        assert_eq!(
            Cas.parse("x+z", &table),
            Err(CasError::UndeclaredSymbol("z".to_string()))
        );
    }

    #[test]
    fn simplify_reports_division_by_zero() {
        let table = SymbolTable::new();
        let expr = Cas.parse("1/(2-2)", &table).unwrap();
        assert_eq!(Cas.simplify(expr), Err(CasError::DivisionByZero));
        let expr = Cas.parse("0^-1", &table).unwrap();
        assert_eq!(Cas.simplify(expr), Err(CasError::DivisionByZero));
    }

    #[test]
    fn division_by_zero_is_not_multiplied_away() {
        let table: SymbolTable = ['x'].into_iter().collect();
        for input in ["1/0*0", "0*(1/0)", "0^-1*0", "x/(x-x)*0", "1/0-1/0"] {
            let expr = Cas.parse(input, &table).unwrap();
            assert_eq!(Cas.simplify(expr), Err(CasError::DivisionByZero), "{input}");
        }
    }

    #[test]
    fn unused_zero_is_fine() {
        let table = SymbolTable::new();
        let expr = Cas.parse("0*5", &table).unwrap();
        assert!(Cas.simplify(expr).unwrap().is_zero());
    }
}
