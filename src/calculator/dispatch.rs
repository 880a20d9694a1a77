use std::fmt;

use crate::calculator::variables::VariableSet;
use crate::engine::{AlgebraEngine, SymbolTable};
use crate::error::EvalError;
use crate::expr::Expr;
use crate::format::pretty_solutions;
use crate::solver::Solution;

/// Canonical input, classified by whether it contains `=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationRequest {
    Expression {
        text: String,
        variables: VariableSet,
    },
    Equation {
        lhs: String,
        rhs: String,
        variables: VariableSet,
    },
}

impl EvaluationRequest {
    pub fn variables(&self) -> &VariableSet {
        match self {
            EvaluationRequest::Expression { variables, .. }
            | EvaluationRequest::Equation { variables, .. } => variables,
        }
    }
}

/// Text with an `=` must split into exactly two non-empty sides.
pub fn classify(canonical: &str, variables: VariableSet) -> Result<EvaluationRequest, EvalError> {
    if !canonical.contains('=') {
        return Ok(EvaluationRequest::Expression {
            text: canonical.to_string(),
            variables,
        });
    }

    let sides: Vec<&str> = canonical.split('=').collect();
    match sides.as_slice() {
        [lhs, rhs] if !lhs.trim().is_empty() && !rhs.trim().is_empty() => {
            Ok(EvaluationRequest::Equation {
                lhs: lhs.trim().to_string(),
                rhs: rhs.trim().to_string(),
                variables,
            })
        }
        [_, _] => Err(EvalError::Syntax(
            "both sides of an equation must be non-empty".to_string(),
        )),
        _ => Err(EvalError::Syntax(format!(
            "expected one `=`, found {}",
            sides.len() - 1
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationResult {
    Simplified(Expr),
    Solved(Vec<Solution>),
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationResult::Simplified(expr) => write!(f, "Result: {expr}"),
            EvaluationResult::Solved(solutions) => {
                write!(f, "Solution: {}", pretty_solutions(solutions))
            }
        }
    }
}

/// Hand the request to `engine`, declaring every extracted variable first.
pub fn dispatch<E>(engine: &E, request: &EvaluationRequest) -> Result<EvaluationResult, EvalError>
where
    E: AlgebraEngine + ?Sized,
{
    let symbols: SymbolTable = request.variables().iter().copied().collect();
    let result = match request {
        EvaluationRequest::Expression { text, .. } => {
            let expr = engine.parse(text, &symbols)?;
            EvaluationResult::Simplified(engine.simplify(expr)?)
        }
        EvaluationRequest::Equation { lhs, rhs, .. } => {
            let lhs = engine.parse(lhs, &symbols)?;
            let rhs = engine.parse(rhs, &symbols)?;
            let equation = engine.build_equation(lhs, rhs);
            EvaluationResult::Solved(engine.solve(&equation, &symbols.symbols())?)
        }
    };
    Ok(result)
}
