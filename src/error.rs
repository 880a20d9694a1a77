use thiserror::Error;

pub type Result<T> = std::result::Result<T, CasError>;

/// Failures raised inside the algebra engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CasError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("undeclared symbol `{0}`")]
    UndeclaredSymbol(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("{0}")]
    Engine(String),
}

/// Coarse classification of an [`EvalError`], used by callers that present errors differently
/// per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Solve,
    Generic,
}

/// Error surfaced to the presentation layer when an evaluation fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The input could not be parsed, or an equation did not have exactly one `=`.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// The engine rejected the request while simplifying or solving.
    #[error("cannot evaluate: {0}")]
    Solve(String),

    /// Any other engine failure.
    #[error("invalid input: {0}")]
    Generic(String),
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::Syntax(_) => ErrorKind::Syntax,
            EvalError::Solve(_) => ErrorKind::Solve,
            EvalError::Generic(_) => ErrorKind::Generic,
        }
    }
}

impl From<CasError> for EvalError {
    fn from(err: CasError) -> Self {
        match err {
            CasError::Parse(_) | CasError::UndeclaredSymbol(_) => {
                EvalError::Syntax(err.to_string())
            }
            CasError::DivisionByZero | CasError::Unsupported(_) => {
                EvalError::Solve(err.to_string())
            }
            CasError::Engine(msg) => EvalError::Generic(msg),
        }
    }
}
