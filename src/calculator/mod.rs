//! The calculator front end: turns a line of informal input into a displayed result.
//!
//! Input flows through [`normalize`], [`extract_variables`], [`classify`] and [`dispatch`]. Only
//! successful evaluations reach the [`HistoryLog`].

mod dispatch;
mod history;
mod normalize;
mod variables;

pub use dispatch::{EvaluationRequest, EvaluationResult, classify, dispatch};
pub use history::{HISTORY_CAPACITY, HistoryLog, HistoryRecord};
pub use normalize::normalize;
pub use variables::{VariableSet, extract_variables};

use log::{debug, info, warn};

use crate::engine::{AlgebraEngine, Cas};
use crate::error::EvalError;

/// Everything produced by one successful evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Trimmed input as the user typed it.
    pub input: String,
    /// Input after implicit multiplication was made explicit.
    pub canonical: String,
    pub result: EvaluationResult,
    /// `Result: ...` or `Solution: ...`
    pub display: String,
}

/// Owns the engine and the bounded history of successful evaluations.
#[derive(Debug)]
pub struct Calculator<E = Cas> {
    engine: E,
    history: HistoryLog,
}

impl Default for Calculator<Cas> {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator<Cas> {
    pub fn new() -> Self {
        Self::with_engine(Cas)
    }

    pub fn with_history_capacity(capacity: usize) -> Self {
        Self::with_engine(Cas).history_capacity(capacity)
    }
}

impl<E: AlgebraEngine> Calculator<E> {
    pub fn with_engine(engine: E) -> Self {
        Calculator {
            engine,
            history: HistoryLog::new(),
        }
    }

    /// Replace the history log with an empty one holding at most `capacity` entries.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history = HistoryLog::with_capacity(capacity);
        self
    }

    /// Evaluate one line of input, recording it in the history on success.
    pub fn evaluate(&mut self, raw: &str) -> Result<Evaluation, EvalError> {
        let input = raw.trim();
        if input.is_empty() {
            warn!("event=evaluate_rejected reason=empty_input");
            return Err(EvalError::Syntax("empty input".to_string()));
        }

        let canonical = normalize(input);
        let variables = extract_variables(&canonical);
        debug!(
            "event=normalized input={input:?} canonical={canonical:?} variables={}",
            variables.len()
        );

        let outcome = classify(&canonical, variables)
            .and_then(|request| dispatch(&self.engine, &request));
        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    "event=evaluate_failed kind={:?} input={input:?} error={err}",
                    err.kind()
                );
                return Err(err);
            }
        };

        let display = result.to_string();
        self.history.record(input, display.clone());
        info!("event=evaluated input={input:?} display={display:?}");

        Ok(Evaluation {
            input: input.to_string(),
            canonical,
            result,
            display,
        })
    }

    /// Acknowledge a clear request. The history is left as it is.
    pub fn clear(&self) {
        info!(
            "event=clear_requested history_len={}",
            self.history.len()
        );
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// History entries rendered as `<input> → <result>`, oldest first.
    pub fn history_entries(&self) -> Vec<String> {
        self.history.formatted()
    }
}
