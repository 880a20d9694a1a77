use rcalc::engine::{AlgebraEngine, Equation, Symbol, SymbolTable};
use rcalc::{
    Calculator, CasError, ErrorKind, EvalError, EvaluationResult, Expr, HISTORY_CAPACITY, Solution,
};

fn display(input: &str) -> String {
    let mut calc = Calculator::new();
    calc.evaluate(input).expect("evaluate input").display
}

#[test]
fn linear_equation_is_solved() {
    let mut calc = Calculator::new();
    let evaluation = calc.evaluate("2x+1=5").expect("solve");
    assert_eq!(evaluation.canonical, "2*x+1=5");
    assert_eq!(evaluation.display, "Solution: {x: 2}");
    match evaluation.result {
        EvaluationResult::Solved(solutions) => {
            assert_eq!(solutions.len(), 1);
            assert_eq!(solutions[0].get("x"), Some(&Expr::integer(2)));
        }
        other => panic!("expected a solution, got {other:?}"),
    }
    assert_eq!(calc.history_entries(), vec!["2x+1=5 → Solution: {x: 2}".to_string()]);
}

#[test]
fn expressions_are_simplified() {
    assert_eq!(display("2+2"), "Result: 4");
    assert_eq!(display("2(x+1)"), "Result: 2*x+2");
    assert_eq!(display("x*x + 2x - x"), "Result: x^2+x");
    assert_eq!(display("0.5 + 1/4"), "Result: 3/4");
}

#[test]
fn digit_before_minus_multiplies() {
    let mut calc = Calculator::new();
    let evaluation = calc.evaluate("5-3").expect("evaluate");
    assert_eq!(evaluation.canonical, "5*-3");
    assert_eq!(evaluation.display, "Result: -15");
}

#[test]
fn input_is_trimmed_before_recording() {
    let mut calc = Calculator::new();
    calc.evaluate("   2+2  ").expect("evaluate");
    assert_eq!(calc.history_entries(), vec!["2+2 → Result: 4".to_string()]);
}

#[test]
fn malformed_equations_leave_history_alone() {
    let mut calc = Calculator::new();
    calc.evaluate("1+1").expect("evaluate");
    let before = calc.history_entries();

    for input in ["x=1=2", "=5", "x=", "   "] {
        let err = calc.evaluate(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax, "{input}: {err}");
    }
    assert_eq!(calc.history_entries(), before);
}

#[test]
fn unparsable_text_is_a_syntax_error() {
    let mut calc = Calculator::new();
    for input in ["2+*3", "(x+1", "xy+1", "2 $ 3"] {
        let err = calc.evaluate(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax, "{input}: {err}");
    }
    assert!(calc.history().is_empty());
}

#[test]
fn division_by_zero_is_a_solve_error() {
    let mut calc = Calculator::new();
    let err = calc.evaluate("1/0").unwrap_err();
    assert_eq!(err, EvalError::Solve("division by zero".to_string()));
    assert!(calc.history_entries().is_empty());
}

#[test]
fn division_by_zero_is_not_cancelled_by_a_zero_factor() {
    let mut calc = Calculator::new();
    for input in ["1/0*0", "0^-1*0", "0*(1/0)", "x/(x-x)*0=1"] {
        let err = calc.evaluate(input).unwrap_err();
        assert_eq!(err, EvalError::Solve("division by zero".to_string()), "{input}");
    }
    assert!(calc.history_entries().is_empty());
}

#[test]
fn huge_exponents_are_unsupported() {
    let mut calc = Calculator::new();
    for input in ["x^9223372036854775808=1", "x^65=1", "(x^8)^9=1"] {
        let err = calc.evaluate(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Solve, "{input}: {err}");
    }
    assert_eq!(
        calc.evaluate("2^100000").expect("evaluate").display,
        "Result: 2^100000"
    );
    assert_eq!(calc.history_entries().len(), 1);
}

#[test]
fn long_sign_runs_evaluate_without_recursion() {
    let signs = "-".repeat(200_000);
    assert_eq!(display(&format!("{signs}1")), "Result: 1");
    assert_eq!(display(&format!("-{signs}1")), "Result: -1");
    assert_eq!(display(&format!("{signs}x+x")), "Result: 2*x");
}

#[test]
fn deeply_nested_or_overlong_input_is_a_syntax_error() {
    let mut calc = Calculator::new();
    let nested = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
    let chain = vec!["1"; 10_000].join("+");
    for input in [nested, chain] {
        let err = calc.evaluate(&input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }
    assert!(calc.history().is_empty());
}

#[test]
fn history_keeps_the_last_ten() {
    let mut calc = Calculator::new();
    for i in 1..=11 {
        calc.evaluate(&i.to_string()).expect("evaluate");
    }
    let entries = calc.history_entries();
    assert_eq!(entries.len(), HISTORY_CAPACITY);
    let expected: Vec<String> = (2..=11).map(|i| format!("{i} → Result: {i}")).collect();
    assert_eq!(entries, expected);
}

#[test]
fn history_capacity_is_configurable() {
    let mut calc = Calculator::with_history_capacity(2);
    for input in ["1", "2", "3"] {
        calc.evaluate(input).expect("evaluate");
    }
    assert_eq!(
        calc.history_entries(),
        vec!["2 → Result: 2".to_string(), "3 → Result: 3".to_string()]
    );
}

#[test]
fn clear_does_not_touch_history() {
    let mut calc = Calculator::new();
    calc.evaluate("2+2").expect("evaluate");
    calc.evaluate("2x=4").expect("evaluate");
    let before = calc.history_entries();
    calc.clear();
    assert_eq!(calc.history_entries(), before);
}

#[test]
fn two_variable_equation_is_parametric() {
    let mut calc = Calculator::new();
    let evaluation = calc.evaluate("23x - 8y = 99").expect("solve");
    assert_eq!(evaluation.canonical, "23*x - 8*y = 99");
    assert_eq!(evaluation.display, "Solution: {x: 8/23*y+99/23}");
}

#[test]
fn quadratic_roots_are_listed() {
    assert_eq!(display("x^2=4"), "Solution: [{x: -2}, {x: 2}]");
    assert_eq!(display("x^2=2"), "Solution: [{x: -2^(1/2)}, {x: 2^(1/2)}]");
    assert_eq!(display("(x+1)^2=4"), "Solution: [{x: -3}, {x: 1}]");
    assert_eq!(display("x^2=-1"), "Solution: []");
}

#[test]
fn degenerate_equations() {
    assert_eq!(display("x=x"), "Solution: {}");
    assert_eq!(display("x+1=x+2"), "Solution: []");
}

#[test]
fn unsupported_equations_are_solve_errors() {
    let mut calc = Calculator::new();
    for input in ["x^3=8", "x*y=1"] {
        let err = calc.evaluate(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Solve, "{input}: {err}");
    }
}

struct OfflineEngine;

impl AlgebraEngine for OfflineEngine {
    fn parse(&self, _text: &str, _symbols: &SymbolTable) -> rcalc::Result<Expr> {
        Err(CasError::Engine("engine offline".to_string()))
    }

    fn simplify(&self, expr: Expr) -> rcalc::Result<Expr> {
        Ok(expr)
    }

    fn solve(&self, _equation: &Equation, _variables: &[Symbol]) -> rcalc::Result<Vec<Solution>> {
        Ok(Vec::new())
    }
}

#[test]
fn other_engine_failures_are_generic() {
    let mut calc = Calculator::with_engine(OfflineEngine);
    let err = calc.evaluate("2+2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err, EvalError::Generic("engine offline".to_string()));
    assert!(calc.history_entries().is_empty());
}
