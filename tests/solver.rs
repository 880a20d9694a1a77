use rcalc::expr::Expr;
use rcalc::{CasError, Solution, parse_expr, rational, simplify_fully, solve_system, substitute};

fn equation(input: &str) -> (Expr, Expr) {
    let (lhs, rhs) = input.split_once('=').expect("equation has `=`");
    (
        parse_expr(lhs).expect("parse lhs"),
        parse_expr(rhs).expect("parse rhs"),
    )
}

fn solve(vars: &[&str], equations: &[&str]) -> Result<Vec<Solution>, CasError> {
    solve_system(
        vars.to_vec(),
        equations.iter().map(|eq| equation(eq)).collect(),
    )
}

/// Plug every value of `solution` into `lhs - rhs` and expect zero.
fn assert_satisfies(solution: &Solution, input: &str) {
    let (lhs, rhs) = equation(input);
    let mut residual = Expr::Sub(lhs.boxed(), rhs.boxed());
    for (var, value) in solution.iter() {
        residual = substitute(&residual, var, value);
    }
    let residual = simplify_fully(residual);
    assert!(
        residual.is_zero(),
        "{input} not satisfied by {solution:?}: residual {residual:?}"
    );
}

#[test]
fn unique_linear_system() {
    let system = ["x + y = 3", "x - y = 1"];
    let solutions = solve(&["x", "y"], &system).expect("solve");
    assert_eq!(solutions.len(), 1);
    let solution = &solutions[0];
    assert_eq!(solution.get("x"), Some(&Expr::integer(2)));
    assert_eq!(solution.get("y"), Some(&Expr::integer(1)));
    for eq in system {
        assert_satisfies(solution, eq);
    }
}

#[test]
fn fractional_solution_is_exact() {
    let solutions = solve(&["x"], &["3*x = 1"]).expect("solve");
    assert_eq!(solutions[0].get("x"), Some(&Expr::Constant(rational(1, 3))));
}

#[test]
fn underdetermined_system_is_parametric() {
    let solutions = solve(&["x", "y"], &["23*x - 8*y = 99"]).expect("solve");
    assert_eq!(solutions.len(), 1);
    let solution = &solutions[0];
    assert_eq!(solution.len(), 1);
    let x = solution.get("x").expect("x is a pivot");
    assert!(x.contains_var("y"));
    assert_satisfies(solution, "23*x - 8*y = 99");
}

#[test]
fn inconsistent_system_has_no_solution() {
    let solutions = solve(&["x", "y"], &["x + y = 1", "x + y = 2"]).expect("solve");
    assert!(solutions.is_empty());
}

#[test]
fn identity_has_one_empty_solution() {
    let solutions = solve(&["x"], &["2*(x+1) = 2*x + 2"]).expect("solve");
    assert_eq!(solutions, vec![Solution::new()]);
}

#[test]
fn quadratic_with_rational_roots() {
    let solutions = solve(&["x"], &["2*x^2 - 3*x + 1 = 0"]).expect("solve");
    let roots: Vec<&Expr> = solutions.iter().filter_map(|s| s.get("x")).collect();
    assert_eq!(
        roots,
        vec![&Expr::Constant(rational(1, 2)), &Expr::integer(1)]
    );
}

#[test]
fn quadratic_with_double_root() {
    let solutions = solve(&["x"], &["x^2 - 2*x + 1 = 0"]).expect("solve");
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0].get("x"), Some(&Expr::integer(1)));
}

#[test]
fn quadratic_with_irrational_roots() {
    let solutions = solve(&["x"], &["x^2 = 12"]).expect("solve");
    assert_eq!(solutions.len(), 2);
    let shown: Vec<String> = solutions
        .iter()
        .filter_map(|s| s.get("x"))
        .map(ToString::to_string)
        .collect();
    assert_eq!(shown, vec!["-2*3^(1/2)", "2*3^(1/2)"]);
}

#[test]
fn quadratic_without_real_roots() {
    let solutions = solve(&["x"], &["x^2 + 1 = 0"]).expect("solve");
    assert!(solutions.is_empty());
}

#[test]
fn unsupported_non_linear_input() {
    for (vars, eqs) in [
        (vec!["x"], vec!["x^3 = 8"]),
        (vec!["x", "y"], vec!["x*y = 1"]),
        (vec!["x", "y"], vec!["x^2 = 1", "y = 2"]),
    ] {
        let result = solve(&vars, &eqs);
        assert!(
            matches!(result, Err(CasError::Unsupported(_))),
            "{eqs:?}: {result:?}"
        );
    }
}
