use crate::format::expr::pretty;
use crate::solver::Solution;

/// `{x: 2, y: 1/3}`
pub fn pretty_solution(solution: &Solution) -> String {
    let body = solution
        .iter()
        .map(|(var, value)| format!("{var}: {}", pretty(value)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{body}}}")
}

/// A lone solution prints bare; none or several print as a bracketed list.
pub fn pretty_solutions(solutions: &[Solution]) -> String {
    match solutions {
        [single] => pretty_solution(single),
        many => {
            let items: Vec<String> = many.iter().map(pretty_solution).collect();
            format!("[{}]", items.join(", "))
        }
    }
}
