/// Rewrite informal input into explicit-multiplication form.
///
/// A single left-to-right pass compares each character with the last character written and
/// inserts `*` for these adjacencies:
///
/// | previous     | current | output |
/// |--------------|---------|--------|
/// | alphanumeric | `(`     | `*(`   |
/// | digit        | `x`     | `*x`   |
/// | digit        | `y`     | `*y`   |
/// | digit        | `-`     | `*-`   |
///
/// The last rule fires on plain subtraction too, so `5-3` becomes `5*-3`. Callers rely on that
/// exact output; do not change it without changing them.
///
/// The output is a fixed point: an inserted `*` always separates the pair that triggered it.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 2);
    let mut prev: Option<char> = None;

    for c in input.chars() {
        let insert_mul = match (prev, c) {
            (Some(p), '(') => p.is_alphanumeric(),
            (Some(p), 'x' | 'y' | '-') => p.is_ascii_digit(),
            _ => false,
        };
        if insert_mul {
            out.push('*');
        }
        out.push(c);
        prev = Some(c);
    }

    out
}
