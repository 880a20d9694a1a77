use std::collections::BTreeSet;

/// Distinct alphabetic characters of an input, in character order.
pub type VariableSet = BTreeSet<char>;

/// Every alphabetic character is a variable; digits, operators and whitespace are not.
pub fn extract_variables(text: &str) -> VariableSet {
    text.chars().filter(|c| c.is_alphabetic()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_distinct_letters() {
        let vars = extract_variables("23*x - 8*y = 99");
        assert_eq!(vars.into_iter().collect::<Vec<_>>(), vec!['x', 'y']);
        assert_eq!(extract_variables("x+x*y"), VariableSet::from(['x', 'y']));
        assert_eq!(extract_variables("x*x+x").len(), 1);
    }

    #[test]
    fn no_letters_no_variables() {
        assert!(extract_variables("2+2").is_empty());
        assert!(extract_variables("").is_empty());
    }
}
