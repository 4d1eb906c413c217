//! Inline suppression comments — `schemalint-ignore RULE` silences findings at source

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static SUPPRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"schemalint-ignore\s+([\w\-\*]+(?:[ \t]+[\w\-\*]+)*)").unwrap()
});

/// Parse inline suppression comments from file content.
///
/// Returns a map of `line_number → vec_of_tokens` (1-indexed). We simply
/// search for the `schemalint-ignore` token anywhere on the line, so both
/// `//` and `/* */` comments work.
pub fn parse_suppressions(content: &str) -> HashMap<usize, Vec<String>> {
    let mut map = HashMap::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1; // 1-indexed
        if let Some(caps) = SUPPRESS_RE.captures(line) {
            let tokens: Vec<String> = caps[1].split_whitespace().map(String::from).collect();
            map.insert(line_no, tokens);
        }
    }
    map
}

/// Check whether a rule is named by any of the given suppression tokens.
///
/// - `*` matches every rule
/// - `schemaUnsafeNumbers` matches that rule by name
/// - `35` matches the rule with code 35
pub fn matches_suppression(rule_name: &str, code: u32, tokens: &[String]) -> bool {
    tokens
        .iter()
        .any(|t| t == "*" || t == rule_name || t.parse::<u32>() == Ok(code))
}

/// Whether a finding at `line` is silenced by a comment on the same line or
/// the line before.
pub fn is_suppressed(
    suppressions: &HashMap<usize, Vec<String>>,
    line: usize,
    rule_name: &str,
    code: u32,
) -> bool {
    let same_line = suppressions
        .get(&line)
        .is_some_and(|t| matches_suppression(rule_name, code, t));
    let line_before = line > 1
        && suppressions
            .get(&(line - 1))
            .is_some_and(|t| matches_suppression(rule_name, code, t));
    same_line || line_before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_tokens() {
        let sups = parse_suppressions("a\n// schemalint-ignore 34 schemaUnsafeTypes\nb");
        assert_eq!(
            sups.get(&2),
            Some(&vec!["34".to_string(), "schemaUnsafeTypes".to_string()])
        );
        assert!(!sups.contains_key(&1));
    }

    #[test]
    fn test_matches_by_name_code_and_wildcard() {
        let tokens = vec!["schemaUnsafeNumbers".to_string()];
        assert!(matches_suppression("schemaUnsafeNumbers", 35, &tokens));
        assert!(!matches_suppression("schemaUnsafeTypes", 36, &tokens));
        assert!(matches_suppression("x", 36, &["36".to_string()]));
        assert!(matches_suppression("x", 1, &["*".to_string()]));
    }

    #[test]
    fn test_line_before_only() {
        let sups = parse_suppressions("// schemalint-ignore *\nx\ny");
        assert!(is_suppressed(&sups, 1, "r", 1));
        assert!(is_suppressed(&sups, 2, "r", 1));
        assert!(!is_suppressed(&sups, 3, "r", 1));
    }
}
