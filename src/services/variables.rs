use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn token_pattern() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").unwrap())
}

/// Scan text fragments for `{{identifier}}` tokens and return the variable
/// names in first-seen order with duplicates removed.
///
/// Malformed tokens (unterminated `{{`, empty braces, illegal characters)
/// are ignored rather than errored. Empty fragments contribute nothing.
pub fn extract_variables<'a, I>(fragments: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = Vec::new();
    for fragment in fragments {
        for capture in token_pattern().captures_iter(fragment) {
            let name = &capture[1];
            if !seen.iter().any(|s| s == name) {
                seen.push(name.to_string());
            }
        }
    }
    seen
}

/// Replace every `{{var}}` token with its supplied value. Tokens without a
/// value are left as the literal token so missing substitutions are visibly
/// obvious, never silently blanked.
pub fn substitute_variables(text: &str, values: &HashMap<String, String>) -> String {
    token_pattern()
        .replace_all(text, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedups_and_preserves_first_seen_order() {
        let vars = extract_variables(["Hi {{name}}, your code is {{code}}. Bye {{name}}"]);
        assert_eq!(vars, vec!["name", "code"]);
    }

    #[test]
    fn spans_multiple_fragments() {
        let vars = extract_variables(["Hello {{name}}", "Order {{order_id}}", "{{name}}"]);
        assert_eq!(vars, vec!["name", "order_id"]);
    }

    #[test]
    fn ignores_malformed_tokens() {
        let vars = extract_variables(["unterminated {{oops and {{ok}} plus {{}}"]);
        assert_eq!(vars, vec!["ok"]);
    }

    #[test]
    fn empty_fragments_contribute_nothing() {
        let vars = extract_variables(["", "no tokens here"]);
        assert!(vars.is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = "A {{a}} b {{b}} a {{a}}";
        assert_eq!(extract_variables([text]), extract_variables([text]));
    }

    #[test]
    fn substitutes_supplied_values() {
        let values = HashMap::from([("name".to_string(), "Asha".to_string())]);
        assert_eq!(substitute_variables("Hi {{name}}", &values), "Hi Asha");
    }

    #[test]
    fn missing_values_keep_the_literal_token() {
        let values = HashMap::new();
        assert_eq!(substitute_variables("Hi {{name}}", &values), "Hi {{name}}");
    }
}
