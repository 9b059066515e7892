//! Token templating.
//!
//! API tokens may be stored as templates containing `{{ ENV_VAR_NAME }}`
//! placeholders, resolved against the process environment at configuration
//! time. The engine keeps resolution pure by taking the lookup as a closure;
//! only the driver's config layer touches the real environment.

/// Substitute every `{{ NAME }}` placeholder in `template` with
/// `lookup(NAME)`, where `NAME` is one or more word characters
/// (`[A-Za-z0-9_]`) and the inner whitespace is optional.
///
/// A name the lookup cannot resolve substitutes the empty string; resolution
/// never fails. Anything that is not a well-formed placeholder, including
/// unbalanced braces, passes through verbatim.
pub fn resolve_token<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let (head, tail) = rest.split_at(start);
        match parse_placeholder(&tail[2..]) {
            Some((name, consumed)) => {
                out.push_str(head);
                if let Some(value) = lookup(name) {
                    out.push_str(&value);
                }
                rest = &tail[2 + consumed..];
            }
            None => {
                // Not a placeholder; emit the braces and keep scanning
                out.push_str(head);
                out.push_str("{{");
                rest = &tail[2..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Resolve a token template against the process environment.
pub fn resolve_token_from_env(template: &str) -> String {
    resolve_token(template, |name| std::env::var(name).ok())
}

/// Parse `\s* NAME \s* }}` at the start of `input`. Returns the name and the
/// number of bytes consumed including the closing braces.
fn parse_placeholder(input: &str) -> Option<(&str, usize)> {
    let trimmed = input.trim_start_matches([' ', '\t']);
    let ws_lead = input.len() - trimmed.len();

    let name_len = trimmed
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(trimmed.len());
    if name_len == 0 {
        return None;
    }

    let after_name = &trimmed[name_len..];
    let after_ws = after_name.trim_start_matches([' ', '\t']);
    if !after_ws.starts_with("}}") {
        return None;
    }

    let consumed = ws_lead + name_len + (after_name.len() - after_ws.len()) + 2;
    Some((&trimmed[..name_len], consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn substitutes_known_names() {
        let token = resolve_token("{{FOO}}-{{BAR}}", env(&[("FOO", "abc"), ("BAR", "xyz")]));
        assert_eq!(token, "abc-xyz");
    }

    #[test]
    fn missing_names_become_empty() {
        let token = resolve_token("{{FOO}}-{{BAR}}", env(&[("FOO", "abc")]));
        assert_eq!(token, "abc-");
    }

    #[test]
    fn inner_whitespace_is_optional() {
        let token = resolve_token("{{ FOO }}", env(&[("FOO", "abc")]));
        assert_eq!(token, "abc");
        let token = resolve_token("{{\tFOO }}", env(&[("FOO", "abc")]));
        assert_eq!(token, "abc");
    }

    #[test]
    fn plain_tokens_pass_through() {
        assert_eq!(resolve_token("static-token", env(&[])), "static-token");
    }

    #[test]
    fn malformed_placeholders_pass_through() {
        let lookup = env(&[("FOO", "abc")]);
        assert_eq!(resolve_token("{{FOO", &lookup), "{{FOO");
        assert_eq!(resolve_token("{{}}", &lookup), "{{}}");
        assert_eq!(resolve_token("{{FO O}}", &lookup), "{{FO O}}");
        assert_eq!(resolve_token("a {{ b", &lookup), "a {{ b");
    }

    #[test]
    fn adjacent_placeholders() {
        let token = resolve_token("{{A}}{{B}}", env(&[("A", "1"), ("B", "2")]));
        assert_eq!(token, "12");
    }
}
