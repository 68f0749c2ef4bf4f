//! Placeholder substitution for source and command templates.
//!
//! A placeholder is `{name}` where `name` is one of the supplied keys. The
//! template is scanned once, left to right, so substituted values are never
//! re-expanded. Any other brace sequence is copied through untouched, which
//! keeps brace-heavy languages (Java, C#) readable in templates.

pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open + 1..];

        let substituted = candidate.find('}').and_then(|close| {
            let key = &candidate[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });

        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &candidate[close + 1..];
            }
            None => {
                out.push('{');
                rest = candidate;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_known_placeholders() {
        let rendered = render("{job_id}.py <- {code}", &[("code", "x"), ("job_id", "AbC")]);
        assert_eq!(rendered, "AbC.py <- x");
    }

    #[test]
    fn test_leaves_literal_braces_alone() {
        let rendered = render(
            "class {job_id} { void main() { {code} } }",
            &[("code", "go();"), ("job_id", "Main")],
        );
        assert_eq!(rendered, "class Main { void main() { go(); } }");
    }

    #[test]
    fn test_values_are_not_re_expanded() {
        let rendered = render("{code}", &[("code", "print('{job_id}')"), ("job_id", "X")]);
        assert_eq!(rendered, "print('{job_id}')");
    }

    #[test]
    fn test_unterminated_brace() {
        assert_eq!(render("a { b", &[("code", "c")]), "a { b");
        assert_eq!(render("{code", &[("code", "c")]), "{code");
    }
}
