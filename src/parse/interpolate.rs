//! `$` variable interpolation.
//!
//! | Sequence   | Meaning                                              |
//! |------------|------------------------------------------------------|
//! | `$name`    | Variable `name` (ASCII alphanumerics and `_`)        |
//! | `${name}`  | Same, brace form; the name may contain anything      |
//! | `$(name)`  | Same, paren form                                     |
//! | `\$`       | Literal `$`                                          |
//!
//! The text is scanned right to left. Each substitution moves the scan
//! limit strictly leftward, so a spliced value is never expanded again.

use super::delim::find_match;

/// Read-only variable lookup used by interpolation and expressions.
pub trait Lookup {
    fn lookup(&self, name: &str) -> Option<&str>;
}

impl Lookup for std::collections::HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Expand every `$` reference in `text`. Unknown names expand to nothing.
pub fn interpolate(text: &str, vars: &dyn Lookup) -> String {
    let mut out = text.to_string();
    let mut limit = out.len();

    while let Some(pos) = out[..limit].rfind('$') {
        if pos > 0 && out.as_bytes()[pos - 1] == b'\\' {
            out.remove(pos - 1);
            limit = pos - 1;
            continue;
        }

        let after = pos + 1;
        let (name, end) = match out.as_bytes().get(after) {
            Some(&open @ (b'{' | b'(')) => match find_match(&out, open as char, after) {
                Some(close) => (out[after + 1..close].trim().to_string(), close + 1),
                None => (out[after + 1..].trim().to_string(), out.len()),
            },
            _ => {
                let len = out[after..]
                    .find(|c: char| !is_name_char(c))
                    .unwrap_or(out.len() - after);
                (out[after..after + len].to_string(), after + len)
            }
        };

        let value = vars.lookup(&name).unwrap_or("").to_string();
        out.replace_range(pos..end, &value);
        limit = pos;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn bare_name() {
        let v = vars(&[("x", "42")]);
        assert_eq!(interpolate("v=$x;", &v), "v=42;");
        assert_eq!(interpolate("$x and $x", &v), "42 and 42");
    }

    #[test]
    fn brace_and_paren_forms() {
        let v = vars(&[("x", "42"), ("long name", "y")]);
        assert_eq!(interpolate("v=${x}!", &v), "v=42!");
        assert_eq!(interpolate("v=$(x)!", &v), "v=42!");
        assert_eq!(interpolate("${ long name }", &v), "y");
    }

    #[test]
    fn unknown_is_empty() {
        let v = vars(&[]);
        assert_eq!(interpolate("a $nope b", &v), "a  b");
        assert_eq!(interpolate("a ${nope} b", &v), "a  b");
    }

    #[test]
    fn escaped_dollar_is_literal() {
        let v = vars(&[("x", "42")]);
        assert_eq!(interpolate("cost \\$x", &v), "cost $x");
        assert_eq!(interpolate("$x\\$x", &v), "42$x");
    }

    #[test]
    fn lone_dollar_vanishes() {
        let v = vars(&[]);
        assert_eq!(interpolate("a $ b", &v), "a  b");
        assert_eq!(interpolate("end$", &v), "end");
    }

    #[test]
    fn unterminated_brace_consumes_rest() {
        let v = vars(&[("x", "1")]);
        assert_eq!(interpolate("a ${x", &v), "a 1");
    }

    #[test]
    fn spliced_value_not_rescanned() {
        let v = vars(&[("a", "$b"), ("b", "boom")]);
        assert_eq!(interpolate("$a", &v), "$b");
    }

    #[test]
    fn value_left_of_scan_is_expanded() {
        // The inner reference is resolved first; the outer brace then sees
        // the substituted name.
        let v = vars(&[("n", "x"), ("x", "42")]);
        assert_eq!(interpolate("${$n}", &v), "42");
    }

    #[test]
    fn no_dollar_is_identity() {
        let v = vars(&[("x", "1")]);
        assert_eq!(interpolate("echo plain text; x", &v), "echo plain text; x");
    }

    #[test]
    fn multibyte_text_survives() {
        let v = vars(&[("x", "é")]);
        assert_eq!(interpolate("ünï $x cödé", &v), "ünï é cödé");
    }
}
