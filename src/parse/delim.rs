//! Quote- and escape-aware delimiter matching.
//!
//! Indices are byte offsets. Every recognised delimiter is ASCII, so an index
//! returned here always sits on a char boundary and can be used to slice.

/// Opening delimiter → closing delimiter.
const PAIRS: &[(u8, u8)] = &[
    (b'(', b')'),
    (b'{', b'}'),
    (b'[', b']'),
    (b'"', b'"'),
    (b'\'', b'\''),
];

fn closer(opener: u8) -> Option<u8> {
    PAIRS.iter().find(|(o, _)| *o == opener).map(|(_, c)| *c)
}

fn is_quote(c: u8) -> bool {
    c == b'"' || c == b'\''
}

/// The closing delimiter paired with `opener`, if it is one.
pub fn closer_for(opener: char) -> Option<char> {
    if !opener.is_ascii() {
        return None;
    }
    closer(opener as u8).map(char::from)
}

/// Find the first unescaped, unquoted occurrence of `delim` at or after `start`.
///
/// A backslash consumes itself and the following character. A quote character
/// (other than `delim` itself) is skipped up to its matching closer; an
/// unterminated quote means the delimiter cannot be found.
pub fn find_open(text: &str, delim: char, start: usize) -> Option<usize> {
    if !delim.is_ascii() {
        return None;
    }
    let delim = delim as u8;
    let bytes = text.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        let c = bytes[i];
        if c == b'\\' {
            i += 2;
            continue;
        }
        if c == delim {
            return Some(i);
        }
        if is_quote(c) {
            i = find_match(text, c as char, i)?;
        }
        i += 1;
    }
    None
}

/// Find the delimiter that structurally closes the `opener` found at `start`.
///
/// Inside a quoted region only the *other* quote character opens a nested
/// region; the same quote character always closes. Outside quotes every
/// opener in the pairing table nests.
///
/// If `opener` is not a delimiter at all, returns `Some(start + 1)`: the
/// caller should skip one character and carry on.
pub fn find_match(text: &str, opener: char, start: usize) -> Option<usize> {
    let Some(first) = opener.is_ascii().then_some(opener as u8).filter(|c| closer(*c).is_some())
    else {
        return Some(start + 1);
    };
    let bytes = text.as_bytes();
    let mut open = vec![first];
    let mut i = start + 1;
    while i < bytes.len() {
        let c = bytes[i];
        if c == b'\\' {
            i += 2;
            continue;
        }
        let top = *open.last()?;
        if Some(c) == closer(top) {
            open.pop();
            if open.is_empty() {
                return Some(i);
            }
            i += 1;
            continue;
        }
        let in_quote = is_quote(top);
        let other_quote = in_quote && is_quote(c) && c != top;
        if closer(c).is_some() && (!in_quote || other_quote) {
            open.push(c);
        }
        i += 1;
    }
    None
}

/// A line with `^` under each of the given columns.
pub fn marker_line(columns: &[usize]) -> String {
    let width = columns.iter().max().map_or(0, |m| m + 1);
    (0..width)
        .map(|i| if columns.contains(&i) { '^' } else { ' ' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_skips_escaped() {
        assert_eq!(find_open("a\\$b$", '$', 0), Some(4));
    }

    #[test]
    fn open_skips_quoted() {
        assert_eq!(find_open("'a;b' ; c", ';', 0), Some(6));
        assert_eq!(find_open("\"x(\" (y)", '(', 0), Some(5));
    }

    #[test]
    fn open_unterminated_quote_not_found() {
        assert_eq!(find_open("'abc ; d", ';', 0), None);
    }

    #[test]
    fn open_respects_start() {
        assert_eq!(find_open("(a)(b)", '(', 1), Some(3));
        assert_eq!(find_open("abc", 'c', 5), None);
    }

    #[test]
    fn match_simple_paren() {
        assert_eq!(find_match("(abc)", '(', 0), Some(4));
    }

    #[test]
    fn match_nested_mixed() {
        let s = "( {a[b]} (c) )";
        assert_eq!(find_match(s, '(', 0), Some(13));
        assert_eq!(find_match(s, '{', 2), Some(7));
    }

    #[test]
    fn match_ignores_closer_in_quotes() {
        let s = "( \")\" ')' )";
        assert_eq!(find_match(s, '(', 0), Some(10));
    }

    #[test]
    fn match_in_quote_ignores_brackets() {
        assert_eq!(find_match("\"(\"", '"', 0), Some(2));
    }

    #[test]
    fn match_other_quote_nests() {
        assert_eq!(find_match("\"a'x'b\"", '"', 0), Some(6));
        // A " inside the nested ' region opens yet another region.
        assert_eq!(find_match("\"a'\"b\"'\"", '"', 0), Some(7));
    }

    #[test]
    fn match_escaped_closer_skipped() {
        assert_eq!(find_match("(a\\)b)", '(', 0), Some(5));
    }

    #[test]
    fn match_unterminated() {
        assert_eq!(find_match("(abc", '(', 0), None);
        assert_eq!(find_match("((a)", '(', 0), None);
        assert_eq!(find_match("(a\\", '(', 0), None);
    }

    #[test]
    fn match_not_a_delimiter_skips_one() {
        assert_eq!(find_match("abc", 'a', 0), Some(1));
        assert_eq!(find_match("x<y>", '<', 1), Some(2));
    }

    #[test]
    fn match_deep_nesting_does_not_overflow() {
        let depth = 100_000;
        let s = format!("{}{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(find_match(&s, '(', 0), Some(2 * depth - 1));
    }

    #[test]
    fn marker_under_columns() {
        assert_eq!(marker_line(&[1, 4]), " ^  ^");
        assert_eq!(marker_line(&[]), "");
    }
}
