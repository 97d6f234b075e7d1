//! Word-level helpers for recognising command keywords and their arguments.

/// The first whitespace-delimited word of `text`.
pub fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

/// If `line`'s first word is exactly `keyword`, the text after it
/// (leading whitespace removed, possibly empty).
pub fn keyword_rest<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.starts_with(char::is_whitespace)
        .then(|| rest.trim_start())
}

/// Like [`keyword_rest`], but only when an argument follows the keyword.
pub fn keyword_arg<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    keyword_rest(line, keyword).filter(|rest| !rest.is_empty())
}

/// Byte index of the `(` in a `keyword(` or `keyword (` form.
///
/// Requires something after the parenthesis, so a bare `eval(` is not
/// recognised as an expression.
pub fn paren_form(line: &str, keyword: &str) -> Option<usize> {
    let rest = line.strip_prefix(keyword)?;
    let skipped = rest.len() - rest.trim_start().len();
    let open = keyword.len() + skipped;
    (line[open..].starts_with('(') && line.len() > open + 1).then_some(open)
}

/// Split `NAME=VALUE` at the first `=`.
///
/// The name is trimmed and the value loses its leading whitespace. Without an
/// `=` the whole text is the name and the value is empty.
pub fn split_assignment(text: &str) -> (&str, &str) {
    match text.split_once('=') {
        Some((name, value)) => (name.trim(), value.trim_start()),
        None => (text.trim(), ""),
    }
}

/// Tokenize module arguments into words using shlex (POSIX word splitting).
pub fn tokenize(command: &str) -> Vec<String> {
    shlex::split(command).unwrap_or_else(|| {
        // Fallback: simple whitespace splitting if shlex can't parse
        command.split_whitespace().map(String::from).collect()
    })
}
