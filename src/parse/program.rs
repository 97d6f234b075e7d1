//! Splitting raw text into a [`Program`] of single-line commands.

/// Split raw text into commands.
///
/// Every newline separates commands, even inside quotes. An unescaped `;`
/// outside quotes separates commands too. Quote state is tracked over the
/// whole text in one pass, so a quote left open on one line still guards
/// semicolons on the next. Empty commands are kept so that cursor positions
/// stay stable; the engine skips them.
///
/// A quote opens with `"` or `'` and closes only on the same character.
/// An escape is copied verbatim as a two-character unit, except that an
/// escaped newline still separates.
pub fn split_commands(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            parts.push(std::mem::take(&mut buf));
            continue;
        }
        if c == '\\' {
            buf.push(c);
            if let Some(next) = chars.next_if(|n| *n != '\n') {
                buf.push(next);
            }
            continue;
        }
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            buf.push(c);
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                buf.push(c);
            }
            ';' => parts.push(std::mem::take(&mut buf)),
            _ => buf.push(c),
        }
    }
    parts.push(buf);
    parts
}

/// The ordered command lines of one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    lines: Vec<String>,
}

impl Program {
    /// Split `text` into a program.
    pub fn parse(text: &str) -> Self {
        Self {
            lines: split_commands(text),
        }
    }

    /// Split `text` into a program that always ends in `quit`.
    pub fn with_quit(text: &str) -> Self {
        Self::parse(&format!("{text}\nquit"))
    }

    pub fn get(&self, cursor: usize) -> Option<&str> {
        self.lines.get(cursor).map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Index of the first line containing `LABEL <name>`.
    ///
    /// This is a substring search: a label whose name is a prefix of another
    /// (`LABEL lo` vs `LABEL loop`) matches whichever line comes first.
    pub fn find_label(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        let marker = format!("LABEL {name}");
        self.lines.iter().position(|line| line.contains(&marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_semicolons() {
        assert_eq!(split_commands("a ; b;c"), vec!["a ", " b", "c"]);
    }

    #[test]
    fn split_newlines() {
        assert_eq!(split_commands("a\nb;c\n"), vec!["a", "b", "c", ""]);
    }

    #[test]
    fn quoted_semicolon_kept() {
        assert_eq!(
            split_commands("echo 'a;b' ; echo \"c;d\""),
            vec!["echo 'a;b' ", " echo \"c;d\""]
        );
    }

    #[test]
    fn mixed_quotes_do_not_close_each_other() {
        assert_eq!(split_commands("echo \"it's;ok\";x"), vec!["echo \"it's;ok\"", "x"]);
    }

    #[test]
    fn escaped_semicolon_kept_verbatim() {
        assert_eq!(split_commands("echo a\\;b;c"), vec!["echo a\\;b", "c"]);
    }

    #[test]
    fn escaped_quote_does_not_open() {
        assert_eq!(split_commands("echo \\';x"), vec!["echo \\'", "x"]);
    }

    #[test]
    fn newline_splits_inside_quotes() {
        assert_eq!(split_commands("echo 'a\nb;c'"), vec!["echo 'a", "b;c'"]);
    }

    #[test]
    fn open_quote_carries_to_next_line() {
        assert_eq!(
            split_commands("echo it's\necho a;b"),
            vec!["echo it's", "echo a;b"]
        );
    }

    #[test]
    fn escaped_newline_still_splits() {
        assert_eq!(split_commands("echo a\\\nb;c"), vec!["echo a\\", "b", "c"]);
    }

    #[test]
    fn with_quit_appends() {
        let p = Program::with_quit("echo hi");
        assert_eq!(p.lines(), &["echo hi".to_string(), "quit".to_string()]);
    }

    #[test]
    fn label_lookup() {
        let p = Program::parse("echo a ; # LABEL top ; echo b ; LABEL end");
        assert_eq!(p.find_label("top"), Some(1));
        assert_eq!(p.find_label("end"), Some(3));
        assert_eq!(p.find_label("missing"), None);
        assert_eq!(p.find_label(""), None);
    }

    #[test]
    fn label_prefix_matches_first_line() {
        let p = Program::parse("LABEL loop ; LABEL lo");
        assert_eq!(p.find_label("lo"), Some(0));
    }
}
