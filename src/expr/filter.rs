/// Check `expr` against a deny list before evaluation.
///
/// Text inside single or double quotes is exempt. Returns the first denied
/// character found outside quotes.
///
/// This keeps identifiers other than the small set the evaluator knows about
/// out of expressions. It is a coarse screen, not a sandbox.
pub fn screen(expr: &str, deny: &str) -> Result<(), char> {
    let mut quote: Option<char> = None;
    for c in expr.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if deny.contains(c) => return Err(c),
            None => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DENY: &str = "_ghjkmpqsuvwyzGHIJKLMNOPQRSTUVWYZ";

    #[test]
    fn clean_arithmetic_passes() {
        assert_eq!(screen("1 + 2 * (3 - n)", DENY), Ok(()));
        assert_eq!(screen("int(x) == 3 and not 0", DENY), Ok(()));
        assert_eq!(screen("False", DENY), Err('s'));
    }

    #[test]
    fn first_denied_char_reported() {
        assert_eq!(screen("open('f')", DENY), Err('p'));
        assert_eq!(screen("__import__", DENY), Err('_'));
    }

    #[test]
    fn quoted_text_is_exempt() {
        assert_eq!(screen("'sys' + \"quit\"", DENY), Ok(()));
        assert_eq!(screen("\"it's\" + x", DENY), Ok(()));
    }

    #[test]
    fn unterminated_quote_hides_rest() {
        assert_eq!(screen("'abc sys", DENY), Ok(()));
    }
}
