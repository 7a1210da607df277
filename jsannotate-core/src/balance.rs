//! Lexical bracket balancing for half-typed source
//!
//! Computes the closers needed to terminate every bracket, string and
//! template literal still open at the end of a text. Comments and literal
//! contents are skipped. Regular expression literals are not recognised,
//! so brackets inside a regex may skew the result.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
    Paren,
    Bracket,
    Brace,
    /// `${` inside a template literal
    TemplateExpr,
    Template,
}

impl Open {
    fn closer(self) -> &'static str {
        match self {
            Open::Paren => ")",
            Open::Bracket => "]",
            Open::Brace | Open::TemplateExpr => "}",
            Open::Template => "`",
        }
    }
}

/// Closers that terminate every construct left open in `src`, innermost first
pub fn missing_closers(src: &str) -> String {
    let mut stack: Vec<Open> = Vec::new();
    let mut chars = src.chars().peekable();
    let mut open_quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(quote) = open_quote {
            match c {
                '\\' => {
                    chars.next();
                }
                '\n' => open_quote = None, // unterminated string ends at the line
                _ if c == quote => open_quote = None,
                _ => {}
            }
            continue;
        }

        if stack.last() == Some(&Open::Template) {
            match c {
                '\\' => {
                    chars.next();
                }
                '`' => {
                    stack.pop();
                }
                '$' if chars.peek() == Some(&'{') => {
                    chars.next();
                    stack.push(Open::TemplateExpr);
                }
                _ => {}
            }
            continue;
        }

        match c {
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
            }
            '\'' | '"' => open_quote = Some(c),
            '`' => stack.push(Open::Template),
            '(' => stack.push(Open::Paren),
            '[' => stack.push(Open::Bracket),
            '{' => stack.push(Open::Brace),
            ')' | ']' | '}' => close(&mut stack, c),
            _ => {}
        }
    }

    let mut closers = String::new();
    if let Some(quote) = open_quote {
        closers.push(quote);
    }
    for open in stack.iter().rev() {
        closers.push_str(open.closer());
    }
    closers
}

/// Pop the matching opener; stray closers are ignored
fn close(stack: &mut Vec<Open>, c: char) {
    let matches = |open: &Open| match c {
        ')' => *open == Open::Paren,
        ']' => *open == Open::Bracket,
        _ => matches!(open, Open::Brace | Open::TemplateExpr),
    };
    if let Some(pos) = stack.iter().rposition(matches) {
        // Anything opened after the match was never closed on its own.
        stack.truncate(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_text_needs_nothing() {
        assert_eq!(missing_closers("function f(a) { return [a]; }"), "");
        assert_eq!(missing_closers(""), "");
    }

    #[test]
    fn test_unclosed_function_body() {
        let src = "function add(a, b) {\n    if (a) {\n        return a;\n";
        assert_eq!(missing_closers(src), "}}");
    }

    #[test]
    fn test_innermost_first() {
        assert_eq!(missing_closers("foo({ a: [1, (2"), ")]})");
    }

    #[test]
    fn test_brackets_in_strings_and_comments_are_ignored() {
        let src = "var s = '{(['; // {\n/* ( */ var t = \"}\";";
        assert_eq!(missing_closers(src), "");
    }

    #[test]
    fn test_unterminated_string_is_closed() {
        assert_eq!(missing_closers("f(\"abc"), "\")");
    }

    #[test]
    fn test_template_literal_with_expression() {
        assert_eq!(missing_closers("var s = `a ${ {b: 1} } c`;"), "");
        assert_eq!(missing_closers("var s = `a ${ call("), ")}`");
        assert_eq!(missing_closers("var s = `open"), "`");
    }

    #[test]
    fn test_stray_closer_is_ignored() {
        assert_eq!(missing_closers("a) { b"), "}");
    }
}
