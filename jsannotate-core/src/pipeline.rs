//! Annotation pipeline - ties together parsing, node search, signature
//! extraction and comment synthesis
//!
//! Global invariants enforced:
//! - One synchronous pass per call; the text is reparsed every time
//! - The input text is never modified; the caller applies the insertion
//! - "Nothing to annotate" is `None`, never an error

use crate::ast::{NodeType, SyntaxNode};
use crate::locate;
use crate::parser;
use crate::position::{self, EditorPosition, LineEnding, SourceLocation};
use crate::render;
use crate::signature::{self, SignatureRecord};
use serde::{Deserialize, Serialize};

/// Target location, indentation and signature of one annotate attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub location: SourceLocation,
    /// Whitespace placed before every line of the block
    pub prefix: String,
    pub signature: SignatureRecord,
}

/// A ready-to-apply edit produced by a successful annotate attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insertion {
    /// Where the block goes: column 0 of the function's own line
    pub position: EditorPosition,
    /// The comment block, terminated by the buffer's line ending
    pub text: String,
    /// Cursor after insertion: end of the `@desc` line
    pub cursor: EditorPosition,
    pub annotation: Annotation,
}

/// Annotate the function that follows `trigger_line`
///
/// `text` is the full buffer with the trigger snippet already removed, and
/// `trigger_line` is the 0-based editor line it was typed on. The search
/// starts at the beginning of that line. A function is accepted only when
/// its 1-based start line equals `trigger_line + 2`, which means it begins
/// on the line directly below the trigger.
///
/// `filename` only selects the parser syntax (`.ts`, `.jsx`, ...).
pub fn annotate(text: &str, trigger_line: usize, filename: &str) -> Option<Insertion> {
    let from_offset = position::line_start_offset(text, trigger_line)?;
    let parsed = parser::parse_tolerant(text, filename);

    let Some(function) = locate::find_next_node_of_type(&parsed.root, from_offset, NodeType::Function) else {
        tracing::debug!(trigger_line, "no function after trigger line");
        return None;
    };

    let function_line = function.loc.start.line as usize;
    if function_line != trigger_line + 2 {
        tracing::debug!(
            trigger_line,
            function_line,
            "next function is not directly below the trigger line"
        );
        return None;
    }

    let annotation = build_annotation(text, function)?;
    Some(insertion_for(text, annotation))
}

/// Collect location, indentation prefix and signature for a located function
pub fn build_annotation(text: &str, function: &SyntaxNode) -> Option<Annotation> {
    let editor_line = (function.loc.start.line as usize).checked_sub(1)?;
    let declaration_line = position::line_text(text, editor_line)?;

    Some(Annotation {
        location: function.loc,
        prefix: position::indentation_prefix(declaration_line),
        signature: signature::extract(function),
    })
}

/// Render an annotation and compute where it goes and where the cursor lands
pub fn insertion_for(text: &str, annotation: Annotation) -> Insertion {
    let line = (annotation.location.start.line as usize).saturating_sub(1);
    let block = render::render(&annotation.signature, &annotation.prefix, LineEnding::detect(text));

    Insertion {
        position: EditorPosition::new(line, 0),
        cursor: EditorPosition::new(line + 1, render::description_line_width(&annotation.prefix)),
        text: block,
        annotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_function_below_trigger() {
        let text = "\nfunction add(a, b) {\n    return a + b;\n}\n";
        let insertion = annotate(text, 0, "test.js").expect("should annotate");
        assert_eq!(insertion.position, EditorPosition::new(1, 0));
        assert_eq!(insertion.cursor, EditorPosition::new(2, 9));
        assert_eq!(insertion.text, "/**\n * @desc \n * @param {type} a\n * @param {type} b\n */\n");
        assert_eq!(insertion.annotation.signature.name.as_deref(), Some("add"));
    }

    #[test]
    fn test_annotate_rejects_function_further_down() {
        let text = "\n\nfunction add(a, b) {}\n";
        assert_eq!(annotate(text, 0, "test.js"), None);
    }

    #[test]
    fn test_annotate_ignores_function_above_trigger() {
        let text = "function before() {}\n\nvar x = 1;\n";
        assert_eq!(annotate(text, 1, "test.js"), None);
    }

    #[test]
    fn test_annotate_trigger_line_out_of_range() {
        assert_eq!(annotate("function f() {}", 5, "test.js"), None);
    }

    #[test]
    fn test_annotate_uses_function_indentation_not_trigger_indentation() {
        let text = "function outer() {\n\n        function inner(x) {\n            return x;\n        }\n}\n";
        let insertion = annotate(text, 1, "test.js").expect("should annotate");
        assert_eq!(insertion.annotation.prefix, "        ");
        assert!(insertion.text.lines().all(|l| l.starts_with("        ")));
        assert_eq!(insertion.cursor, EditorPosition::new(3, 17));
    }

    #[test]
    fn test_annotate_keeps_crlf() {
        let text = "\r\nfunction f(a) {\r\n  return a;\r\n}\r\n";
        let insertion = annotate(text, 0, "test.js").expect("should annotate");
        assert!(insertion.text.ends_with(" */\r\n"));
        assert!(insertion.text.contains("@returns {type}\r\n"));
    }

    #[test]
    fn test_annotate_typescript_parameters() {
        let text = "\nexport function scale(value: number, factor = 2): number {\n  return value;\n}\n";
        let insertion = annotate(text, 0, "test.ts").expect("should annotate");
        assert_eq!(insertion.annotation.signature.params, vec!["value", "factor"]);
        assert!(insertion.annotation.signature.has_return());
    }
}
