//! Signature extraction from a located function node
//!
//! Never fails: a function with no recoverable details still yields a record
//! with no name, no params and no return descriptor.

use crate::ast::{Expression, SyntaxNode};
use crate::locate;
use serde::{Deserialize, Serialize};

/// Normalized summary of a function's name, parameters and return value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// Declared name; `None` for anonymous functions and arrows
    pub name: Option<String>,
    /// Parameter names in declaration order, duplicates kept
    pub params: Vec<String>,
    /// Source text of the returned identifier or literal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_descriptor: Option<String>,
}

impl SignatureRecord {
    pub fn has_return(&self) -> bool {
        self.return_descriptor.is_some()
    }
}

/// Extract the signature of a function node
///
/// The return descriptor comes from the function's first own `return`
/// statement. It is only recovered for plain identifiers and literals; any
/// other argument shape, a bare `return;`, or no `return` at all leaves it
/// empty. Non-function nodes yield an empty record.
pub fn extract(function: &SyntaxNode) -> SignatureRecord {
    let Some(shape) = function.as_function() else {
        return SignatureRecord::default();
    };

    let params = shape
        .params
        .iter()
        .map(|param| param.display_name().to_string())
        .collect();

    let return_descriptor = locate::first_return(function)
        .and_then(|node| node.as_return())
        .and_then(|ret| ret.argument.as_ref())
        .and_then(|argument| match argument {
            Expression::Identifier { name } => Some(name.clone()),
            Expression::Literal { raw } => Some(raw.clone()),
            Expression::Unrecognized { .. } => None,
        })
        .filter(|descriptor| !descriptor.is_empty());

    SignatureRecord {
        name: shape.name.clone(),
        params,
        return_descriptor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeType;
    use crate::parser;

    fn signature_of_first(src: &str) -> SignatureRecord {
        let parsed = parser::parse_tolerant(src, "test.js");
        let function = locate::find_next_node_of_type(&parsed.root, 0, NodeType::Function)
            .expect("source should contain a function");
        extract(function)
    }

    #[test]
    fn test_extract_named_function() {
        let sig = signature_of_first("function add(a, b) { return a; }");
        assert_eq!(sig.name.as_deref(), Some("add"));
        assert_eq!(sig.params, vec!["a", "b"]);
        assert_eq!(sig.return_descriptor.as_deref(), Some("a"));
    }

    #[test]
    fn test_extract_preserves_order_and_duplicates() {
        let sig = signature_of_first("function f(c, a, b, a) {}");
        assert_eq!(sig.params, vec!["c", "a", "b", "a"]);
    }

    #[test]
    fn test_extract_anonymous_function_expression() {
        let sig = signature_of_first("var handler = function (event) {\n  event.stop();\n};");
        assert_eq!(sig.name, None);
        assert_eq!(sig.params, vec!["event"]);
        assert!(!sig.has_return());
    }

    #[test]
    fn test_extract_literal_return() {
        assert_eq!(
            signature_of_first("function f() { return 42; }").return_descriptor.as_deref(),
            Some("42")
        );
        assert_eq!(
            signature_of_first("function f() { return null; }").return_descriptor.as_deref(),
            Some("null")
        );
        assert_eq!(
            signature_of_first("function f() { return \"\"; }").return_descriptor.as_deref(),
            Some("\"\"")
        );
    }

    #[test]
    fn test_extract_bare_return_has_no_descriptor() {
        assert!(!signature_of_first("function f(a) { if (a) { return; } }").has_return());
    }

    #[test]
    fn test_extract_complex_return_has_no_descriptor() {
        assert!(!signature_of_first("function f(a, b) { return a + b; }").has_return());
        assert!(!signature_of_first("function f(o) { return o.value; }").has_return());
        assert!(!signature_of_first("function f() { return g(); }").has_return());
        assert!(!signature_of_first("function f() { return `t`; }").has_return());
    }

    #[test]
    fn test_extract_return_inside_nested_block() {
        let sig = signature_of_first("function f(xs) {\n  for (var i = 0; i < 1; i++) {\n    if (xs) { return xs; }\n  }\n}");
        assert_eq!(sig.return_descriptor.as_deref(), Some("xs"));
    }

    #[test]
    fn test_extract_ignores_nested_function_return() {
        let src = "function outer(cb) {\n  var inner = function () { return cb; };\n  inner();\n}";
        assert!(!signature_of_first(src).has_return());
    }

    #[test]
    fn test_extract_arrow_with_expression_body_has_no_return() {
        let sig = signature_of_first("const double = (n) => n * 2;");
        assert_eq!(sig.params, vec!["n"]);
        assert!(!sig.has_return());
    }

    #[test]
    fn test_extract_non_function_node() {
        let root = parser::parse_tolerant("var a = 1;", "test.js").root;
        assert_eq!(extract(&root), SignatureRecord::default());
    }
}
