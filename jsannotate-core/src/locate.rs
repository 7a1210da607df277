//! Forward node search from a byte offset
//!
//! Global invariants enforced:
//! - Depth-first, pre-order, children in source order
//! - A node is tested before its children are visited
//! - Subtrees that end before the offset are skipped
//! - Return statements never leak out of nested functions

use crate::ast::{NodeType, SyntaxNode};

/// Find the first node of `node_type` whose start is at or after `from_offset`
///
/// Traversal is depth-first in source order. When searching for
/// `ReturnStatement`, functions below `root` are not entered, so a nested
/// function's `return` is never attributed to the enclosing one. `root`
/// itself is tested like any other node and always entered, which lets
/// callers scope the search to a single function by passing it as the root.
///
/// Returns `None` when nothing matches; that is a normal outcome.
pub fn find_next_node_of_type(
    root: &SyntaxNode,
    from_offset: usize,
    node_type: NodeType,
) -> Option<&SyntaxNode> {
    search(root, from_offset, node_type, true)
}

fn search(
    node: &SyntaxNode,
    from_offset: usize,
    node_type: NodeType,
    is_root: bool,
) -> Option<&SyntaxNode> {
    if node.span.end < from_offset {
        return None;
    }
    if node.span.start >= from_offset && node.node_type() == Some(node_type) {
        return Some(node);
    }
    if !is_root && node_type == NodeType::ReturnStatement && node.is_function() {
        return None;
    }
    node.children
        .iter()
        .find_map(|child| search(child, from_offset, node_type, false))
}

/// First return statement of `function`, ignoring nested functions
pub fn first_return(function: &SyntaxNode) -> Option<&SyntaxNode> {
    find_next_node_of_type(function, 0, NodeType::ReturnStatement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expression, FunctionForm, FunctionShape, NodeKind, ReturnShape};
    use crate::position::{ByteSpan, LineColumn, SourceLocation};

    fn loc(line: u32) -> SourceLocation {
        SourceLocation::new(LineColumn::new(line, 0), LineColumn::new(line, 0))
    }

    fn function(name: &str, start: usize, end: usize, children: Vec<SyntaxNode>) -> SyntaxNode {
        let mut node = SyntaxNode::new(
            NodeKind::Function(FunctionShape {
                form: FunctionForm::Declaration,
                name: Some(name.to_string()),
                params: Vec::new(),
            }),
            ByteSpan::new(start, end),
            loc(1),
        );
        node.children = children;
        node
    }

    fn ret(value: &str, start: usize, end: usize) -> SyntaxNode {
        SyntaxNode::new(
            NodeKind::ReturnStatement(ReturnShape {
                argument: Some(Expression::Identifier {
                    name: value.to_string(),
                }),
            }),
            ByteSpan::new(start, end),
            loc(1),
        )
    }

    fn program(children: Vec<SyntaxNode>) -> SyntaxNode {
        let mut root = SyntaxNode::empty_program(1000);
        root.children = children;
        root
    }

    fn name_of(node: Option<&SyntaxNode>) -> Option<String> {
        node.and_then(|n| n.as_function()).and_then(|f| f.name.clone())
    }

    fn returned(node: Option<&SyntaxNode>) -> Option<Expression> {
        node.and_then(|n| n.as_return()).and_then(|r| r.argument.clone())
    }

    #[test]
    fn test_finds_first_function_at_or_after_offset() {
        let root = program(vec![
            function("a", 0, 20, vec![]),
            function("b", 30, 50, vec![]),
            function("c", 60, 80, vec![]),
        ]);
        assert_eq!(name_of(find_next_node_of_type(&root, 0, NodeType::Function)), Some("a".into()));
        assert_eq!(name_of(find_next_node_of_type(&root, 30, NodeType::Function)), Some("b".into()));
        assert_eq!(name_of(find_next_node_of_type(&root, 31, NodeType::Function)), Some("c".into()));
        assert_eq!(find_next_node_of_type(&root, 81, NodeType::Function), None);
    }

    #[test]
    fn test_outer_function_wins_over_nested_one() {
        let root = program(vec![function("outer", 10, 90, vec![function("inner", 20, 40, vec![])])]);
        assert_eq!(name_of(find_next_node_of_type(&root, 5, NodeType::Function)), Some("outer".into()));
    }

    #[test]
    fn test_descends_into_enclosing_function_after_its_start() {
        // Cursor inside `outer`, above `inner`.
        let root = program(vec![function("outer", 10, 90, vec![function("inner", 40, 60, vec![])])]);
        assert_eq!(name_of(find_next_node_of_type(&root, 30, NodeType::Function)), Some("inner".into()));
    }

    #[test]
    fn test_return_search_skips_nested_functions() {
        let outer = function(
            "outer",
            0,
            100,
            vec![function("inner", 10, 40, vec![ret("fromInner", 20, 35)]), ret("fromOuter", 50, 70)],
        );
        assert_eq!(
            returned(first_return(&outer)),
            Some(Expression::Identifier { name: "fromOuter".into() })
        );
    }

    #[test]
    fn test_return_search_without_direct_return() {
        let outer = function("outer", 0, 100, vec![function("inner", 10, 40, vec![ret("x", 20, 35)])]);
        assert_eq!(first_return(&outer), None);
    }

    #[test]
    fn test_return_search_finds_first_in_document_order() {
        let outer = function("outer", 0, 100, vec![ret("first", 10, 20), ret("second", 30, 40)]);
        assert_eq!(
            returned(first_return(&outer)),
            Some(Expression::Identifier { name: "first".into() })
        );
    }

    #[test]
    fn test_root_is_tested_too() {
        let only = function("only", 5, 10, vec![]);
        assert_eq!(name_of(find_next_node_of_type(&only, 0, NodeType::Function)), Some("only".into()));
        assert_eq!(find_next_node_of_type(&only, 6, NodeType::Function), None);
    }
}
