//! Error-tolerant lowering through tree-sitter
//!
//! Used when swc rejects the buffer outright. tree-sitter always yields a
//! tree and confines each syntax error to an `ERROR` node, so functions
//! before and after a broken region keep their real positions.
//!
//! Node kinds kept, for both the JavaScript and TypeScript grammars:
//! - `function_declaration`, `generator_function_declaration`
//! - `function_expression`, `generator_function`
//! - `arrow_function`
//! - `method_definition` (methods, accessors, class constructors)
//! - `return_statement`
//!
//! Everything else, `ERROR` nodes included, is flattened away.

use crate::ast::{Expression, FunctionForm, FunctionShape, NodeKind, Param, ReturnShape, SyntaxNode};
use crate::lower::text_extent;
use crate::position::{line_start_offset, ByteSpan, LineColumn, SourceLocation};
use anyhow::{Context, Result};
use tree_sitter::{Language, Node, Parser, Point};

/// Grammar matching the file extension; JSX is part of the JavaScript grammar
fn language_for_file(filename: &str) -> Language {
    if filename.ends_with(".tsx") {
        tree_sitter_typescript::LANGUAGE_TSX.into()
    } else if filename.ends_with(".ts") || filename.ends_with(".mts") || filename.ends_with(".cts") {
        tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
    } else {
        tree_sitter_javascript::LANGUAGE.into()
    }
}

/// Parse `text` with tree-sitter and lower it into an annotation tree
///
/// `text` may extend `src` with appended closers; the program node still
/// covers exactly `src`.
pub fn lower_tolerant(src: &str, text: &str, filename: &str) -> Result<SyntaxNode> {
    let mut parser = Parser::new();
    parser
        .set_language(&language_for_file(filename))
        .context("Failed to set tree-sitter language")?;

    let tree = parser
        .parse(text, None)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse source file: {}", filename))?;
    let root = tree.root_node();
    if root.has_error() {
        tracing::debug!(filename, "tree-sitter skipped erroneous regions");
    }

    let lowerer = CstLowerer { text };
    let mut program = SyntaxNode::new(NodeKind::Program, ByteSpan::new(0, src.len()), text_extent(src));
    lowerer.lower_children(root, &mut program.children);
    Ok(program)
}

struct CstLowerer<'a> {
    text: &'a str,
}

impl CstLowerer<'_> {
    fn source_text(&self, node: Node) -> String {
        node.utf8_text(self.text.as_bytes())
            .unwrap_or_default()
            .to_string()
    }

    /// tree-sitter columns count bytes; the tree uses char columns
    fn line_column(&self, point: Point, byte: usize) -> LineColumn {
        let line_start = line_start_offset(self.text, point.row).unwrap_or(0);
        let column = self
            .text
            .get(line_start..byte)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(point.column);
        LineColumn::new(point.row as u32 + 1, column as u32)
    }

    fn syntax_node(&self, node: Node, kind: NodeKind) -> SyntaxNode {
        SyntaxNode::new(
            kind,
            ByteSpan::new(node.start_byte(), node.end_byte()),
            SourceLocation::new(
                self.line_column(node.start_position(), node.start_byte()),
                self.line_column(node.end_position(), node.end_byte()),
            ),
        )
    }

    /// Lower the kept descendants of `node` into `out`, in source order
    fn lower_children(&self, node: Node, out: &mut Vec<SyntaxNode>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.lower_node(child, out);
        }
    }

    fn lower_node(&self, node: Node, out: &mut Vec<SyntaxNode>) {
        let kind = match node.kind() {
            "return_statement" => Some(NodeKind::ReturnStatement(ReturnShape {
                argument: self.return_argument(node),
            })),
            other => self.function_shape(node, other).map(NodeKind::Function),
        };
        match kind {
            Some(kind) => {
                let mut lowered = self.syntax_node(node, kind);
                self.lower_children(node, &mut lowered.children);
                out.push(lowered);
            }
            None => self.lower_children(node, out),
        }
    }

    fn function_shape(&self, node: Node, kind: &str) -> Option<FunctionShape> {
        let form = match kind {
            "function_declaration" | "generator_function_declaration" => FunctionForm::Declaration,
            "function_expression" | "function" | "generator_function" => FunctionForm::Expression,
            "arrow_function" => FunctionForm::Arrow,
            "method_definition" => self.method_form(node),
            _ => return None,
        };
        let params = match node.child_by_field_name("parameters") {
            Some(list) => self.params(list),
            // `x => ...` has a single bare parameter
            None => node
                .child_by_field_name("parameter")
                .map(|param| vec![self.param(param)])
                .unwrap_or_default(),
        };
        Some(FunctionShape {
            form,
            name: self.name(node),
            params,
        })
    }

    fn name(&self, node: Node) -> Option<String> {
        let name = node.child_by_field_name("name")?;
        match name.kind() {
            "computed_property_name" => None,
            "string" => Some(
                self.source_text(name)
                    .trim_matches(|c| c == '"' || c == '\'')
                    .to_string(),
            ),
            _ => Some(self.source_text(name)).filter(|text| !text.is_empty()),
        }
    }

    fn method_form(&self, node: Node) -> FunctionForm {
        let in_class = node.parent().is_some_and(|parent| parent.kind() == "class_body");
        if in_class && self.name(node).as_deref() == Some("constructor") {
            return FunctionForm::Constructor;
        }
        let mut cursor = node.walk();
        let accessor = node.children(&mut cursor).find_map(|child| match child.kind() {
            "get" => Some(FunctionForm::Getter),
            "set" => Some(FunctionForm::Setter),
            _ => None,
        });
        accessor.unwrap_or(FunctionForm::Method)
    }

    fn params(&self, list: Node) -> Vec<Param> {
        let mut cursor = list.walk();
        let params: Vec<Param> = list
            .named_children(&mut cursor)
            .filter(|param| !param.is_missing() && !matches!(param.kind(), "comment" | "ERROR"))
            .map(|param| self.param(param))
            .collect();
        params
    }

    fn param(&self, node: Node) -> Param {
        match node.kind() {
            "identifier" => Param::Identifier {
                name: self.source_text(node),
            },
            "assignment_pattern" => match node.child_by_field_name("left") {
                Some(left) if left.kind() == "identifier" => Param::Identifier {
                    name: self.source_text(left),
                },
                _ => self.unrecognized_param(node),
            },
            // TypeScript wraps every parameter together with its annotation
            "required_parameter" | "optional_parameter" => match node.child_by_field_name("pattern") {
                Some(pattern) if pattern.kind() == "identifier" => Param::Identifier {
                    name: self.source_text(pattern),
                },
                Some(pattern) => self.unrecognized_param(pattern),
                None => self.unrecognized_param(node),
            },
            _ => self.unrecognized_param(node),
        }
    }

    fn unrecognized_param(&self, node: Node) -> Param {
        Param::Unrecognized {
            source: self.source_text(node),
        }
    }

    fn return_argument(&self, node: Node) -> Option<Expression> {
        let mut cursor = node.walk();
        let argument = node
            .named_children(&mut cursor)
            .find(|child| !matches!(child.kind(), "comment" | "ERROR"));
        argument
            .filter(|argument| !argument.is_missing())
            .map(|argument| self.expression(argument))
    }

    fn expression(&self, node: Node) -> Expression {
        match node.kind() {
            "parenthesized_expression" => {
                let mut cursor = node.walk();
                let inner = node
                    .named_children(&mut cursor)
                    .find(|child| child.kind() != "comment");
                match inner {
                    Some(inner) => self.expression(inner),
                    None => self.unrecognized_expression(node),
                }
            }
            "identifier" | "undefined" => Expression::Identifier {
                name: self.source_text(node),
            },
            "string" | "number" | "true" | "false" | "null" | "regex" => Expression::Literal {
                raw: self.source_text(node),
            },
            _ => self.unrecognized_expression(node),
        }
    }

    fn unrecognized_expression(&self, node: Node) -> Expression {
        Expression::Unrecognized {
            source: self.source_text(node),
        }
    }
}
