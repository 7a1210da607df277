//! Owned syntax tree consumed by the annotation pipeline
//!
//! The swc AST is lowered into this tree once per invocation (see `lower`).
//! Only the node kinds the pipeline reads are kept; everything else is
//! flattened so that the remaining nodes attach to their nearest kept ancestor.
//!
//! Global invariants enforced:
//! - Children are stored in source order
//! - Spans and locations always refer to the original buffer text
//! - The tree is never mutated after lowering

use crate::position::{ByteSpan, SourceLocation};
use serde::{Deserialize, Serialize};

/// Type filter accepted by the node locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Any function-like node: declarations, expressions, arrows, methods
    Function,
    ReturnStatement,
}

/// Syntactic form a function was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionForm {
    Declaration,
    Expression,
    Arrow,
    Method,
    Constructor,
    Getter,
    Setter,
}

/// A single declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Param {
    /// Plain binding, or a defaulted plain binding (`a = 1` yields `a`)
    Identifier { name: String },
    /// Destructuring, rest and other shapes, kept as raw source text
    Unrecognized { source: String },
}

impl Param {
    /// Text to print for this parameter
    pub fn display_name(&self) -> &str {
        match self {
            Param::Identifier { name } => name,
            Param::Unrecognized { source } => source,
        }
    }
}

/// Returned expression, reduced to the shapes the extractor understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Expression {
    Identifier { name: String },
    /// Literal constant with its exact source text (`0`, `"x"`, `null`, `/re/`)
    Literal { raw: String },
    Unrecognized { source: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionShape {
    pub form: FunctionForm,
    pub name: Option<String>,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnShape {
    pub argument: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Program,
    Function(FunctionShape),
    ReturnStatement(ReturnShape),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: ByteSpan,
    pub loc: SourceLocation,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Create a leaf node
    pub fn new(kind: NodeKind, span: ByteSpan, loc: SourceLocation) -> Self {
        SyntaxNode {
            kind,
            span,
            loc,
            children: Vec::new(),
        }
    }

    /// Empty program covering `len` bytes, used when nothing could be parsed
    pub fn empty_program(len: usize) -> Self {
        SyntaxNode::new(
            NodeKind::Program,
            ByteSpan::new(0, len),
            SourceLocation::default(),
        )
    }

    /// Filter category this node answers to, if any
    pub fn node_type(&self) -> Option<NodeType> {
        match self.kind {
            NodeKind::Program => None,
            NodeKind::Function(_) => Some(NodeType::Function),
            NodeKind::ReturnStatement(_) => Some(NodeType::ReturnStatement),
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, NodeKind::Function(_))
    }

    pub fn as_function(&self) -> Option<&FunctionShape> {
        match &self.kind {
            NodeKind::Function(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_return(&self) -> Option<&ReturnShape> {
        match &self.kind {
            NodeKind::ReturnStatement(shape) => Some(shape),
            _ => None,
        }
    }
}
