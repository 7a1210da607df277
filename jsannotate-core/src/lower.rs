//! Lowering from the swc AST into the owned annotation tree
//!
//! Supported function constructs:
//! - Function declarations (`FnDecl`)
//! - Function expressions (`FnExpr`), including `export default function`
//! - Arrow functions (`ArrowExpr`)
//! - Class methods, private methods, getters and setters (`ClassMethod`, `PrivateMethod`)
//! - Class constructors (`Constructor`)
//! - Object literal methods, getters and setters (`MethodProp`, `GetterProp`, `SetterProp`)
//!
//! Return statements are kept as well. Every other node is flattened away.

use crate::ast::{self, FunctionForm, FunctionShape, NodeKind, ReturnShape, SyntaxNode};
use crate::position::{byte_span, line_count, source_location, ByteSpan, LineColumn, SourceLocation};
use swc_common::{BytePos, SourceMap, Span, Spanned};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};

/// Lower a parsed program into an owned tree rooted at a `Program` node
///
/// `src` must be the exact text the program was parsed from, and
/// `file_start` the start position of its source file in `source_map`.
pub fn lower_program(
    program: &Program,
    src: &str,
    source_map: &SourceMap,
    file_start: BytePos,
) -> SyntaxNode {
    let root = SyntaxNode::new(NodeKind::Program, ByteSpan::new(0, src.len()), text_extent(src));

    let mut lowerer = Lowerer {
        src,
        source_map,
        file_start,
        stack: vec![root],
    };
    program.visit_with(&mut lowerer);

    // Only the root is left once every enter/leave pair has run.
    let mut stack = lowerer.stack;
    while stack.len() > 1 {
        attach_top(&mut stack);
    }
    stack
        .pop()
        .unwrap_or_else(|| SyntaxNode::empty_program(src.len()))
}

/// Location covering the whole text, from 1:0 to the end of the last line
pub(crate) fn text_extent(src: &str) -> SourceLocation {
    let last_line = src.rsplit('\n').next().unwrap_or_default();
    SourceLocation::new(
        LineColumn::new(1, 0),
        LineColumn::new(line_count(src) as u32, last_line.chars().count() as u32),
    )
}

/// Pop the innermost open node and append it to its parent
fn attach_top(stack: &mut Vec<SyntaxNode>) {
    if let Some(node) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(node);
        }
    }
}

struct Lowerer<'a> {
    src: &'a str,
    source_map: &'a SourceMap,
    file_start: BytePos,
    stack: Vec<SyntaxNode>,
}

impl Lowerer<'_> {
    fn enter(&mut self, kind: NodeKind, span: Span) {
        self.stack.push(SyntaxNode::new(
            kind,
            byte_span(span, self.file_start),
            source_location(span, self.source_map),
        ));
    }

    fn leave(&mut self) {
        attach_top(&mut self.stack);
    }

    fn enter_function(
        &mut self,
        form: FunctionForm,
        name: Option<String>,
        params: Vec<ast::Param>,
        span: Span,
    ) {
        self.enter(NodeKind::Function(FunctionShape { form, name, params }), span);
    }

    fn source_text(&self, span: Span) -> String {
        byte_span(span, self.file_start)
            .slice(self.src)
            .unwrap_or_default()
            .to_string()
    }

    fn param(&self, pat: &Pat) -> ast::Param {
        match pat {
            Pat::Ident(binding) => ast::Param::Identifier {
                name: binding.id.sym.to_string(),
            },
            Pat::Assign(assign) => match &*assign.left {
                Pat::Ident(binding) => ast::Param::Identifier {
                    name: binding.id.sym.to_string(),
                },
                _ => ast::Param::Unrecognized {
                    source: self.source_text(assign.span),
                },
            },
            other => ast::Param::Unrecognized {
                source: self.source_text(other.span()),
            },
        }
    }

    fn params(&self, params: &[Param]) -> Vec<ast::Param> {
        params.iter().map(|p| self.param(&p.pat)).collect()
    }

    fn expression(&self, expr: &Expr) -> ast::Expression {
        match expr {
            Expr::Paren(paren) => self.expression(&paren.expr),
            Expr::Ident(ident) => ast::Expression::Identifier {
                name: ident.sym.to_string(),
            },
            Expr::Lit(lit) => ast::Expression::Literal {
                raw: self.source_text(lit.span()),
            },
            other => ast::Expression::Unrecognized {
                source: self.source_text(other.span()),
            },
        }
    }
}

fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(str_lit) => Some(str_lit.value.to_atom_lossy().to_string()),
        PropName::Num(num) => Some(num.to_string()),
        _ => None,
    }
}

fn method_form(kind: MethodKind) -> FunctionForm {
    match kind {
        MethodKind::Method => FunctionForm::Method,
        MethodKind::Getter => FunctionForm::Getter,
        MethodKind::Setter => FunctionForm::Setter,
    }
}

impl Visit for Lowerer<'_> {
    fn visit_fn_decl(&mut self, decl: &FnDecl) {
        let params = self.params(&decl.function.params);
        self.enter_function(
            FunctionForm::Declaration,
            Some(decl.ident.sym.to_string()),
            params,
            decl.function.span,
        );
        decl.visit_children_with(self);
        self.leave();
    }

    fn visit_fn_expr(&mut self, expr: &FnExpr) {
        let params = self.params(&expr.function.params);
        let name = expr.ident.as_ref().map(|id| id.sym.to_string());
        self.enter_function(FunctionForm::Expression, name, params, expr.function.span);
        expr.visit_children_with(self);
        self.leave();
    }

    fn visit_arrow_expr(&mut self, arrow: &ArrowExpr) {
        let params = arrow.params.iter().map(|p| self.param(p)).collect();
        self.enter_function(FunctionForm::Arrow, None, params, arrow.span);
        arrow.visit_children_with(self);
        self.leave();
    }

    fn visit_class_method(&mut self, method: &ClassMethod) {
        let params = self.params(&method.function.params);
        self.enter_function(method_form(method.kind), prop_name(&method.key), params, method.span);
        method.visit_children_with(self);
        self.leave();
    }

    fn visit_private_method(&mut self, method: &PrivateMethod) {
        let params = self.params(&method.function.params);
        let name = Some(format!("#{}", method.key.name));
        self.enter_function(method_form(method.kind), name, params, method.span);
        method.visit_children_with(self);
        self.leave();
    }

    fn visit_constructor(&mut self, ctor: &Constructor) {
        let params = ctor
            .params
            .iter()
            .map(|p| match p {
                ParamOrTsParamProp::Param(param) => self.param(&param.pat),
                ParamOrTsParamProp::TsParamProp(prop) => ast::Param::Unrecognized {
                    source: self.source_text(prop.span),
                },
            })
            .collect();
        self.enter_function(
            FunctionForm::Constructor,
            Some("constructor".to_string()),
            params,
            ctor.span,
        );
        ctor.visit_children_with(self);
        self.leave();
    }

    fn visit_method_prop(&mut self, method: &MethodProp) {
        let params = self.params(&method.function.params);
        self.enter_function(
            FunctionForm::Method,
            prop_name(&method.key),
            params,
            method.function.span,
        );
        method.visit_children_with(self);
        self.leave();
    }

    fn visit_getter_prop(&mut self, getter: &GetterProp) {
        self.enter_function(FunctionForm::Getter, prop_name(&getter.key), Vec::new(), getter.span);
        getter.visit_children_with(self);
        self.leave();
    }

    fn visit_setter_prop(&mut self, setter: &SetterProp) {
        let params = vec![self.param(&setter.param)];
        self.enter_function(FunctionForm::Setter, prop_name(&setter.key), params, setter.span);
        setter.visit_children_with(self);
        self.leave();
    }

    fn visit_return_stmt(&mut self, stmt: &ReturnStmt) {
        let argument = stmt.arg.as_deref().map(|arg| self.expression(arg));
        self.enter(NodeKind::ReturnStatement(ReturnShape { argument }), stmt.span);
        stmt.visit_children_with(self);
        self.leave();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expression, NodeType};
    use crate::parser;
    use swc_common::sync::Lrc;

    fn lower(src: &str) -> SyntaxNode {
        let cm: Lrc<SourceMap> = Default::default();
        let (program, file_start) = parser::parse_source_file(src, &cm, "test.js").unwrap();
        lower_program(&program, src, &cm, file_start)
    }

    fn functions(node: &SyntaxNode, out: &mut Vec<FunctionShape>) {
        if let Some(shape) = node.as_function() {
            out.push(shape.clone());
        }
        for child in &node.children {
            functions(child, out);
        }
    }

    fn all_functions(src: &str) -> Vec<FunctionShape> {
        let mut out = Vec::new();
        functions(&lower(src), &mut out);
        out
    }

    #[test]
    fn test_lower_declaration_with_params() {
        let fns = all_functions("function add(a, b) { return a + b; }");
        assert_eq!(fns.len(), 1);
        assert_eq!(fns[0].form, FunctionForm::Declaration);
        assert_eq!(fns[0].name.as_deref(), Some("add"));
        let names: Vec<&str> = fns[0].params.iter().map(|p| p.display_name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_lower_preserves_source_order_and_nesting() {
        let src = "function outer() {\n  var inner = function () { return 1; };\n  return inner;\n}\nfunction last() {}";
        let root = lower(src);
        assert_eq!(root.children.len(), 2);
        let outer = &root.children[0];
        assert_eq!(outer.as_function().and_then(|f| f.name.clone()), Some("outer".into()));
        // Inner function first, then the outer return statement.
        assert_eq!(outer.children.len(), 2);
        assert!(outer.children[0].is_function());
        assert_eq!(outer.children[1].node_type(), Some(NodeType::ReturnStatement));
        assert_eq!(root.children[1].loc.start.line, 5);
    }

    #[test]
    fn test_lower_param_shapes() {
        let fns = all_functions("function f(a = 1, { b, c }, [d], ...rest) {}");
        let names: Vec<&str> = fns[0].params.iter().map(|p| p.display_name()).collect();
        assert_eq!(names, vec!["a", "{ b, c }", "[d]", "...rest"]);
    }

    #[test]
    fn test_lower_method_forms() {
        let src = r#"
            class Shape {
                constructor(w, h) { this.w = w; }
                area() { return this.w; }
                get size() { return 1; }
                static create(opts) { return new Shape(opts); }
            }
            var obj = { run(x) { return x; }, set value(v) {} };
        "#;
        let fns = all_functions(src);
        let forms: Vec<FunctionForm> = fns.iter().map(|f| f.form).collect();
        assert_eq!(
            forms,
            vec![
                FunctionForm::Constructor,
                FunctionForm::Method,
                FunctionForm::Getter,
                FunctionForm::Method,
                FunctionForm::Method,
                FunctionForm::Setter,
            ]
        );
        assert_eq!(fns[3].name.as_deref(), Some("create"));
        assert_eq!(fns[5].params.len(), 1);
    }

    #[test]
    fn test_lower_return_argument_shapes() {
        let src = "function f() { return (x); }\nfunction g() { return 'hi'; }\nfunction h() { return a.b; }\nfunction k() { return; }";
        let root = lower(src);
        let args: Vec<Option<Expression>> = root
            .children
            .iter()
            .map(|f| f.children[0].as_return().and_then(|r| r.argument.clone()))
            .collect();
        assert_eq!(
            args,
            vec![
                Some(Expression::Identifier { name: "x".into() }),
                Some(Expression::Literal { raw: "'hi'".into() }),
                Some(Expression::Unrecognized { source: "a.b".into() }),
                None,
            ]
        );
    }

    #[test]
    fn test_lower_spans_are_relative_to_text() {
        let src = "var a = 1;\nvar f = (x) => x;";
        let root = lower(src);
        let arrow = &root.children[0];
        assert_eq!(arrow.span.start, 19);
        assert_eq!(arrow.span.slice(src), Some("(x) => x"));
        assert_eq!(arrow.loc.start.line, 2);
        assert_eq!(arrow.loc.start.column, 8);
    }
}
