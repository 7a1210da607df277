//! TypeScript and JavaScript parser using SWC, with a tree-sitter fallback
//!
//! Global invariants enforced:
//! - Deterministic parsing order
//! - Recovery only appends to the tail of the text, so offsets and line
//!   numbers of every node match the original buffer
//! - `parse_tolerant` never fails; an unparseable buffer yields an empty program

use crate::ast::SyntaxNode;
use crate::balance;
use crate::lower;
use crate::position::byte_span;
use crate::tolerant;
use anyhow::Result;
use swc_common::{sync::Lrc, BytePos, FileName, SourceFile, SourceMap, Spanned};
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax};

/// Determine the appropriate syntax configuration based on file extension
fn syntax_for_file(filename: &str) -> Syntax {
    if filename.ends_with(".tsx") || filename.ends_with(".mtsx") || filename.ends_with(".ctsx") {
        Syntax::Typescript(swc_ecma_parser::TsSyntax {
            tsx: true,
            decorators: true,
            dts: false,
            ..Default::default()
        })
    } else if filename.ends_with(".ts") || filename.ends_with(".mts") || filename.ends_with(".cts") {
        Syntax::Typescript(swc_ecma_parser::TsSyntax {
            tsx: false,
            decorators: true,
            dts: filename.ends_with(".d.ts"),
            ..Default::default()
        })
    } else if filename.ends_with(".jsx") || filename.ends_with(".mjsx") || filename.ends_with(".cjsx") {
        Syntax::Es(swc_ecma_parser::EsSyntax {
            jsx: true,
            decorators: true,
            ..Default::default()
        })
    } else {
        // Plain JavaScript (for .js, .mjs, .cjs and anything unrecognised)
        Syntax::Es(swc_ecma_parser::EsSyntax {
            jsx: false,
            decorators: true,
            ..Default::default()
        })
    }
}

/// Parse failure with the byte offset (relative to the text) it was raised at
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub message: String,
    pub offset: usize,
}

/// How the tree returned by `parse_tolerant` was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// The text parsed as-is
    None,
    /// Missing closers were appended
    Balanced,
    /// swc gave up; tree-sitter parsed the text and skipped erroneous regions
    Recovered,
    /// No parser could run; the tree is an empty program
    Failed,
}

/// Result of a tolerant parse
#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub root: SyntaxNode,
    pub recovery: Recovery,
}

/// Parse source text into a program, reporting the position of a fatal error
///
/// Returns the program together with the start position of its source file
/// inside `source_map`, which span conversions need.
fn parse_program(
    src: &str,
    source_map: &Lrc<SourceMap>,
    filename: &str,
) -> std::result::Result<(Program, BytePos), ParseFailure> {
    let syntax = syntax_for_file(filename);

    // Create SourceFile for the source code
    let source_file: Lrc<SourceFile> = source_map.new_source_file(
        FileName::Custom(filename.into()).into(),
        src.to_string(),
    );
    let file_start = source_file.start_pos;

    let input = StringInput::from(&*source_file);
    let lexer = Lexer::new(syntax, EsVersion::Es2022, input, None);
    let mut parser = Parser::new_from(lexer);

    let result = parser.parse_program();

    for error in parser.take_errors() {
        tracing::debug!(
            filename,
            offset = byte_span(error.span(), file_start).start,
            "recoverable parse error: {}",
            error.kind().msg()
        );
    }

    result.map(|program| (program, file_start)).map_err(|e| ParseFailure {
        message: e.kind().msg().to_string(),
        offset: byte_span(e.span(), file_start).start,
    })
}

/// Parse TypeScript, JavaScript, JSX, or TSX source code into a program
///
/// Automatically detects file type based on extension and uses appropriate parser configuration.
///
/// Returns an error if a fatal parse error occurs.
pub fn parse_source(src: &str, source_map: &Lrc<SourceMap>, filename: &str) -> Result<Program> {
    parse_source_file(src, source_map, filename).map(|(program, _)| program)
}

/// Like `parse_source`, but also returns the start position of the new source file
pub fn parse_source_file(
    src: &str,
    source_map: &Lrc<SourceMap>,
    filename: &str,
) -> Result<(Program, BytePos)> {
    parse_program(src, source_map, filename).map_err(|failure| {
        anyhow::anyhow!("Parse error at byte {}: {}", failure.offset, failure.message)
            .context(format!("Failed to parse source file: {}", filename))
    })
}

/// Parse possibly-incomplete source into an annotation tree
///
/// Candidates are tried in order:
/// 1. the text as-is, with swc
/// 2. the text with closers appended for everything left open, with swc
/// 3. the balanced text with tree-sitter, which keeps every function outside
///    the regions it could not parse
///
/// The text is reparsed from scratch on every call; nothing is cached.
pub fn parse_tolerant(src: &str, filename: &str) -> ParsedSource {
    let first_error = match try_lower(src, filename) {
        Ok(root) => {
            return ParsedSource {
                root,
                recovery: Recovery::None,
            }
        }
        Err(failure) => failure,
    };
    tracing::debug!(
        filename,
        offset = first_error.offset,
        "parse failed, retrying with balanced closers: {}",
        first_error.message
    );

    let balanced = format!("{}{}", src, balance::missing_closers(src));
    if balanced.len() > src.len() {
        if let Ok(root) = try_lower(&balanced, filename) {
            return ParsedSource {
                root,
                recovery: Recovery::Balanced,
            };
        }
    }

    match tolerant::lower_tolerant(src, &balanced, filename) {
        Ok(root) => {
            tracing::debug!(filename, "parsed with the error-tolerant grammar");
            ParsedSource {
                root,
                recovery: Recovery::Recovered,
            }
        }
        Err(e) => {
            tracing::debug!(filename, "giving up on parse: {:#}", e);
            ParsedSource {
                root: SyntaxNode::empty_program(src.len()),
                recovery: Recovery::Failed,
            }
        }
    }
}

/// Parse one candidate text with a fresh source map and lower it
fn try_lower(text: &str, filename: &str) -> std::result::Result<SyntaxNode, ParseFailure> {
    let cm: Lrc<SourceMap> = Default::default();
    let (program, file_start) = parse_program(text, &cm, filename)?;
    Ok(lower::lower_program(&program, text, &cm, file_start))
}
