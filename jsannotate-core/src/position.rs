//! Spans, locations and line math shared by the pipeline
//!
//! Two coordinate systems meet here:
//! - Parser coordinates (`SourceLocation`): 1-based lines, 0-based char columns
//! - Editor coordinates (`EditorPosition`): 0-based lines, 0-based char columns
//!
//! Byte offsets (`ByteSpan`) always index the original buffer text.

use serde::{Deserialize, Serialize};

/// Half-open byte range into the buffer text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ByteSpan {
    /// Byte offset of the start of the span (inclusive)
    pub start: usize,
    /// Byte offset of the end of the span (exclusive)
    pub end: usize,
}

impl ByteSpan {
    pub fn new(start: usize, end: usize) -> Self {
        ByteSpan { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Slice the covered text, or `None` if the span is out of bounds
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

/// Line/column pair in parser coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LineColumn {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column (0-indexed, in chars)
    pub column: u32,
}

impl LineColumn {
    pub fn new(line: u32, column: u32) -> Self {
        LineColumn { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start: LineColumn,
    pub end: LineColumn,
}

impl SourceLocation {
    pub fn new(start: LineColumn, end: LineColumn) -> Self {
        SourceLocation { start, end }
    }
}

/// Cursor or insertion point in editor coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EditorPosition {
    /// Line (0-indexed)
    pub line: usize,
    /// Column (0-indexed, in chars)
    pub column: usize,
}

impl EditorPosition {
    pub fn new(line: usize, column: usize) -> Self {
        EditorPosition { line, column }
    }
}

/// Line terminator convention of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    Lf,
    Crlf,
}

impl LineEnding {
    /// `Crlf` if the text already uses `\r\n` anywhere, `Lf` otherwise
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

/// Convert an swc span into a byte span relative to its source file
pub fn byte_span(span: swc_common::Span, file_start: swc_common::BytePos) -> ByteSpan {
    ByteSpan {
        start: span.lo.0.saturating_sub(file_start.0) as usize,
        end: span.hi.0.saturating_sub(file_start.0) as usize,
    }
}

/// Resolve an swc span into parser coordinates
pub fn source_location(span: swc_common::Span, source_map: &swc_common::SourceMap) -> SourceLocation {
    let start = source_map.lookup_char_pos(span.lo);
    let end = source_map.lookup_char_pos(span.hi);
    SourceLocation {
        start: LineColumn::new(start.line as u32, start.col.0 as u32),
        end: LineColumn::new(end.line as u32, end.col.0 as u32),
    }
}

/// Byte offset where 0-based `line` starts, or `None` past the last line
///
/// A buffer always has at least one line, and a trailing newline opens one
/// more (empty) line, matching how editors count lines.
pub fn line_start_offset(text: &str, line: usize) -> Option<usize> {
    if line == 0 {
        return Some(0);
    }
    text.match_indices('\n')
        .nth(line - 1)
        .map(|(idx, _)| idx + 1)
}

/// Text of 0-based `line` without its terminator
pub fn line_text(text: &str, line: usize) -> Option<&str> {
    let start = line_start_offset(text, line)?;
    let rest = &text[start..];
    let end = rest.find('\n').unwrap_or(rest.len());
    Some(rest[..end].strip_suffix('\r').unwrap_or(&rest[..end]))
}

/// Number of lines as an editor counts them
pub fn line_count(text: &str) -> usize {
    text.matches('\n').count() + 1
}

/// Byte index of char column `column` within `line`, clamped to the line end
pub fn char_column_to_byte(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

/// Byte offset of an editor position, or `None` if the line does not exist
pub fn editor_offset(text: &str, position: EditorPosition) -> Option<usize> {
    let start = line_start_offset(text, position.line)?;
    let line = line_text(text, position.line)?;
    Some(start + char_column_to_byte(line, position.column))
}

/// Indentation prefix for a comment placed above `line`
///
/// Takes the run of leading whitespace (a BOM counts as leading whitespace)
/// and replaces every non-whitespace char in it with a space. Tabs and spaces
/// are kept as they are, so the prefix has the same width as the line's own
/// indentation.
pub fn indentation_prefix(line: &str) -> String {
    line.chars()
        .take_while(|c| c.is_whitespace() || *c == '\u{feff}')
        .map(|c| if c.is_whitespace() { c } else { ' ' })
        .collect()
}
