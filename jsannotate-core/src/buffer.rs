//! In-memory text buffer addressed in editor coordinates

use crate::position::{self, EditorPosition};
use anyhow::Result;

/// Owned document text, edited in place by the keystroke glue
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Buffer {
    text: String,
}

impl Buffer {
    pub fn new(text: impl Into<String>) -> Self {
        Buffer { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Text of 0-based `line` without its terminator
    pub fn line(&self, line: usize) -> Option<&str> {
        position::line_text(&self.text, line)
    }

    pub fn line_count(&self) -> usize {
        position::line_count(&self.text)
    }

    /// Byte offset of `pos`; columns past the end of a line clamp to it
    pub fn offset_of(&self, pos: EditorPosition) -> Result<usize> {
        position::editor_offset(&self.text, pos).ok_or_else(|| {
            anyhow::anyhow!(
                "line {} is out of range (buffer has {} lines)",
                pos.line,
                self.line_count()
            )
        })
    }

    /// Replace the text between `start` and `end` with `replacement`
    pub fn replace_range(
        &mut self,
        start: EditorPosition,
        end: EditorPosition,
        replacement: &str,
    ) -> Result<()> {
        let from = self.offset_of(start)?;
        let to = self.offset_of(end)?;
        if from > to {
            anyhow::bail!(
                "range start {}:{} is after its end {}:{}",
                start.line,
                start.column,
                end.line,
                end.column
            );
        }
        self.text.replace_range(from..to, replacement);
        Ok(())
    }

    /// Insert `text` at `pos`
    pub fn insert(&mut self, pos: EditorPosition, text: &str) -> Result<()> {
        let at = self.offset_of(pos)?;
        self.text.insert_str(at, text);
        Ok(())
    }
}

impl From<String> for Buffer {
    fn from(text: String) -> Self {
        Buffer { text }
    }
}
