//! Batch expansion of trigger lines already present in a file
//!
//! Each trigger line is treated as if Enter had been pressed at its end.
//! Lines are processed bottom-up so that insertions never shift the lines
//! still waiting to be processed.

use crate::buffer::Buffer;
use crate::pipeline;
use crate::position::EditorPosition;
use crate::trigger;
use anyhow::Result;
use serde::Serialize;

/// Result of expanding one trigger line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpansionEntry {
    /// 1-based line the trigger was found on, in the input text
    pub line: usize,
    pub trigger: String,
    pub annotated: bool,
    /// Name of the annotated function, when it has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

/// Expanded text plus one entry per trigger line, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expansion {
    pub text: String,
    pub entries: Vec<ExpansionEntry>,
}

impl Expansion {
    pub fn annotated_count(&self) -> usize {
        self.entries.iter().filter(|e| e.annotated).count()
    }

    pub fn declined_count(&self) -> usize {
        self.entries.len() - self.annotated_count()
    }
}

/// Every trigger line with the cursor position at its end, top to bottom
///
/// Lines that belong to an existing comment are not triggers: a line
/// followed by a ` * ...` line opens a comment block, and a bare `//` next
/// to another `//` line is a spacer inside a line-comment block.
pub fn find_trigger_lines(buffer: &Buffer, triggers: &[String]) -> Vec<(EditorPosition, String)> {
    (0..buffer.line_count())
        .filter_map(|line| {
            let text = buffer.line(line)?;
            let column = text.trim_end().chars().count();
            let snippet = trigger::detect_trigger(text, column, triggers)?;
            if opens_existing_comment(buffer, line) || inside_line_comment(buffer, line, snippet) {
                return None;
            }
            Some((EditorPosition::new(line, column), snippet.to_string()))
        })
        .collect()
}

fn opens_existing_comment(buffer: &Buffer, line: usize) -> bool {
    buffer
        .line(line + 1)
        .map(|next| next.trim_start().starts_with('*'))
        .unwrap_or(false)
}

fn inside_line_comment(buffer: &Buffer, line: usize, snippet: &str) -> bool {
    if !snippet.starts_with("//") {
        return false;
    }
    [line.checked_sub(1), Some(line + 1)]
        .into_iter()
        .flatten()
        .filter_map(|neighbour| buffer.line(neighbour))
        .any(|neighbour| neighbour.trim_start().starts_with("//"))
}

/// Expand every trigger line in `text`
///
/// A trigger only changes the text when its annotation succeeds. Declined
/// triggers are left exactly as they were.
///
/// All snippets are stripped before the first attempt, so an unterminated
/// `/**` further up cannot hide the functions below it from the parser. A
/// declined snippet is put back right away; only lines above it are still
/// pending, and trailing garbage is cut by tolerant parsing.
pub fn expand_text(text: &str, filename: &str, triggers: &[String]) -> Result<Expansion> {
    let mut buffer = Buffer::new(text);
    let mut pending = Vec::new();
    for (position, snippet) in find_trigger_lines(&buffer, triggers).into_iter().rev() {
        let start = trigger::strip_trigger(&mut buffer, position, &snippet)?;
        pending.push((start, snippet));
    }

    // `pending` is already bottom-up
    let mut entries = Vec::new();
    for (start, snippet) in pending {
        match pipeline::annotate(buffer.text(), start.line, filename) {
            Some(insertion) => {
                buffer.insert(insertion.position, &insertion.text)?;
                entries.push(ExpansionEntry {
                    line: start.line + 1,
                    trigger: snippet,
                    annotated: true,
                    function: insertion.annotation.signature.name,
                });
            }
            None => {
                buffer.insert(start, &snippet)?;
                tracing::debug!(line = start.line + 1, trigger = %snippet, "trigger left in place");
                entries.push(ExpansionEntry {
                    line: start.line + 1,
                    trigger: snippet,
                    annotated: false,
                    function: None,
                });
            }
        }
    }

    entries.reverse();
    Ok(Expansion {
        text: buffer.into_text(),
        entries,
    })
}
