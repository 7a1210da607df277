//! Keystroke glue: trigger detection and buffer editing around the pipeline
//!
//! This is the thin host-adapter layer. The host resolves its focused buffer
//! and cursor once per Enter keystroke and passes them in explicitly.

use crate::buffer::Buffer;
use crate::pipeline::{self, Insertion};
use crate::position::EditorPosition;
use anyhow::Result;
use serde::Serialize;

/// Trigger snippets recognised when no configuration says otherwise
pub const DEFAULT_TRIGGERS: &[&str] = &["/**", "//"];

/// Feature switch and trigger set used by `handle_enter`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSettings {
    pub enabled: bool,
    pub triggers: Vec<String>,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        TriggerSettings {
            enabled: true,
            triggers: DEFAULT_TRIGGERS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// What an Enter keystroke turned into
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum KeystrokeOutcome {
    /// Feature disabled or no trigger at the cursor; buffer untouched
    Ignored,
    /// Trigger removed, nothing inserted; the host runs its default Enter
    Declined { trigger: String },
    /// Comment block inserted and cursor moved to the `@desc` line
    Annotated {
        trigger: String,
        insertion: Insertion,
    },
}

/// Trigger snippet typed on `line`, if the cursor sits right after it
///
/// The cursor must be exactly at the end of the right-trimmed line, and the
/// trimmed line must equal one of `triggers`.
pub fn detect_trigger<'a>(line: &str, cursor_column: usize, triggers: &'a [String]) -> Option<&'a str> {
    let right_trimmed = line.trim_end();
    if cursor_column != right_trimmed.chars().count() {
        return None;
    }
    let typed = right_trimmed.trim_start();
    triggers
        .iter()
        .map(String::as_str)
        .find(|trigger| !trigger.is_empty() && *trigger == typed)
}

/// Remove the trigger snippet that ends at `cursor`, returning the new cursor
pub fn strip_trigger(buffer: &mut Buffer, cursor: EditorPosition, trigger: &str) -> Result<EditorPosition> {
    let width = trigger.chars().count();
    let start_column = cursor.column.checked_sub(width).ok_or_else(|| {
        anyhow::anyhow!("trigger {:?} does not fit before column {}", trigger, cursor.column)
    })?;
    let start = EditorPosition::new(cursor.line, start_column);
    buffer.replace_range(start, cursor, "")?;
    Ok(start)
}

/// Handle an Enter keystroke at `cursor`
///
/// On a detected trigger the snippet is removed first. The remaining buffer
/// is handed to the pipeline. When a function matches, the block is inserted
/// and `cursor` moves to the end of the `@desc` line. Otherwise the buffer
/// keeps the trigger removed and nothing else changes. Errors only come from
/// positions outside the buffer.
pub fn handle_enter(
    buffer: &mut Buffer,
    cursor: &mut EditorPosition,
    settings: &TriggerSettings,
    filename: &str,
) -> Result<KeystrokeOutcome> {
    if !settings.enabled {
        return Ok(KeystrokeOutcome::Ignored);
    }

    let Some(line) = buffer.line(cursor.line) else {
        return Ok(KeystrokeOutcome::Ignored);
    };
    let Some(trigger) = detect_trigger(line, cursor.column, &settings.triggers) else {
        return Ok(KeystrokeOutcome::Ignored);
    };
    let trigger = trigger.to_string();

    *cursor = strip_trigger(buffer, *cursor, &trigger)?;

    match pipeline::annotate(buffer.text(), cursor.line, filename) {
        Some(insertion) => {
            buffer.insert(insertion.position, &insertion.text)?;
            *cursor = insertion.cursor;
            tracing::debug!(
                line = insertion.position.line,
                params = insertion.annotation.signature.params.len(),
                "inserted annotation"
            );
            Ok(KeystrokeOutcome::Annotated { trigger, insertion })
        }
        None => Ok(KeystrokeOutcome::Declined { trigger }),
    }
}
