//! jsannotate core library - JSDoc comment blocks for JavaScript and TypeScript functions

#![deny(warnings)]

// Global invariants enforced in this crate:
// - The annotation pipeline is a pure function of (text, trigger line)
// - No global mutable state
// - No randomness, clocks, threads, or async
// - Deterministic traversal order must be explicit
// - "Nothing to annotate" is a value, never an error
// - Identical input yields byte-for-byte identical output

pub mod ast;
pub mod balance;
pub mod buffer;
pub mod config;
pub mod expand;
pub mod locate;
pub mod lower;
pub mod parser;
pub mod pipeline;
pub mod position;
pub mod render;
pub mod signature;
pub mod tolerant;
pub mod trigger;

pub use buffer::Buffer;
pub use config::ResolvedConfig;
pub use expand::{expand_text, Expansion, ExpansionEntry};
pub use pipeline::{annotate, Annotation, Insertion};
pub use position::EditorPosition;
pub use signature::SignatureRecord;
pub use trigger::{handle_enter, KeystrokeOutcome, TriggerSettings};

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Expansion result for one file on disk
#[derive(Debug, Clone, Serialize)]
pub struct FileExpansion {
    pub path: PathBuf,
    #[serde(flatten)]
    pub expansion: Expansion,
    /// True when the expanded text was written back
    pub written: bool,
}

impl FileExpansion {
    pub fn changed(&self) -> bool {
        self.expansion.annotated_count() > 0
    }
}

/// Expand trigger lines in every source file at `path`
///
/// Files are visited in sorted order. Only files with at least one trigger
/// line are reported. With `write`, changed files are written back in place.
/// A file that cannot be read or written is reported as a warning and
/// skipped.
pub fn expand_path(path: &Path, config: &ResolvedConfig, write: bool) -> Result<Vec<FileExpansion>> {
    if !config.enabled {
        tracing::info!("jsannotate is disabled by configuration");
        return Ok(Vec::new());
    }

    let source_files = collect_source_files(path)?;
    let mut results = Vec::new();
    let mut skipped_files: usize = 0;

    for file_path in source_files {
        if !config.should_include(&file_path) {
            continue;
        }

        match expand_file(&file_path, &config.triggers, write) {
            Ok(Some(result)) => results.push(result),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(file = %file_path.display(), "skipping file: {:#}", e);
                skipped_files += 1;
            }
        }
    }
    if skipped_files > 0 {
        tracing::warn!(skipped_files, "some files were skipped due to errors");
    }

    Ok(results)
}

/// Expand a single file, returning `None` when it has no trigger lines
fn expand_file(path: &Path, triggers: &[String], write: bool) -> Result<Option<FileExpansion>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path.to_string_lossy();

    let expansion = expand_text(&text, &filename, triggers)?;
    if expansion.entries.is_empty() {
        return Ok(None);
    }

    let mut written = false;
    if write && expansion.text != text {
        std::fs::write(path, &expansion.text)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written = true;
    }

    tracing::debug!(
        file = %path.display(),
        annotated = expansion.annotated_count(),
        declined = expansion.declined_count(),
        written,
        "expanded file"
    );

    Ok(Some(FileExpansion {
        path: path.to_path_buf(),
        expansion,
        written,
    }))
}

/// Check if a file is a supported source file
///
/// Supported extensions:
/// - JavaScript: .js, .mjs, .cjs, .jsx
/// - TypeScript: .ts, .mts, .cts, .tsx (excludes .d.ts declaration files)
pub fn is_supported_source_file(filename: &str) -> bool {
    if filename.ends_with(".d.ts") || filename.ends_with(".d.mts") || filename.ends_with(".d.cts") {
        return false;
    }

    matches!(
        Path::new(filename).extension().and_then(|e| e.to_str()),
        Some("js" | "mjs" | "cjs" | "jsx" | "ts" | "mts" | "cts" | "tsx")
    )
}

/// Collect all supported source files from a path (file or directory)
pub fn collect_source_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
            if is_supported_source_file(filename) {
                files.push(path.to_path_buf());
            }
        }
    } else if path.is_dir() {
        collect_source_files_recursive(path, &mut files)?;
    } else {
        anyhow::bail!("path does not exist: {}", path.display());
    }

    // Sort files for deterministic order
    files.sort();

    Ok(files)
}

/// Returns true for directory names that should not be traversed
fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || name == "node_modules"
}

/// Recursively collect supported source files from a directory
fn collect_source_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry_result in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry_result?;
        let path = entry.path();
        let metadata = std::fs::symlink_metadata(&path)
            .with_context(|| format!("failed to read metadata: {}", path.display()))?;

        if metadata.is_symlink() {
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if metadata.is_dir() {
            if !is_skipped_dir(name) {
                collect_source_files_recursive(&path, files)?;
            }
        } else if metadata.is_file() && is_supported_source_file(name) {
            files.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        for name in ["a.js", "a.mjs", "a.cjs", "a.jsx", "a.ts", "a.mts", "a.cts", "a.tsx"] {
            assert!(is_supported_source_file(name), "{} should be supported", name);
        }
        for name in ["a.d.ts", "a.rs", "a.json", "Makefile"] {
            assert!(!is_supported_source_file(name), "{} should be skipped", name);
        }
    }

    #[test]
    fn test_collect_skips_node_modules_and_dot_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        std::fs::create_dir_all(root.join(".cache")).unwrap();
        std::fs::write(root.join("src/b.js"), "").unwrap();
        std::fs::write(root.join("a.ts"), "").unwrap();
        std::fs::write(root.join("node_modules/pkg/index.js"), "").unwrap();
        std::fs::write(root.join(".cache/x.js"), "").unwrap();
        std::fs::write(root.join("notes.txt"), "").unwrap();

        let files = collect_source_files(root).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(relative, vec!["a.ts", "src/b.js"]);
    }

    #[test]
    fn test_collect_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_source_files(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_expand_path_disabled() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.js"), "/**\nfunction f() {}\n").unwrap();
        let config = config::JsAnnotateConfig {
            enabled: Some(false),
            ..Default::default()
        }
        .resolve()
        .unwrap();

        let results = expand_path(dir.path(), &config, true).unwrap();
        assert!(results.is_empty());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.js")).unwrap(),
            "/**\nfunction f() {}\n"
        );
    }
}
