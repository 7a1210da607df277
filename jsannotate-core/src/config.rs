//! Configuration file support for jsannotate
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.jsannotaterc.json` in project root
//! 3. `jsannotate.config.json` in project root
//! 4. `"jsannotate"` key in `package.json`
//!
//! All fields are optional.

use crate::trigger::{TriggerSettings, DEFAULT_TRIGGERS};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default exclude patterns applied when no excludes are configured
const DEFAULT_EXCLUDES: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/*.min.js",
];

/// jsannotate configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsAnnotateConfig {
    /// Whether trigger lines are expanded at all (default: true)
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Trigger snippets (default: `/**` and `//`)
    #[serde(default)]
    pub triggers: Option<Vec<String>>,

    /// Glob patterns for files to include (default: all supported extensions)
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns for files to exclude (default: node_modules, dist, build, minified)
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Resolved configuration with compiled glob patterns
#[derive(Debug)]
pub struct ResolvedConfig {
    pub enabled: bool,
    pub triggers: Vec<String>,
    /// Compiled include patterns (None means include all)
    pub include: Option<GlobSet>,
    /// Compiled exclude patterns
    pub exclude: GlobSet,
    /// Exclude patterns in effect, as written
    pub exclude_patterns: Vec<String>,
    /// Whether `exclude_patterns` came from the config rather than the defaults
    pub custom_exclude: bool,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl JsAnnotateConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref triggers) = self.triggers {
            if triggers.is_empty() {
                anyhow::bail!("triggers must not be empty (omit the field to use the defaults)");
            }
            for trigger in triggers {
                if trigger.trim().is_empty() {
                    anyhow::bail!("triggers must not contain blank entries");
                }
                if trigger.contains('\n') || trigger.contains('\r') {
                    anyhow::bail!("trigger {:?} must fit on a single line", trigger);
                }
                if trigger.trim() != trigger {
                    anyhow::bail!(
                        "trigger {:?} must not start or end with whitespace",
                        trigger
                    );
                }
            }
        }

        // Validate glob patterns compile
        for pattern in &self.include {
            Glob::new(pattern).with_context(|| format!("invalid include pattern: {}", pattern))?;
        }
        for pattern in &self.exclude {
            Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {}", pattern))?;
        }

        Ok(())
    }

    /// Resolve config into compiled form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let include = if self.include.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &self.include {
                builder.add(Glob::new(pattern)?);
            }
            Some(builder.build()?)
        };

        let custom_exclude = !self.exclude.is_empty();
        let exclude_patterns: Vec<String> = if custom_exclude {
            self.exclude.clone()
        } else {
            DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect()
        };
        let exclude = {
            let mut builder = GlobSetBuilder::new();
            for pattern in &exclude_patterns {
                builder.add(Glob::new(pattern)?);
            }
            builder.build()?
        };

        let triggers = match &self.triggers {
            Some(triggers) => triggers.clone(),
            None => DEFAULT_TRIGGERS.iter().map(|t| t.to_string()).collect(),
        };

        Ok(ResolvedConfig {
            enabled: self.enabled.unwrap_or(true),
            triggers,
            include,
            exclude,
            exclude_patterns,
            custom_exclude,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Check if a file path should be included based on include/exclude patterns
    pub fn should_include(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        if self.exclude.is_match(path_str.as_ref()) {
            return false;
        }

        if let Some(ref include) = self.include {
            return include.is_match(path_str.as_ref());
        }

        true
    }

    /// Switch and trigger set for the keystroke glue
    pub fn trigger_settings(&self) -> TriggerSettings {
        TriggerSettings {
            enabled: self.enabled,
            triggers: self.triggers.clone(),
        }
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        JsAnnotateConfig::default().resolve()
    }
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.jsannotaterc.json`
/// 2. `jsannotate.config.json`
/// 3. `"jsannotate"` key in `package.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(JsAnnotateConfig, PathBuf)>> {
    let rc_path = project_root.join(".jsannotaterc.json");
    if rc_path.exists() {
        let config = load_config_file(&rc_path)?;
        return Ok(Some((config, rc_path)));
    }

    let config_path = project_root.join("jsannotate.config.json");
    if config_path.exists() {
        let config = load_config_file(&config_path)?;
        return Ok(Some((config, config_path)));
    }

    let pkg_path = project_root.join("package.json");
    if pkg_path.exists() {
        if let Some(config) = load_from_package_json(&pkg_path)? {
            return Ok(Some((config, pkg_path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<JsAnnotateConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: JsAnnotateConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load config from the "jsannotate" key in package.json
fn load_from_package_json(path: &Path) -> Result<Option<JsAnnotateConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let pkg: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    match pkg.get("jsannotate") {
        Some(value) => {
            let config: JsAnnotateConfig = serde_json::from_value(value.clone())
                .with_context(|| format!("invalid jsannotate config in {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("invalid jsannotate config in {}", path.display()))?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (JsAnnotateConfig::default(), None),
        }
    };

    tracing::debug!(config_path = ?source_path, "resolved configuration");

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
