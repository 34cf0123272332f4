//! Checker configuration
//!
//! Supports loading from btrace.toml [checker] section or .btrace.toml

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// How many violations a check reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckMode {
    /// Stop at the first violation
    #[default]
    First,
    /// Keep checking and report every violation
    All,
}

/// How long a reference that is never used stays live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnusedBorrows {
    /// Until the scope holding it ends
    #[default]
    ScopeEnd,
    /// Only at the operation that created it
    Immediate,
}

/// Diagnostic output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorFormat {
    #[default]
    Human,
    Json,
}

impl fmt::Display for CheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckMode::First => write!(f, "first"),
            CheckMode::All => write!(f, "all"),
        }
    }
}

impl fmt::Display for UnusedBorrows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnusedBorrows::ScopeEnd => write!(f, "scope-end"),
            UnusedBorrows::Immediate => write!(f, "immediate"),
        }
    }
}

/// Checker configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CheckerConfig {
    pub mode: CheckMode,
    pub unused_borrows: UnusedBorrows,
    pub error_format: ErrorFormat,
}

/// Command-line overrides; unset fields keep the file's value
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigOverrides {
    pub mode: Option<CheckMode>,
    pub unused_borrows: Option<UnusedBorrows>,
    pub error_format: Option<ErrorFormat>,
}

impl CheckerConfig {
    /// Report every violation instead of stopping at the first
    pub fn all() -> Self {
        Self {
            mode: CheckMode::All,
            ..Self::default()
        }
    }

    /// Load from file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            _ => Err(ConfigError::Parse("Unknown config file format".to_string())),
        }
    }

    /// Parse TOML, accepting either a `[checker]` table or top-level keys
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let manifest: toml::Value =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let table = manifest.get("checker").cloned().unwrap_or(manifest);
        table
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))
    }

    /// Find config file in directory hierarchy
    pub fn find_config(start: &Path) -> Option<Self> {
        let mut dir = if start.is_file() {
            start.parent()?.to_path_buf()
        } else {
            start.to_path_buf()
        };

        loop {
            // btrace.toml only counts when it carries a [checker] section
            let manifest = dir.join("btrace.toml");
            if manifest.exists()
                && let Ok(Some(config)) = Self::from_manifest(&manifest)
            {
                return Some(config);
            }

            let dotfile = dir.join(".btrace.toml");
            if dotfile.exists()
                && let Ok(config) = Self::from_file(&dotfile)
            {
                return Some(config);
            }

            if !dir.pop() {
                break;
            }
        }

        None
    }

    fn from_manifest(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let manifest: toml::Value =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        match manifest.get("checker") {
            Some(section) => section
                .clone()
                .try_into()
                .map(Some)
                .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string())),
            None => Ok(None),
        }
    }

    /// Merge command-line overrides (overrides take precedence)
    pub fn merge(&mut self, overrides: &ConfigOverrides) {
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        if let Some(policy) = overrides.unused_borrows {
            self.unused_borrows = policy;
        }
        if let Some(format) = overrides.error_format {
            self.error_format = format;
        }
    }
}

/// Configuration error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}
