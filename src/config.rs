//! Classification rule configuration.
//!
//! This module loads the extension→category mapping, the protected-item list,
//! and the script-extension exclusion list from a JSON rule file. A missing or
//! malformed rule file is fatal: no classification (and no filesystem
//! mutation) happens without one.
//!
//! # Configuration File Format
//!
//! Rules are stored in JSON with the following structure:
//!
//! ```json
//! {
//!     "categories": {
//!         "Docs": [".txt", ".pdf"],
//!         "Images": [".jpg", ".png"]
//!     },
//!     "protected_items": ["keepme.txt"],
//!     "script_extensions": [".py"],
//!     "fallback_category": "other",
//!     "folder_category": "folders"
//! }
//! ```
//!
//! `fallback_category` and `folder_category` are optional and default to
//! `"other"` and `"folders"`. Category order in the file matters: if an
//! extension appears under more than one category, the last one listed wins.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::classifier::CompiledRules;

/// Name of the rule file looked up in the working directory.
pub const LOCAL_RULES_FILE: &str = "sortrules.json";

/// Errors that can occur while loading rule configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// No rule file was found at any of the candidate locations.
    ConfigNotFound(PathBuf),
    /// Invalid JSON syntax or structure.
    ConfigInvalid(String),
    /// IO error while reading the rule file.
    IoError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Rule file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid rule file: {}", msg),
            ConfigError::IoError(msg) => write!(f, "IO error reading rule file: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Classification rules as deserialized from the JSON rule file.
///
/// Categories are kept as an ordered list of `(name, extensions)` pairs so
/// that the file's key order is preserved; the derived extension index
/// resolves duplicate extensions by load order (last writer wins).
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    /// Ordered mapping from category name to the extensions it claims.
    #[serde(deserialize_with = "ordered_categories")]
    pub categories: Vec<(String, Vec<String>)>,

    /// Literal entry names that must never be classified or moved.
    #[serde(default)]
    pub protected_items: Vec<String>,

    /// Extensions exempted from movement (tooling files).
    #[serde(default)]
    pub script_extensions: Vec<String>,

    /// Category for files whose extension matches nothing.
    #[serde(default = "default_fallback_category")]
    pub fallback_category: String,

    /// Category that relocated subdirectories land in.
    #[serde(default = "default_folder_category")]
    pub folder_category: String,
}

fn default_fallback_category() -> String {
    "other".to_string()
}

fn default_folder_category() -> String {
    "folders".to_string()
}

/// Deserializes a JSON map into an ordered `Vec` of pairs, preserving the
/// order in which keys appear in the file.
fn ordered_categories<'de, D>(deserializer: D) -> Result<Vec<(String, Vec<String>)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CategoryVisitor;

    impl<'de> Visitor<'de> for CategoryVisitor {
        type Value = Vec<(String, Vec<String>)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of category names to extension lists")
        }

        fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((name, extensions)) = access.next_entry::<String, Vec<String>>()? {
                entries.push((name, extensions));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(CategoryVisitor)
}

impl RuleConfig {
    /// Load rules from a file, searching standard locations.
    ///
    /// Attempts to load rules in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `sortrules.json` in the current directory
    /// 3. Look for `~/.config/shelve/rules.json` in the home directory
    ///
    /// Classification cannot proceed without rules, so exhausting all
    /// locations is an error rather than a silent default.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_RULES_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("shelve")
                .join("rules.json");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Err(ConfigError::ConfigNotFound(local_config))
    }

    /// Load rules from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if JSON parsing fails.
    /// Returns `ConfigError::IoError` if the file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile the rules into the lookup structures used during a run.
    pub fn compile(self) -> CompiledRules {
        CompiledRules::new(self)
    }
}
