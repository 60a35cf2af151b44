//! Extension-based classification and protection rules.
//!
//! This module turns a [`RuleConfig`](crate::config::RuleConfig) into the
//! lookup structures consulted for every directory entry: the inverted
//! extension index, the protected-item set, the script-extension set, and the
//! set of category directory names a run creates and must not reprocess.
//!
//! # Examples
//!
//! ```
//! use shelve::classifier::CompiledRules;
//! use shelve::config::RuleConfig;
//!
//! let json = r#"{"categories": {"Docs": [".txt"], "Images": [".jpg"]}}"#;
//! let rules: CompiledRules = serde_json::from_str::<RuleConfig>(json)
//!     .unwrap()
//!     .compile();
//!
//! assert_eq!(rules.classify("report.TXT"), "Docs");
//! assert_eq!(rules.classify("archive.rar"), "other");
//! ```

use std::collections::{HashMap, HashSet};

use crate::config::RuleConfig;

/// Marker prefix for hidden entries, which are always protected.
const HIDDEN_PREFIX: char = '.';

/// Compiled, immutable classification rules for one run.
///
/// Built once from configuration and only read afterwards, so it can be
/// shared freely across worker threads.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    /// Lower-cased extension (with leading dot) → category name.
    extension_index: HashMap<String, String>,
    /// Literal names that must never be touched.
    protected: HashSet<String>,
    /// Lower-cased extensions exempted from movement.
    script_extensions: HashSet<String>,
    /// Category names plus the fallback and folder categories.
    target_dirs: HashSet<String>,
    fallback_category: String,
    folder_category: String,
}

impl CompiledRules {
    /// Builds compiled rules from a loaded configuration.
    ///
    /// Extensions are normalized to lower-case with a leading dot. When the
    /// same extension appears under multiple categories, later categories in
    /// the file override earlier ones.
    pub fn new(config: RuleConfig) -> Self {
        let mut extension_index = HashMap::new();
        let mut target_dirs = HashSet::new();

        for (category, extensions) in &config.categories {
            target_dirs.insert(category.clone());
            for ext in extensions {
                extension_index.insert(normalize_extension(ext), category.clone());
            }
        }

        target_dirs.insert(config.fallback_category.clone());
        target_dirs.insert(config.folder_category.clone());

        Self {
            extension_index,
            protected: config.protected_items.into_iter().collect(),
            script_extensions: config
                .script_extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
            target_dirs,
            fallback_category: config.fallback_category,
            folder_category: config.folder_category,
        }
    }

    /// Returns the category for a file name, based solely on its extension.
    ///
    /// The extension is the substring after the final `.` in the name,
    /// compared case-insensitively. Files without an extension fall back.
    pub fn classify(&self, file_name: &str) -> &str {
        let key = extension_key(file_name);
        self.extension_index
            .get(&key)
            .map(String::as_str)
            .unwrap_or(&self.fallback_category)
    }

    /// Returns true if an entry must never be classified or moved.
    ///
    /// An entry is protected if it is listed literally in the configuration
    /// or if its name starts with the hidden-entry marker.
    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.contains(name) || name.starts_with(HIDDEN_PREFIX)
    }

    /// Returns true if a file's extension is in the script exclusion set.
    pub fn is_script(&self, file_name: &str) -> bool {
        self.script_extensions.contains(&extension_key(file_name))
    }

    /// Returns true if a name is one of the category directories a run
    /// creates; these are excluded from reprocessing.
    pub fn is_target_dir(&self, name: &str) -> bool {
        self.target_dirs.contains(name)
    }

    /// All category directory names that must exist under the root.
    pub fn target_dirs(&self) -> impl Iterator<Item = &str> {
        self.target_dirs.iter().map(String::as_str)
    }

    /// Name of the fallback category directory.
    pub fn fallback_category(&self) -> &str {
        &self.fallback_category
    }

    /// Name of the directory relocated subdirectories land in.
    pub fn folder_category(&self) -> &str {
        &self.folder_category
    }
}

/// Normalizes a configured extension to its lookup form: lower-case, with a
/// leading dot.
fn normalize_extension(ext: &str) -> String {
    let lower = ext.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

/// Extracts the lookup key for a file name's extension.
///
/// Returns the lower-cased substring from the final `.` onward, or the empty
/// string when the name has no extension. The empty string can never match a
/// normalized index entry, so extensionless files always fall back.
fn extension_key(file_name: &str) -> String {
    match file_name.rfind('.') {
        // A leading dot marks a hidden name, not an extension.
        Some(0) | None => String::new(),
        Some(idx) => file_name[idx..].to_lowercase(),
    }
}
