//! Per-item classification decisions and the run driver.
//!
//! The [`Sorter`] lists a root directory's immediate entries exactly once,
//! fans them out across a fixed-size worker pool, and decides each entry's
//! fate independently: skip (protected, already a category directory, script
//! file, the running tool itself), move into its category, or record a
//! failure. Per-item outcomes are collected into a [`Summary`] after all
//! workers finish; there is no shared counter to race on.

use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::classifier::CompiledRules;
use crate::dedup::{DirLocks, unique_path};

/// Default worker pool width.
pub const DEFAULT_JOBS: usize = 10;

/// Errors that can occur while organizing a directory.
#[derive(Debug)]
pub enum SortError {
    /// The root directory is invalid or doesn't exist.
    InvalidRoot {
        path: PathBuf,
        source: io::Error,
    },
    /// Failed to create a category directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: io::Error,
    },
    /// A move was denied by filesystem permissions.
    AccessDenied {
        path: PathBuf,
        source: io::Error,
    },
    /// Any other failure while moving an entry.
    MoveFailed {
        source_path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },
    /// The worker pool could not be constructed.
    WorkerPoolFailed { reason: String },
}

impl fmt::Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRoot { path, source } => {
                write!(f, "Invalid root directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::AccessDenied { path, source } => {
                write!(f, "Insufficient access to {}: {}", path.display(), source)
            }
            Self::MoveFailed {
                source_path,
                destination,
                source,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source_path.display(),
                    destination.display(),
                    source
                )
            }
            Self::WorkerPoolFailed { reason } => {
                write!(f, "Failed to start worker pool: {}", reason)
            }
        }
    }
}

impl std::error::Error for SortError {}

/// Result type for organizing operations.
pub type SortResult<T> = Result<T, SortError>;

/// One top-level directory entry, captured by the single scan at run start.
#[derive(Debug, Clone)]
pub struct ScanItem {
    /// The entry's file name.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// Why an entry was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry is in the protected set or is hidden.
    Protected,
    /// The entry is the running executable itself.
    OwnExecutable,
    /// The entry is one of the category directories.
    CategoryDirectory,
    /// The file's extension is in the script exclusion set.
    ScriptExtension,
    /// The entry is a directory and folder relocation is disabled.
    FolderKept,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Protected => "protected",
            Self::OwnExecutable => "own executable",
            Self::CategoryDirectory => "category directory",
            Self::ScriptExtension => "script file",
            Self::FolderKept => "folder left in place",
        };
        write!(f, "{}", reason)
    }
}

/// The fate of a single entry.
#[derive(Debug)]
pub enum Outcome {
    /// The entry was relocated into a category directory.
    Moved {
        name: String,
        category: String,
        destination: PathBuf,
    },
    /// The entry was deliberately left untouched.
    Skipped { name: String, reason: SkipReason },
    /// Moving the entry failed; it was left in place.
    Failed { name: String, error: SortError },
}

/// Aggregated result of one run.
///
/// Counts are derived from the collected outcome list rather than kept in
/// shared counters, so they are exact regardless of worker interleaving.
#[derive(Debug, Default)]
pub struct Summary {
    pub outcomes: Vec<Outcome>,
}

impl Summary {
    /// Total entries examined.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of entries relocated.
    pub fn moved(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Moved { .. }))
            .count()
    }

    /// Number of entries deliberately left untouched.
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Skipped { .. }))
            .count()
    }

    /// Number of entries whose move failed.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Failed { .. }))
            .count()
    }
}

/// Receives one record per notable action during a run.
///
/// Implementations must tolerate concurrent calls from worker threads.
/// All methods default to no-ops so tests can run silently.
pub trait Reporter: Sync {
    /// A missing category directory was created.
    fn dir_created(&self, _name: &str) {}

    /// The root listing finished; `total` entries will be processed.
    fn scanned(&self, _total: usize) {}

    /// A non-fatal error occurred outside the per-item path.
    fn error(&self, _message: &str) {}

    /// An entry was processed.
    fn outcome(&self, _outcome: &Outcome) {}
}

/// Reporter that discards every event.
pub struct SilentReporter;

impl Reporter for SilentReporter {}

/// Organizes a directory's immediate entries into category subdirectories.
pub struct Sorter {
    root: PathBuf,
    move_folders: bool,
    rules: CompiledRules,
    /// File name of the running executable, never moved.
    self_name: Option<String>,
    jobs: usize,
    dir_locks: DirLocks,
}

impl Sorter {
    /// Creates a sorter for `root` with the given compiled rules.
    pub fn new(root: impl Into<PathBuf>, rules: CompiledRules) -> Self {
        Self {
            root: root.into(),
            move_folders: true,
            rules,
            self_name: None,
            jobs: DEFAULT_JOBS,
            dir_locks: DirLocks::new(),
        }
    }

    /// Whether subdirectories are relocated into the folder category.
    /// Defaults to true.
    pub fn move_folders(mut self, enabled: bool) -> Self {
        self.move_folders = enabled;
        self
    }

    /// Name of the running executable, excluded from movement.
    pub fn self_name(mut self, name: Option<String>) -> Self {
        self.self_name = name;
        self
    }

    /// Worker pool width. Values below 1 are clamped to 1.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Runs one organization pass over the root directory.
    ///
    /// Category directories are created first (a creation failure is reported
    /// and the run continues), the root is listed exactly once, and every
    /// entry is processed independently on the worker pool. Entries that
    /// appear in the root after the listing are not picked up by this run.
    pub fn run(&self, reporter: &dyn Reporter) -> SortResult<Summary> {
        if !self.root.is_dir() {
            return Err(SortError::InvalidRoot {
                path: self.root.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "root is not a directory"),
            });
        }

        self.ensure_target_dirs(reporter);

        let items = self.scan()?;
        reporter.scanned(items.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| SortError::WorkerPoolFailed {
                reason: e.to_string(),
            })?;

        let outcomes: Vec<Outcome> = pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    let outcome = self.process_item(item);
                    reporter.outcome(&outcome);
                    outcome
                })
                .collect()
        });

        Ok(Summary { outcomes })
    }

    /// Creates every category directory that doesn't exist yet. One failure
    /// doesn't abort the run; items destined for that category will fail to
    /// move later and are reported individually.
    fn ensure_target_dirs(&self, reporter: &dyn Reporter) {
        for name in self.rules.target_dirs() {
            let path = self.root.join(name);
            if path.exists() {
                continue;
            }
            match fs::create_dir_all(&path) {
                Ok(()) => reporter.dir_created(name),
                Err(e) => {
                    let error = SortError::DirectoryCreationFailed { path, source: e };
                    reporter.error(&error.to_string());
                }
            }
        }
    }

    /// Lists the root's immediate entries. This is the fixed work set for the
    /// run.
    fn scan(&self) -> SortResult<Vec<ScanItem>> {
        let entries = fs::read_dir(&self.root).map_err(|e| SortError::InvalidRoot {
            path: self.root.clone(),
            source: e,
        })?;

        let mut items = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            items.push(ScanItem { name, is_dir });
        }
        Ok(items)
    }

    /// Decides and executes the fate of one entry. Never panics and never
    /// lets an error escape past the item boundary.
    pub fn process_item(&self, item: &ScanItem) -> Outcome {
        if let Some(self_name) = &self.self_name
            && *self_name == item.name
        {
            return Outcome::Skipped {
                name: item.name.clone(),
                reason: SkipReason::OwnExecutable,
            };
        }

        if self.rules.is_target_dir(&item.name) {
            return Outcome::Skipped {
                name: item.name.clone(),
                reason: SkipReason::CategoryDirectory,
            };
        }

        if self.rules.is_protected(&item.name) {
            return Outcome::Skipped {
                name: item.name.clone(),
                reason: SkipReason::Protected,
            };
        }

        if item.is_dir {
            if !self.move_folders {
                return Outcome::Skipped {
                    name: item.name.clone(),
                    reason: SkipReason::FolderKept,
                };
            }
            let category = self.rules.folder_category().to_string();
            return self.relocate(&item.name, category);
        }

        if self.rules.is_script(&item.name) {
            return Outcome::Skipped {
                name: item.name.clone(),
                reason: SkipReason::ScriptExtension,
            };
        }

        let category = self.rules.classify(&item.name).to_string();
        self.relocate(&item.name, category)
    }

    /// Moves one entry into a category directory under a collision-free name.
    ///
    /// The destination directory's lock is held across the name probe and the
    /// rename, so two workers targeting the same directory cannot claim the
    /// same free name.
    fn relocate(&self, name: &str, category: String) -> Outcome {
        let source = self.root.join(name);
        let target_dir = self.root.join(&category);

        let lock = self.dir_locks.for_dir(&target_dir);
        let _guard = lock.lock();

        let destination = unique_path(&target_dir, name);
        match fs::rename(&source, &destination) {
            Ok(()) => Outcome::Moved {
                name: name.to_string(),
                category,
                destination,
            },
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Outcome::Failed {
                name: name.to_string(),
                error: SortError::AccessDenied {
                    path: source,
                    source: e,
                },
            },
            Err(e) => Outcome::Failed {
                name: name.to_string(),
                error: SortError::MoveFailed {
                    source_path: source,
                    destination,
                    source: e,
                },
            },
        }
    }
}
