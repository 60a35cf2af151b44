//! shelve - a directory tidying utility
//!
//! This library scans a directory's immediate entries and relocates each into
//! a category subdirectory determined by file extension, driven by a
//! user-supplied JSON rule file. Collisions are resolved with numbered
//! suffixes and entries are processed concurrently on a fixed-size worker
//! pool.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod organizer;
pub mod output;

pub use classifier::CompiledRules;
pub use config::{ConfigError, RuleConfig};
pub use organizer::{Outcome, Reporter, SilentReporter, SkipReason, SortError, Sorter, Summary};

pub use cli::{Cli, run_cli};
