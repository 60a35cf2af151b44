//! Command-line interface module for shelve.
//!
//! This module handles argument parsing and the run orchestration: loading
//! rules (missing rules are fatal, nothing is touched without them),
//! validating the target directory, wiring up the console reporter, and
//! printing the final summary.

use clap::Parser;
use std::path::PathBuf;

use crate::config::RuleConfig;
use crate::organizer::{DEFAULT_JOBS, Sorter};
use crate::output::{ConsoleReporter, OutputFormatter};

/// Tidy a directory by shelving its entries into category subdirectories.
#[derive(Debug, Parser)]
#[command(name = "shelve", version)]
pub struct Cli {
    /// Directory to tidy.
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Leave subdirectories in place instead of relocating them.
    #[arg(long)]
    pub keep_folders: bool,

    /// Path to the JSON rule file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of worker threads.
    #[arg(long, default_value_t = DEFAULT_JOBS)]
    pub jobs: usize,
}

/// Runs one tidying pass with the parsed arguments.
///
/// The rule file is loaded before anything else; if it is missing or
/// malformed the run aborts without touching the filesystem.
pub fn run_cli(cli: &Cli) -> Result<(), String> {
    let rules = RuleConfig::load(cli.config.as_deref())
        .map_err(|e| format!("Error loading rules: {}", e))?
        .compile();

    if !cli.directory.is_dir() {
        return Err(format!(
            "Target directory does not exist: {}",
            cli.directory.display()
        ));
    }

    OutputFormatter::info(&format!("Tidying: {}", cli.directory.display()));

    let sorter = Sorter::new(&cli.directory, rules)
        .move_folders(!cli.keep_folders)
        .self_name(own_executable_name())
        .jobs(cli.jobs);

    let reporter = ConsoleReporter::new();
    let result = sorter.run(&reporter);
    reporter.finish();
    let summary = result.map_err(|e| format!("Run failed: {}", e))?;

    OutputFormatter::summary_table(&summary);
    OutputFormatter::success(&format!("Done. Moved {} items.", summary.moved()));

    Ok(())
}

/// File name of the running executable, so the tool never shelves itself.
fn own_executable_name() -> Option<String> {
    std::env::current_exe()
        .ok()?
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["shelve"]);
        assert_eq!(cli.directory, PathBuf::from("."));
        assert!(!cli.keep_folders);
        assert!(cli.config.is_none());
        assert_eq!(cli.jobs, DEFAULT_JOBS);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "shelve",
            "/tmp/downloads",
            "--keep-folders",
            "--config",
            "rules.json",
            "--jobs",
            "4",
        ]);
        assert_eq!(cli.directory, PathBuf::from("/tmp/downloads"));
        assert!(cli.keep_folders);
        assert_eq!(cli.config, Some(PathBuf::from("rules.json")));
        assert_eq!(cli.jobs, 4);
    }

    #[test]
    fn test_run_cli_missing_directory() {
        // Rules must load fine so the failure is the directory check itself.
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let rules_path = temp_dir.path().join("rules.json");
        std::fs::write(&rules_path, r#"{"categories": {"Docs": [".txt"]}}"#)
            .expect("Failed to write rules file");

        let cli = Cli::parse_from([
            "shelve",
            "/non/existent/dir",
            "--config",
            rules_path.to_str().expect("Path should be UTF-8"),
        ]);

        let error = run_cli(&cli).expect_err("Missing directory should fail");
        assert!(error.contains("Target directory does not exist"));
    }
}
