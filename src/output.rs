//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored
//! messages, a progress bar, and the final summary table. Worker threads emit
//! their per-item records through [`ConsoleReporter`], which routes every line
//! through the progress bar so concurrent output never garbles it.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

use crate::organizer::{Outcome, Reporter, Summary};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for entry processing.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints the run summary: per-category move counts and the
    /// moved/skipped/failed totals.
    pub fn summary_table(summary: &Summary) {
        Self::header("SUMMARY");

        let mut category_counts: HashMap<&str, usize> = HashMap::new();
        for outcome in &summary.outcomes {
            if let Outcome::Moved { category, .. } = outcome {
                *category_counts.entry(category.as_str()).or_insert(0) += 1;
            }
        }

        // Sort categories for consistent output
        let mut categories: Vec<_> = category_counts.into_iter().collect();
        categories.sort_by_key(|&(name, _)| name);

        let max_category_len = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Moved".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in &categories {
            println!(
                "{:<width$} | {}",
                category,
                count.to_string().green(),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "Processed {} entries: {} moved, {} skipped, {} failed",
            summary.total(),
            summary.moved().to_string().green().bold(),
            summary.skipped().to_string().yellow(),
            if summary.failed() == 0 {
                summary.failed().to_string().normal()
            } else {
                summary.failed().to_string().red().bold()
            }
        );
    }
}

/// Reporter that prints one styled line per event and drives a progress bar.
///
/// `ProgressBar` is internally reference-counted and thread-safe, and
/// `println` suspends the bar while writing, so worker threads can report
/// concurrently without interleaving partial lines.
pub struct ConsoleReporter {
    bar: ProgressBar,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            bar: OutputFormatter::create_progress_bar(0),
        }
    }

    /// Clears the progress bar once the run is over.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ConsoleReporter {
    /// A reporter abandoned on an error path must still clear its bar so the
    /// terminal isn't left with a stale progress line.
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl Reporter for ConsoleReporter {
    fn dir_created(&self, name: &str) {
        self.bar
            .println(format!("{} Created directory: {}/", "✓".green(), name));
    }

    fn scanned(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn error(&self, message: &str) {
        self.bar.println(format!("{} {}", "✗".red(), message));
    }

    fn outcome(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Moved { name, category, .. } => {
                self.bar
                    .println(format!("{} {} -> {}/", "✓".green(), name, category));
            }
            Outcome::Skipped { name, reason } => {
                self.bar.println(format!(
                    "{} Skipped {} ({})",
                    "•".yellow(),
                    name,
                    reason
                ));
            }
            Outcome::Failed { name, error } => {
                self.bar
                    .println(format!("{} {}: {}", "✗".red(), name, error));
            }
        }
        self.bar.inc(1);
    }
}
