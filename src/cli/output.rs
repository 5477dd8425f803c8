//! Output formatting and progress indicators
//!
//! This module provides utilities for displaying progress bars,
//! run reports, and formatted messages to the user.

use std::sync::OnceLock;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;

use crate::core::report::{ReleaseReport, Status};

static OUTPUT: OnceLock<OutputConfig> = OnceLock::new();

/// Global output settings taken from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Suppress everything but errors
    pub quiet: bool,
    /// Emit machine-readable JSON
    pub json: bool,
    /// Verbosity level (number of `-v`)
    pub verbose: u8,
}

impl OutputConfig {
    /// Create an output configuration
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Install this configuration for the rest of the process
    ///
    /// Only the first call has an effect.
    pub fn apply_global(self) {
        let _ = OUTPUT.set(self);
    }

    /// The installed configuration, or the default if none was applied
    pub fn global() -> Self {
        OUTPUT.get().copied().unwrap_or_default()
    }

    /// Whether progress bars should be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    if !OutputConfig::global().show_progress() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Create a progress bar for target builds
pub fn create_build_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if !OutputConfig::global().show_progress() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} targets ({msg})")
            .expect("Invalid progress bar template")
            .progress_chars("█▓▒░"),
    );
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Print a line unless output is quiet or JSON
pub fn info(message: &str) {
    let config = OutputConfig::global();
    if !config.quiet && !config.json {
        println!("{message}");
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render a report as human-readable lines
pub fn format_report(report: &ReleaseReport) -> Vec<String> {
    let mut lines = Vec::new();
    for target in &report.targets {
        match target.status {
            Status::Ok => lines.push(format!(
                "{} {} -> {}",
                status::SUCCESS,
                target.target,
                target
                    .archive
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            )),
            Status::Failed => lines.push(format!(
                "{} {}: {}",
                status::ERROR,
                target.target,
                target.error.as_deref().unwrap_or("failed")
            )),
        }
        for package in &target.packages {
            match package.status {
                Status::Ok => lines.push(format!(
                    "    {} {} -> {}",
                    status::SUCCESS,
                    package.format,
                    package
                        .path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                )),
                Status::Failed => lines.push(format!(
                    "    {} {}: {}",
                    status::ERROR,
                    package.format,
                    package.error.as_deref().unwrap_or("failed")
                )),
            }
        }
    }

    for path in &report.collected {
        lines.push(format!("{} collected {}", status::INFO, path.display()));
    }

    let prefix = if report.has_failures() {
        status::WARNING
    } else {
        status::SUCCESS
    };
    lines.push(format!(
        "{prefix} mufiz {}: {} archive(s), {} package(s), {} of {} target(s) failed",
        report.version,
        report.archive_count(),
        report.package_count(),
        report.failed_count(),
        report.targets.len()
    ));
    if let Some(checksums) = &report.checksums {
        lines.push(format!("  Checksums: {}", checksums.display()));
    }
    lines
}

/// Print a report according to the global output settings
pub fn print_report(report: &ReleaseReport) -> anyhow::Result<()> {
    let config = OutputConfig::global();
    if config.json {
        return print_json(report);
    }
    let lines = format_report(report);
    if config.quiet {
        // Failures still reach stderr.
        if report.has_failures() {
            for line in lines.iter().filter(|l| l.starts_with(status::ERROR)) {
                eprintln!("{line}");
            }
        }
        return Ok(());
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// Print an error and its causes to stderr
pub fn display_error(error: &anyhow::Error) {
    if OutputConfig::global().json {
        let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
        let value = serde_json::json!({
            "error": error.to_string(),
            "causes": causes,
        });
        eprintln!("{value}");
        return;
    }

    eprintln!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}
