//! Interpretation of nvm's free-text output.
//!
//! nvm reports several outcomes only through wording, and nvm-windows often
//! exits with status 0 even when a command failed. Everything that depends on
//! that wording lives here so the phrasing can be tracked in one place.

use nodepin_backend::{BackendError, UseOutcome, parse_version};

/// nvm-sh: `N/A: version "v18.0.0 -> N/A" is not yet installed.`
/// nvm-windows: `node v18.0.0 (64-bit) is not installed.`
const NOT_INSTALLED_MARKERS: [&str; 2] = ["is not yet installed", "is not installed"];

/// nvm-windows failures that are printed to stdout with exit status 0.
const SILENT_FAILURE_MARKERS: [&str; 3] = ["activation error", "access is denied", "exit status"];

/// nvm-sh: `Version '99.0.0' not found - try \`nvm ls-remote\``
/// nvm-windows: `Version 99.0.0 is not available.`, `Download failed. Rolling Back.`,
/// `Error retrieving "https://...": ...`, `Could not retrieve ...`,
/// `"20.x" is not a valid version.`
const INSTALL_FAILURE_MARKERS: [&str; 6] = [
    "not found - try",
    "is not available",
    "download failed",
    "error retrieving",
    "could not retrieve",
    "is not a valid version",
];

/// Turn the result of `nvm use <version>` into a [`UseOutcome`].
#[must_use]
pub fn classify_use_output(success: bool, stdout: &str, stderr: &str) -> UseOutcome {
    let combined = format!("{stdout}\n{stderr}").to_lowercase();

    if NOT_INSTALLED_MARKERS.iter().any(|m| combined.contains(m)) {
        return UseOutcome::NotInstalled;
    }

    if success && !SILENT_FAILURE_MARKERS.iter().any(|m| combined.contains(m)) {
        return UseOutcome::Activated;
    }

    UseOutcome::Failed(first_line(stderr).or_else(|| first_line(stdout)).map_or_else(
        || "nvm use exited with an error".to_string(),
        str::to_string,
    ))
}

/// Check the result of `nvm install <version>`.
///
/// # Errors
/// Returns [`BackendError::InstallFailed`] when the command failed or printed
/// a known failure message.
pub fn check_install_output(success: bool, stdout: &str, stderr: &str) -> Result<(), BackendError> {
    let combined = format!("{stdout}\n{stderr}").to_lowercase();

    if success && !INSTALL_FAILURE_MARKERS.iter().any(|m| combined.contains(m)) {
        return Ok(());
    }

    let details = failure_line(stderr)
        .or_else(|| failure_line(stdout))
        .or_else(|| first_line(stderr))
        .or_else(|| first_line(stdout))
        .unwrap_or("nvm install exited with an error");
    Err(BackendError::install_failed("nvm install", details))
}

fn failure_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| {
        let line = line.to_lowercase();
        INSTALL_FAILURE_MARKERS.iter().any(|m| line.contains(m))
    })
}

/// Parse the output of `nvm current`.
///
/// # Errors
/// Returns a parse error when the output is neither a version nor one of the
/// known "nothing active" replies.
pub fn parse_current(output: &str) -> Result<Option<String>, BackendError> {
    let output = output.trim();
    let lower = output.to_lowercase();

    if output.is_empty()
        || lower == "none"
        || lower == "system"
        || lower.starts_with("no current version")
    {
        return Ok(None);
    }

    Ok(Some(parse_version(output)?))
}

/// Remove ANSI escape sequences that nvm emits despite `NO_COLOR`.
#[must_use]
pub fn clean_output(output: &str) -> String {
    let mut cleaned = String::with_capacity(output.len());
    let mut chars = output.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for next in chars.by_ref() {
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            continue;
        }
        cleaned.push(c);
    }

    cleaned
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}
