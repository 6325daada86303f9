//! Ordered check log with coloured console output and an optional JSON report.

use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs,
    io::{self, Write},
    path::Path,
};

const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

/// Outcome of one named check. Never modified once recorded.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: String::new(),
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    run_id: &'a str,
    version: &'a str,
    passed: usize,
    failed: usize,
    results: &'a [CheckResult],
}

pub struct Reporter<W: Write> {
    out: W,
    color: bool,
    results: Vec<CheckResult>,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            results: Vec::new(),
        }
    }

    /// # Errors
    /// Returns an error if the output cannot be written.
    pub fn section(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out, "\n--- {title} ---")
    }

    /// Print `result` and append it to the log.
    ///
    /// # Errors
    /// Returns an error if the output cannot be written.
    pub fn record(&mut self, result: CheckResult) -> io::Result<()> {
        let (label, color) = if result.passed {
            ("PASS", GREEN)
        } else {
            ("FAIL", RED)
        };

        if self.color {
            write!(self.out, "{color}[{label}] {}{RESET}", result.name)?;
        } else {
            write!(self.out, "[{label}] {}", result.name)?;
        }

        if result.message.is_empty() {
            writeln!(self.out)?;
        } else {
            writeln!(self.out, " {}", result.message)?;
        }

        self.results.push(result);
        Ok(())
    }

    /// # Errors
    /// Returns an error if the output cannot be written.
    pub fn summary(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "\n{}/{} checks passed",
            self.passed(),
            self.results.len()
        )
    }

    #[must_use]
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|result| result.passed).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    /// Write the log as pretty JSON to `path`.
    ///
    /// # Errors
    /// Returns an error if serialization or the file write fails.
    pub fn write_json(&self, path: &Path, run_id: &str) -> Result<()> {
        let report = JsonReport {
            run_id,
            version: env!("CARGO_PKG_VERSION"),
            passed: self.passed(),
            failed: self.failed(),
            results: &self.results,
        };

        let json = serde_json::to_string_pretty(&report)?;

        fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
