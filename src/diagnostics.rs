//! Caller-owned diagnostics.
//!
//! Ingestion and encoding never log warnings on their own. They push
//! [`Diagnostic`] entries into a [`Diagnostics`] collector handed in by the
//! caller, who decides whether to log, persist or drop them. [`DiagnosticLog`]
//! is the JSONL sink the CLI uses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub component: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl Diagnostic {
    pub fn new(level: Severity, component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            component: component.into(),
            message: message.into(),
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, ctx: serde_json::Value) -> Self {
        self.context = Some(ctx);
        self
    }
}

/// In-memory collector passed by `&mut` into ingest and encode calls.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, entry: Diagnostic) {
        self.entries.push(entry);
    }

    pub fn info(&mut self, component: impl Into<String>, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Info, component, message));
    }

    pub fn warn_with_context(
        &mut self,
        component: impl Into<String>,
        message: impl Into<String>,
        context: serde_json::Value,
    ) {
        self.push(Diagnostic::new(Severity::Warn, component, message).with_context(context));
    }

    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.level == Severity::Warn)
    }
}

/// Append-only JSONL file of diagnostics.
pub struct DiagnosticLog {
    file_path: PathBuf,
    writer: BufWriter<File>,
}

impl DiagnosticLog {
    /// Open (or create) the log for appending. Existing lines are left untouched.
    ///
    /// # Errors
    /// Returns an IO error if the file or its parent directory cannot be created.
    pub fn open(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();

        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        Ok(Self {
            file_path,
            writer: BufWriter::new(file),
        })
    }

    fn append(&mut self, entry: &Diagnostic) -> std::io::Result<()> {
        let json = serde_json::to_string(entry)?;
        writeln!(self.writer, "{json}")
    }

    /// Write every entry and flush.
    ///
    /// # Errors
    /// Returns an IO error on the first entry that cannot be written.
    pub fn append_all<'a>(
        &mut self,
        entries: impl IntoIterator<Item = &'a Diagnostic>,
    ) -> std::io::Result<()> {
        for entry in entries {
            self.append(entry)?;
        }
        self.writer.flush()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collector_filters_warnings() {
        let mut diags = Diagnostics::new();
        diags.info("cli", "encoded 1 message");
        diags.warn_with_context("google", "name fallback", serde_json::json!({"tool_call_id": "c9"}));
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.warnings().count(), 1);
        assert_eq!(diags.entries()[0].level, Severity::Info);
        assert!(!diags.is_empty());
    }

    #[test]
    fn test_log_appends_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("diagnostics.jsonl");

        {
            let mut log = DiagnosticLog::open(&path).unwrap();
            assert_eq!(log.path(), path.as_path());
            log.append_all(&[Diagnostic::new(Severity::Warn, "google", "first")])
                .unwrap();
        }
        {
            let mut log = DiagnosticLog::open(&path).unwrap();
            let entry = Diagnostic::new(Severity::Info, "cli", "second")
                .with_context(serde_json::json!({"role": "function"}));
            log.append_all([&entry]).unwrap();
        }

        let lines: Vec<Diagnostic> = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].message, "first");
        assert_eq!(lines[0].level, Severity::Warn);
        assert_eq!(lines[1].context.as_ref().unwrap()["role"], "function");
    }
}
