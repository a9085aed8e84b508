//! Diagnostics - Non-fatal failure reports from isolated units

use std::fmt;
use std::sync::Mutex;

/// What kind of unit failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Load,
    Validation,
    Handler,
    ServiceInit,
    Registration,
    Execution,
    UnknownCommand,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &str {
        match self {
            DiagnosticKind::Load => "load",
            DiagnosticKind::Validation => "validation",
            DiagnosticKind::Handler => "handler",
            DiagnosticKind::ServiceInit => "service-init",
            DiagnosticKind::Registration => "registration",
            DiagnosticKind::Execution => "execution",
            DiagnosticKind::UnknownCommand => "unknown-command",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failure report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Module, binding, service or command the failure belongs to
    pub unit: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            unit: unit.into(),
            message: message.into(),
        }
    }
}

/// Receives diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Writes diagnostics to the tracing subscriber
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, d: Diagnostic) {
        match d.kind {
            DiagnosticKind::Load | DiagnosticKind::Validation | DiagnosticKind::UnknownCommand => {
                tracing::warn!(kind = %d.kind, unit = %d.unit, "{}", d.message);
            }
            _ => {
                tracing::error!(kind = %d.kind, unit = %d.unit, "{}", d.message);
            }
        }
    }
}

/// Keeps diagnostics in memory
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries
            .lock()
            .map(|e| e.iter().filter(|d| d.kind == kind).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().map(|e| e.is_empty()).unwrap_or(true)
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        tracing::debug!(kind = %diagnostic.kind, unit = %diagnostic.unit, "{}", diagnostic.message);
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(diagnostic);
        }
    }
}
