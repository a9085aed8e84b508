//! Fault boundary - Keeps a unit's failure from escaping it
//!
//! Every dynamically loaded unit (event handler, service init, command
//! executor) runs behind a [`FaultBoundary`]. Errors and panics are turned
//! into a [`Fault`] and reported to the diagnostic sink; nothing unwinds
//! past the boundary.

use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use super::errors::BoxError;

/// How a guarded unit failed
#[derive(Debug)]
pub enum Fault {
    Error(BoxError),
    Panic(String),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Error(e) => write!(f, "{}", e),
            Fault::Panic(msg) => write!(f, "panicked: {}", msg),
        }
    }
}

/// Wraps one unit and reports its failures
#[derive(Clone)]
pub struct FaultBoundary {
    kind: DiagnosticKind,
    unit: String,
    sink: Arc<dyn DiagnosticSink>,
}

impl FaultBoundary {
    pub fn new(kind: DiagnosticKind, unit: impl Into<String>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            kind,
            unit: unit.into(),
            sink,
        }
    }

    /// Run `fut`, converting errors and panics into a reported [`Fault`]
    pub async fn guard<T, F>(&self, fut: F) -> Result<T, Fault>
    where
        F: Future<Output = Result<T, BoxError>>,
    {
        let fault = match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => Fault::Error(e),
            Err(payload) => Fault::Panic(panic_message(payload.as_ref())),
        };
        self.sink
            .report(Diagnostic::new(self.kind, self.unit.clone(), fault.to_string()));
        Err(fault)
    }

    /// Non-throwing form of [`guard`](Self::guard)
    pub async fn run<T, F>(&self, fut: F) -> Option<T>
    where
        F: Future<Output = Result<T, BoxError>>,
    {
        self.guard(fut).await.ok()
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::diagnostics::MemorySink;

    fn boundary(sink: &Arc<MemorySink>) -> FaultBoundary {
        FaultBoundary::new(DiagnosticKind::Handler, "ready/greet.yaml", sink.clone())
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let sink = Arc::new(MemorySink::new());
        let value = boundary(&sink).guard(async { Ok::<_, BoxError>(7) }).await;
        assert_eq!(value.ok(), Some(7));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_error_is_reported() {
        let sink = Arc::new(MemorySink::new());
        let result = boundary(&sink)
            .run(async { Err::<(), BoxError>("boom".into()) })
            .await;
        assert!(result.is_none());

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, DiagnosticKind::Handler);
        assert_eq!(entries[0].unit, "ready/greet.yaml");
        assert_eq!(entries[0].message, "boom");
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let sink = Arc::new(MemorySink::new());
        let result = boundary(&sink)
            .guard(async {
                if sink.is_empty() {
                    panic!("handler exploded");
                }
                Ok::<(), BoxError>(())
            })
            .await;

        match result {
            Err(Fault::Panic(msg)) => assert_eq!(msg, "handler exploded"),
            other => panic!("expected a panic fault, got {:?}", other),
        }
        assert_eq!(sink.count(DiagnosticKind::Handler), 1);
    }
}
