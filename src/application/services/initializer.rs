//! Service initializer - Runs each discovered service's `init` once

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::application::client::Client;
use crate::application::diagnostics::{DiagnosticKind, DiagnosticSink};
use crate::application::errors::{Fatal, ServiceInitError};
use crate::application::fault::{Fault, FaultBoundary};
use crate::domain::entities::{LoadedModule, ServiceHandle};

/// Summary of a service initialization pass
#[derive(Debug, Default)]
pub struct ServiceReport {
    pub initialized: Vec<String>,
    /// Services without an `init` capability
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
    /// Set when a service asked for the process to stop
    pub fatal: Option<ServiceInitError>,
}

pub struct ServiceInitializer {
    diagnostics: Arc<dyn DiagnosticSink>,
    started: AtomicBool,
}

impl ServiceInitializer {
    pub fn new(diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            diagnostics,
            started: AtomicBool::new(false),
        }
    }

    /// Turn successfully loaded modules into service handles
    pub fn handles(modules: &[LoadedModule]) -> Vec<ServiceHandle> {
        modules
            .iter()
            .filter_map(|loaded| {
                let module = loaded.result.as_ref().ok()?;
                Some(ServiceHandle {
                    name: loaded.file_name(),
                    path: loaded.path.clone(),
                    init: module.init.clone(),
                })
            })
            .collect()
    }

    /// Call `init(client)` on every service in order.
    ///
    /// Failures are reported and the next service still runs, except for a
    /// [`Fatal`] failure which stops the pass. Only the first call runs.
    pub async fn init_all(&self, services: &[ServiceHandle], client: Arc<Client>) -> ServiceReport {
        let mut report = ServiceReport::default();
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("Services were already initialized");
            return report;
        }

        tracing::info!(count = services.len(), "Running services");

        for service in services {
            let Some(init) = &service.init else {
                tracing::debug!(service = %service.name, "Service has no init hook");
                report.skipped.push(service.name.clone());
                continue;
            };

            let boundary = FaultBoundary::new(
                DiagnosticKind::ServiceInit,
                service.name.clone(),
                self.diagnostics.clone(),
            );
            match boundary.guard(init.init(client.clone())).await {
                Ok(()) => {
                    tracing::debug!(service = %service.name, "Service initialized");
                    report.initialized.push(service.name.clone());
                }
                Err(Fault::Error(e)) if e.is::<Fatal>() => {
                    report.fatal = Some(ServiceInitError::Fatal {
                        service: service.name.clone(),
                        reason: e.to_string(),
                    });
                    break;
                }
                Err(_) => report.failed.push(service.name.clone()),
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::diagnostics::MemorySink;
    use crate::application::errors::BoxError;
    use crate::domain::traits::service_fn;
    use crate::infrastructure::adapters::memory::{MemoryGateway, RecordingResponder};
    use std::sync::Mutex;

    fn client() -> Arc<Client> {
        Client::builder(Arc::new(MemoryGateway::new()), Arc::new(RecordingResponder::new())).build()
    }

    fn tracked(name: &str, log: &Arc<Mutex<Vec<String>>>, fail: Option<&'static str>) -> ServiceHandle {
        let log = log.clone();
        let tag = name.to_string();
        ServiceHandle::new(
            name,
            Some(service_fn(move |_client| {
                let log = log.clone();
                let tag = tag.clone();
                async move {
                    log.lock().unwrap().push(tag);
                    match fail {
                        Some(msg) => Err::<(), BoxError>(BoxError::from(msg)),
                        None => Ok(()),
                    }
                }
            })),
        )
    }

    #[tokio::test]
    async fn test_runs_in_order_and_isolates_failures() {
        let sink = Arc::new(MemorySink::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let services = vec![
            tracked("cache.yaml", &log, None),
            tracked("broken.yaml", &log, Some("cannot start")),
            ServiceHandle::new("passive.yaml", None),
            tracked("metrics.yaml", &log, None),
        ];

        let report = ServiceInitializer::new(sink.clone()).init_all(&services, client()).await;

        assert_eq!(*log.lock().unwrap(), vec!["cache.yaml", "broken.yaml", "metrics.yaml"]);
        assert_eq!(report.initialized, vec!["cache.yaml", "metrics.yaml"]);
        assert_eq!(report.failed, vec!["broken.yaml"]);
        assert_eq!(report.skipped, vec!["passive.yaml"]);
        assert!(report.fatal.is_none());
        assert_eq!(sink.count(DiagnosticKind::ServiceInit), 1);
    }

    #[tokio::test]
    async fn test_fatal_stops_the_pass() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let fatal = ServiceHandle::new(
            "database.yaml",
            Some(service_fn(|_client| async {
                Err::<(), BoxError>(Box::new(Fatal("connection refused".to_string())))
            })),
        );
        let services = vec![fatal, tracked("after.yaml", &log, None)];

        let report = ServiceInitializer::new(Arc::new(MemorySink::new()))
            .init_all(&services, client())
            .await;

        assert!(matches!(
            report.fatal,
            Some(ServiceInitError::Fatal { ref service, .. }) if service == "database.yaml"
        ));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_init_runs_at_most_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let services = vec![tracked("once.yaml", &log, None)];
        let initializer = ServiceInitializer::new(Arc::new(MemorySink::new()));

        initializer.init_all(&services, client()).await;
        let second = initializer.init_all(&services, client()).await;

        assert!(second.initialized.is_empty());
        assert_eq!(log.lock().unwrap().len(), 1);
    }
}
