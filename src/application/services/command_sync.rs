//! Remote command sync - Replaces the remote command set with the local one

use serde_json::Value;
use std::sync::Arc;

use crate::application::diagnostics::{DiagnosticKind, DiagnosticSink};
use crate::application::errors::{BoxError, RegistrationError};
use crate::application::fault::{Fault, FaultBoundary};
use crate::domain::traits::{CommandRegistrar, SyncTarget};

/// Result of one sync; not persisted
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub success: bool,
    pub count: usize,
    pub error: Option<RegistrationError>,
}

impl RegistrationOutcome {
    /// A successful sync of an empty list, i.e. the remote set was cleared
    pub fn is_clear(&self) -> bool {
        self.success && self.count == 0
    }
}

pub struct RemoteCommandSync {
    registrar: Arc<dyn CommandRegistrar>,
    target: SyncTarget,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl RemoteCommandSync {
    pub fn new(
        registrar: Arc<dyn CommandRegistrar>,
        target: SyncTarget,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            registrar,
            target,
            diagnostics,
        }
    }

    /// Push `descriptors` as one full replace. An empty list still goes out.
    pub async fn sync(&self, descriptors: &[Value]) -> RegistrationOutcome {
        let count = descriptors.len();
        let unit = match &self.target.guild_id {
            Some(guild) => format!("{}/{}", self.target.application_id, guild),
            None => self.target.application_id.clone(),
        };
        let boundary = FaultBoundary::new(DiagnosticKind::Registration, unit, self.diagnostics.clone());

        let result = boundary
            .guard(async {
                self.registrar
                    .put_commands(&self.target, descriptors)
                    .await
                    .map_err(BoxError::from)
            })
            .await;

        match result {
            Ok(()) => {
                if count == 0 {
                    tracing::warn!("No commands to register, remote command list cleared");
                } else {
                    tracing::info!("Successfully registered {} application command(s)", count);
                }
                RegistrationOutcome {
                    success: true,
                    count,
                    error: None,
                }
            }
            Err(fault) => {
                let error = match fault {
                    Fault::Error(e) => match e.downcast::<RegistrationError>() {
                        Ok(e) => *e,
                        Err(other) => RegistrationError::Network(other.to_string()),
                    },
                    Fault::Panic(msg) => RegistrationError::Panicked(msg),
                };
                RegistrationOutcome {
                    success: false,
                    count,
                    error: Some(error),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::diagnostics::MemorySink;
    use crate::infrastructure::adapters::memory::MemoryRegistrar;
    use serde_json::json;

    fn target() -> SyncTarget {
        SyncTarget {
            application_id: "app".to_string(),
            guild_id: Some("guild".to_string()),
        }
    }

    #[tokio::test]
    async fn test_sync_sends_full_list() {
        let registrar = Arc::new(MemoryRegistrar::new());
        let sync = RemoteCommandSync::new(registrar.clone(), target(), Arc::new(MemorySink::new()));
        let commands = vec![json!({"name": "ping"}), json!({"name": "ban"})];

        let outcome = sync.sync(&commands).await;
        assert!(outcome.success);
        assert_eq!(outcome.count, 2);
        assert!(!outcome.is_clear());

        let puts = registrar.puts();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].0, target());
        assert_eq!(puts[0].1, commands);
    }

    #[tokio::test]
    async fn test_empty_sync_still_runs() {
        let registrar = Arc::new(MemoryRegistrar::new());
        let sync = RemoteCommandSync::new(registrar.clone(), target(), Arc::new(MemorySink::new()));

        let outcome = sync.sync(&[]).await;
        assert!(outcome.is_clear());
        assert_eq!(registrar.puts().len(), 1);
        assert!(registrar.puts()[0].1.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_sync_is_independent() {
        let registrar = Arc::new(MemoryRegistrar::new());
        let sync = RemoteCommandSync::new(registrar.clone(), target(), Arc::new(MemorySink::new()));
        let commands = vec![json!({"name": "ping"})];

        let first = sync.sync(&commands).await;
        let second = sync.sync(&commands).await;

        assert!(first.success && second.success);
        assert_eq!((first.count, second.count), (1, 1));
        assert_eq!(registrar.current(), commands);
        assert_eq!(registrar.puts().len(), 2);
    }

    #[tokio::test]
    async fn test_remote_failure_is_reported() {
        let registrar = Arc::new(MemoryRegistrar::new());
        registrar.fail_with(RegistrationError::Rejected {
            status: 400,
            body: "invalid form body".to_string(),
        });
        let sink = Arc::new(MemorySink::new());
        let sync = RemoteCommandSync::new(registrar, target(), sink.clone());

        let outcome = sync.sync(&[json!({"name": "ping"})]).await;
        assert!(!outcome.success);
        assert!(matches!(outcome.error, Some(RegistrationError::Rejected { status: 400, .. })));
        assert_eq!(sink.count(DiagnosticKind::Registration), 1);
        assert_eq!(sink.entries()[0].unit, "app/guild");
    }
}
