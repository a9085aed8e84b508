//! Event dispatcher - Binds discovered handlers to the client's event stream
//!
//! Each binding gets its own worker task fed by a channel. The client
//! listener only enqueues, so a slow or failing handler never holds up the
//! emitter or other bindings, and every binding sees events in arrival order.

use std::sync::Arc;
use tokio::sync::mpsc;

use super::client::Client;
use super::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use super::errors::ValidationError;
use super::fault::FaultBoundary;
use crate::domain::entities::{EventBinding, GatewayEvent, LoadedModule};

/// Identity of an installed binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundHandler {
    pub event_name: String,
    pub source: String,
}

pub struct EventDispatcher {
    client: Arc<Client>,
    diagnostics: Arc<dyn DiagnosticSink>,
    bound: Vec<BoundHandler>,
}

impl EventDispatcher {
    pub fn new(client: Arc<Client>) -> Self {
        let diagnostics = client.diagnostics().clone();
        Self {
            client,
            diagnostics,
            bound: Vec::new(),
        }
    }

    /// Fire `binding` on every occurrence of its event.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(&mut self, binding: EventBinding) {
        self.install(binding, false);
    }

    /// Fire `binding` on the next occurrence of its event only
    pub fn bind_once(&mut self, binding: EventBinding) {
        self.install(binding, true);
    }

    fn install(&mut self, binding: EventBinding, once: bool) {
        let EventBinding {
            event_name,
            handler,
            source,
        } = binding;

        let (tx, mut rx) = mpsc::unbounded_channel::<GatewayEvent>();
        let client = Arc::downgrade(&self.client);
        let boundary = FaultBoundary::new(
            DiagnosticKind::Handler,
            format!("{}/{}", event_name, source),
            self.diagnostics.clone(),
        );

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let Some(client) = client.upgrade() else {
                    break;
                };
                boundary.run(handler.handle(client, event)).await;
            }
        });

        let listener = Arc::new(move |event: &GatewayEvent| {
            // Receiver only goes away when the client does
            let _ = tx.send(event.clone());
        });
        if once {
            self.client.once(&event_name, listener);
        } else {
            self.client.on(&event_name, listener);
        }

        tracing::debug!(event = %event_name, %source, "Bound event handler");
        self.bound.push(BoundHandler { event_name, source });
    }

    /// Bind every loaded module of every event group.
    ///
    /// Load failures were already reported by the loader and are skipped;
    /// modules without a handler are reported and skipped.
    pub fn bind_all(&mut self, groups: &[(String, Vec<LoadedModule>)]) -> usize {
        let mut bound = 0;
        for (event_name, modules) in groups {
            for loaded in modules {
                let Ok(module) = &loaded.result else {
                    continue;
                };
                let source = loaded.file_name();
                match &module.handler {
                    Some(handler) => {
                        self.bind(EventBinding::new(event_name.clone(), source, handler.clone()));
                        bound += 1;
                    }
                    None => {
                        self.diagnostics.report(Diagnostic::new(
                            DiagnosticKind::Validation,
                            format!("{}/{}", event_name, source),
                            format!("Skipping event module: {}", ValidationError::MissingHandler),
                        ));
                    }
                }
            }
        }
        bound
    }

    pub fn bindings(&self) -> &[BoundHandler] {
        &self.bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::diagnostics::MemorySink;
    use crate::application::errors::{BoxError, LoadError};
    use crate::domain::entities::PluginModule;
    use crate::domain::traits::handler_fn;
    use crate::infrastructure::adapters::memory::{MemoryGateway, RecordingResponder};
    use serde_json::json;
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

    fn setup() -> (EventDispatcher, Arc<Client>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let client = Client::builder(Arc::new(MemoryGateway::new()), Arc::new(RecordingResponder::new()))
            .with_diagnostics(sink.clone())
            .build();
        (EventDispatcher::new(client.clone()), client, sink)
    }

    fn custom(name: &str, n: i64) -> GatewayEvent {
        GatewayEvent::custom(name, json!(n))
    }

    /// Handler that forwards `tag:payload` to a channel
    fn reporting(tag: &'static str, tx: UnboundedSender<String>) -> EventBinding {
        let handler = handler_fn(move |_client, event| {
            let tx = tx.clone();
            async move {
                if let GatewayEvent::Custom { payload, .. } = event {
                    let _ = tx.send(format!("{}:{}", tag, payload));
                }
                Ok::<(), BoxError>(())
            }
        });
        EventBinding::new("tick", format!("{}.yaml", tag), handler)
    }

    async fn next(rx: &mut UnboundedReceiver<String>) -> String {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("handler did not fire")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_multiple_bindings_all_fire() {
        let (mut dispatcher, client, _) = setup();
        let (tx, mut rx) = unbounded_channel();
        dispatcher.bind(reporting("a", tx.clone()));
        dispatcher.bind(reporting("b", tx));

        client.emit(custom("tick", 1));

        let mut seen = vec![next(&mut rx).await, next(&mut rx).await];
        seen.sort();
        assert_eq!(seen, vec!["a:1", "b:1"]);
        assert_eq!(dispatcher.bindings().len(), 2);
    }

    #[tokio::test]
    async fn test_per_binding_order_matches_arrival() {
        let (mut dispatcher, client, _) = setup();
        let (tx, mut rx) = unbounded_channel();
        dispatcher.bind(reporting("a", tx));

        for n in 0..20 {
            client.emit(custom("tick", n));
        }
        for n in 0..20 {
            assert_eq!(next(&mut rx).await, format!("a:{}", n));
        }
    }

    #[tokio::test]
    async fn test_failing_handler_is_isolated() {
        let (mut dispatcher, client, sink) = setup();
        let (tx, mut rx) = unbounded_channel();

        dispatcher.bind(EventBinding::new(
            "tick",
            "broken.yaml",
            handler_fn(|_client, _event| async { Err::<(), BoxError>(BoxError::from("handler threw")) }),
        ));
        dispatcher.bind(EventBinding::new(
            "tick",
            "panics.yaml",
            handler_fn(|_client, event| async move {
                if matches!(event, GatewayEvent::Custom { .. }) {
                    panic!("handler panicked");
                }
                Ok::<(), BoxError>(())
            }),
        ));
        dispatcher.bind(reporting("ok", tx));

        client.emit(custom("tick", 1));
        client.emit(custom("tick", 2));

        assert_eq!(next(&mut rx).await, "ok:1");
        assert_eq!(next(&mut rx).await, "ok:2");

        // Failures are reported per binding, per event
        tokio::time::timeout(Duration::from_secs(2), async {
            while sink.count(DiagnosticKind::Handler) < 4 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("failures were not reported");

        let units: Vec<String> = sink.entries().into_iter().map(|d| d.unit).collect();
        assert!(units.contains(&"tick/broken.yaml".to_string()));
        assert!(units.contains(&"tick/panics.yaml".to_string()));
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_affect_other_events() {
        let (mut dispatcher, client, sink) = setup();
        let (tx, mut rx) = unbounded_channel();

        dispatcher.bind(EventBinding::new(
            "tock",
            "broken.yaml",
            handler_fn(|_client, _event| async { Err::<(), BoxError>(BoxError::from("handler threw")) }),
        ));
        dispatcher.bind(reporting("ok", tx));

        for n in 1..=2 {
            client.emit(custom("tock", n));
            client.emit(custom("tick", n));
        }

        assert_eq!(next(&mut rx).await, "ok:1");
        assert_eq!(next(&mut rx).await, "ok:2");

        tokio::time::timeout(Duration::from_secs(2), async {
            while sink.count(DiagnosticKind::Handler) < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("failures were not reported");
        assert!(sink.entries().iter().all(|d| d.unit == "tock/broken.yaml"));
    }

    #[tokio::test]
    async fn test_bind_once() {
        let (mut dispatcher, client, _) = setup();
        let (tx, mut rx) = unbounded_channel();
        dispatcher.bind_once(reporting("once", tx));

        client.emit(custom("tick", 1));
        client.emit(custom("tick", 2));

        assert_eq!(next(&mut rx).await, "once:1");
        assert!(tokio::time::timeout(Duration::from_millis(50), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_bind_all_skips_modules_without_handler() {
        let (mut dispatcher, client, sink) = setup();
        let (tx, mut rx) = unbounded_channel();
        let forward = reporting("grouped", tx).handler;

        let groups = vec![(
            "tick".to_string(),
            vec![
                LoadedModule {
                    name: "grouped".to_string(),
                    path: PathBuf::from("events/tick/grouped.yaml"),
                    result: Ok(PluginModule::new().with_handler(forward)),
                },
                LoadedModule {
                    name: "empty".to_string(),
                    path: PathBuf::from("events/tick/empty.yaml"),
                    result: Ok(PluginModule::new()),
                },
                LoadedModule {
                    name: "broken".to_string(),
                    path: PathBuf::from("events/tick/broken.yaml"),
                    result: Err(LoadError::Parse("bad".to_string())),
                },
            ],
        )];

        assert_eq!(dispatcher.bind_all(&groups), 1);
        assert_eq!(
            dispatcher.bindings(),
            &[BoundHandler {
                event_name: "tick".to_string(),
                source: "grouped.yaml".to_string()
            }]
        );
        assert_eq!(sink.count(DiagnosticKind::Validation), 1);

        client.emit(custom("tick", 5));
        assert_eq!(next(&mut rx).await, "grouped:5");
    }
}
