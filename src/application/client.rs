//! Client - The single shared connection handle
//!
//! Owns the event subscriptions and the collaborator handles every plugin
//! talks through. Created once at startup and shared for the process lifetime.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
use super::errors::GatewayError;
use super::fault::panic_message;
use super::registry::CommandRegistry;
use crate::domain::entities::GatewayEvent;
use crate::domain::traits::{Gateway, InteractionResponder};

/// Callback subscribed to an event name. Must not block.
pub type Listener = Arc<dyn Fn(&GatewayEvent) + Send + Sync>;

struct Subscription {
    listener: Listener,
    once: bool,
    fired: AtomicBool,
}

pub struct Client {
    application_id: String,
    commands: Arc<CommandRegistry>,
    gateway: Arc<dyn Gateway>,
    responder: Arc<dyn InteractionResponder>,
    diagnostics: Arc<dyn DiagnosticSink>,
    subscriptions: RwLock<HashMap<String, Vec<Arc<Subscription>>>>,
    ready: AtomicBool,
}

impl Client {
    pub fn builder(gateway: Arc<dyn Gateway>, responder: Arc<dyn InteractionResponder>) -> ClientBuilder {
        ClientBuilder {
            application_id: String::new(),
            commands: Arc::new(CommandRegistry::new()),
            gateway,
            responder,
            diagnostics: Arc::new(TracingSink),
        }
    }

    /// Subscribe to every occurrence of `event`
    pub fn on(&self, event: &str, listener: Listener) {
        self.subscribe(event, listener, false);
    }

    /// Subscribe to the next occurrence of `event` only
    pub fn once(&self, event: &str, listener: Listener) {
        self.subscribe(event, listener, true);
    }

    fn subscribe(&self, event: &str, listener: Listener, once: bool) {
        let subscription = Arc::new(Subscription {
            listener,
            once,
            fired: AtomicBool::new(false),
        });
        match self.subscriptions.write() {
            Ok(mut subs) => subs.entry(event.to_string()).or_default().push(subscription),
            Err(_) => tracing::error!(event, "Subscription table poisoned, listener dropped"),
        }
    }

    /// Deliver `event` to its listeners in subscription order.
    ///
    /// Events with no listeners are dropped. A panicking listener is
    /// reported and the remaining listeners still run.
    pub fn emit(&self, event: GatewayEvent) {
        if matches!(event, GatewayEvent::Ready(_)) {
            self.ready.store(true, Ordering::SeqCst);
        }

        let listeners: Vec<Arc<Subscription>> = match self.subscriptions.read() {
            Ok(subs) => subs.get(event.name()).cloned().unwrap_or_default(),
            Err(_) => return,
        };

        for sub in listeners {
            if sub.once && sub.fired.swap(true, Ordering::SeqCst) {
                continue;
            }
            let listener = &sub.listener;
            if let Err(payload) = std::panic::catch_unwind(AssertUnwindSafe(|| listener(&event))) {
                self.diagnostics.report(Diagnostic::new(
                    DiagnosticKind::Handler,
                    event.name(),
                    format!("listener panicked: {}", panic_message(payload.as_ref())),
                ));
            }
        }
    }

    /// Number of live listeners for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.subscriptions
            .read()
            .ok()
            .and_then(|subs| {
                subs.get(event).map(|list| {
                    list.iter()
                        .filter(|s| !(s.once && s.fired.load(Ordering::SeqCst)))
                        .count()
                })
            })
            .unwrap_or(0)
    }

    /// Log in through the gateway; returns when the session ends
    pub async fn login(self: &Arc<Self>, token: &str) -> Result<(), GatewayError> {
        let gateway = self.gateway.clone();
        gateway.login(token, Arc::clone(self)).await
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn commands(&self) -> &Arc<CommandRegistry> {
        &self.commands
    }

    pub fn responder(&self) -> &Arc<dyn InteractionResponder> {
        &self.responder
    }

    pub fn diagnostics(&self) -> &Arc<dyn DiagnosticSink> {
        &self.diagnostics
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    application_id: String,
    commands: Arc<CommandRegistry>,
    gateway: Arc<dyn Gateway>,
    responder: Arc<dyn InteractionResponder>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl ClientBuilder {
    pub fn with_application_id(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = application_id.into();
        self
    }

    pub fn with_commands(mut self, commands: Arc<CommandRegistry>) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn build(self) -> Arc<Client> {
        Arc::new(Client {
            application_id: self.application_id,
            commands: self.commands,
            gateway: self.gateway,
            responder: self.responder,
            diagnostics: self.diagnostics,
            subscriptions: RwLock::new(HashMap::new()),
            ready: AtomicBool::new(false),
        })
    }
}
