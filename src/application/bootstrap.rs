//! Bootstrap - Wires discovered modules into a running client
//!
//! Startup runs in a fixed order: commands are loaded and validated, event
//! handlers are bound, the interaction route and the ready-time command sync
//! are installed, and finally services are initialized. Login is left to the
//! caller so it happens strictly after all of the above.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

use super::client::Client;
use super::diagnostics::{DiagnosticSink, TracingSink};
use super::dispatcher::{BoundHandler, EventDispatcher};
use super::errors::{BotError, BoxError};
use super::interaction::InteractionExecutor;
use super::registry::{CommandRegistry, DuplicatePolicy, RegisterTally};
use super::services::{RegistrationOutcome, RemoteCommandSync, ServiceInitializer, ServiceReport};
use crate::domain::entities::{
    EventBinding, GatewayEvent, LoadedModule, ServiceHandle, INTERACTION_CREATE, READY,
};
use crate::domain::traits::{handler_fn, CommandRegistrar, Gateway, InteractionResponder, SyncTarget};
use crate::infrastructure::plugins::ModuleLoader;

/// Where modules live and how they are registered
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub commands_dir: PathBuf,
    pub events_dir: PathBuf,
    pub services_dir: PathBuf,
    pub on_duplicate: DuplicatePolicy,
    pub target: SyncTarget,
}

impl BootstrapOptions {
    /// `commands/`, `events/` and `services/` under `root`
    pub fn from_root(root: impl AsRef<Path>, target: SyncTarget) -> Self {
        let root = root.as_ref();
        Self {
            commands_dir: root.join("commands"),
            events_dir: root.join("events"),
            services_dir: root.join("services"),
            on_duplicate: DuplicatePolicy::default(),
            target,
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.on_duplicate = policy;
        self
    }
}

/// Everything found on disk, validated but not yet wired
pub struct Discovery {
    pub registry: CommandRegistry,
    pub tally: RegisterTally,
    pub events: Vec<(String, Vec<LoadedModule>)>,
    pub services: Vec<ServiceHandle>,
}

pub struct Bootstrap {
    options: BootstrapOptions,
    loader: ModuleLoader,
    gateway: Arc<dyn Gateway>,
    responder: Arc<dyn InteractionResponder>,
    registrar: Arc<dyn CommandRegistrar>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl Bootstrap {
    pub fn new(
        options: BootstrapOptions,
        loader: ModuleLoader,
        gateway: Arc<dyn Gateway>,
        responder: Arc<dyn InteractionResponder>,
        registrar: Arc<dyn CommandRegistrar>,
    ) -> Self {
        Self {
            options,
            loader,
            gateway,
            responder,
            registrar,
            diagnostics: Arc::new(TracingSink),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Load all three module directories and validate the commands
    pub async fn discover(&self) -> Discovery {
        let sink = self.diagnostics.as_ref();

        let command_modules = self.loader.load(&self.options.commands_dir, sink).await;
        let mut registry = CommandRegistry::with_policy(self.options.on_duplicate);
        let tally = registry.register_all(&command_modules, sink);

        let events = self.loader.load_grouped(&self.options.events_dir, sink).await;
        let service_modules = self.loader.load(&self.options.services_dir, sink).await;
        let services = ServiceInitializer::handles(&service_modules);

        tracing::info!(
            commands = registry.len(),
            event_groups = events.len(),
            services = services.len(),
            "Module discovery finished"
        );

        Discovery {
            registry,
            tally,
            events,
            services,
        }
    }

    /// Run the whole startup sequence up to, but not including, login
    pub async fn start(self) -> Result<Runtime, BotError> {
        let Discovery {
            registry,
            events,
            services,
            ..
        } = self.discover().await;
        let registry = Arc::new(registry);

        let client = Client::builder(self.gateway.clone(), self.responder.clone())
            .with_application_id(self.options.target.application_id.clone())
            .with_commands(registry.clone())
            .with_diagnostics(self.diagnostics.clone())
            .build();

        let mut dispatcher = EventDispatcher::new(client.clone());
        let bound = dispatcher.bind_all(&events);
        tracing::info!(bound, "Event handlers bound");

        let executor = Arc::new(InteractionExecutor::new(registry.clone(), self.diagnostics.clone()));
        dispatcher.bind(EventBinding::new(
            INTERACTION_CREATE,
            "interaction-executor",
            handler_fn(move |client, event| {
                let executor = executor.clone();
                async move {
                    if let GatewayEvent::InteractionCreate(interaction) = event {
                        tokio::spawn(async move {
                            executor.handle(client, interaction).await;
                        });
                    }
                    Ok::<(), BoxError>(())
                }
            }),
        ));

        let (outcome_tx, registration) = watch::channel(None);
        let outcome_tx = Arc::new(outcome_tx);
        let sync = Arc::new(RemoteCommandSync::new(
            self.registrar.clone(),
            self.options.target.clone(),
            self.diagnostics.clone(),
        ));
        let descriptors = Arc::new(registry.describe_all());
        dispatcher.bind_once(EventBinding::new(
            READY,
            "command-sync",
            handler_fn(move |_client, _event| {
                let sync = sync.clone();
                let descriptors = descriptors.clone();
                let outcome_tx = outcome_tx.clone();
                async move {
                    let outcome = sync.sync(&descriptors).await;
                    outcome_tx.send_replace(Some(outcome));
                    Ok::<(), BoxError>(())
                }
            }),
        ));

        let report = ServiceInitializer::new(self.diagnostics.clone())
            .init_all(&services, client.clone())
            .await;
        if let Some(fatal) = &report.fatal {
            tracing::error!(error = %fatal, "Startup aborted by a service");
            return Err(BotError::Fatal(fatal.to_string()));
        }

        Ok(Runtime {
            client,
            dispatcher,
            services: report,
            registration,
        })
    }
}

/// A started bot, ready to log in
pub struct Runtime {
    client: Arc<Client>,
    dispatcher: EventDispatcher,
    services: ServiceReport,
    registration: watch::Receiver<Option<RegistrationOutcome>>,
}

impl Runtime {
    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    pub fn bindings(&self) -> &[BoundHandler] {
        self.dispatcher.bindings()
    }

    pub fn services(&self) -> &ServiceReport {
        &self.services
    }

    /// Outcome of the ready-time command sync; `None` until it ran
    pub fn registration(&self) -> watch::Receiver<Option<RegistrationOutcome>> {
        self.registration.clone()
    }

    /// Wait for the command sync to finish
    pub async fn registered(&self) -> Option<RegistrationOutcome> {
        let mut rx = self.registration.clone();
        let outcome = rx.wait_for(Option::is_some).await.ok().and_then(|o| o.clone());
        outcome
    }

    /// Log in; returns when the gateway session ends
    pub async fn login(&self, token: &str) -> Result<(), BotError> {
        self.client.login(token).await?;
        Ok(())
    }

    /// Log in and serve until the session ends.
    ///
    /// A gateway failure is logged and reported as `false`, never raised.
    pub async fn serve(&self, token: &str) -> bool {
        match self.client.login(token).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Gateway session ended with an error");
                false
            }
        }
    }
}
