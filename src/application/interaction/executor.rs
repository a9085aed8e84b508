//! Interaction executor - Routes invocations to commands and guarantees
//! a terminal response when a command fails

use std::sync::Arc;

use super::context::{CommandContext, Recovery, ResponseState};
use crate::application::client::Client;
use crate::application::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::application::errors::{ExecutionError, ResponseError};
use crate::application::fault::{Fault, FaultBoundary};
use crate::application::registry::CommandRegistry;
use crate::domain::entities::{Interaction, ResponsePayload};

/// What happened to one inbound interaction
#[derive(Debug)]
pub enum InvocationOutcome {
    /// Not a chat-style command invocation
    Ignored,
    /// No registered command has this name
    UnknownCommand(String),
    /// Executor returned normally, leaving the invocation in this state
    Completed(ResponseState),
    /// Executor failed; `recovery` is the terminal error response taken
    Failed {
        error: ExecutionError,
        recovery: Result<Recovery, ResponseError>,
    },
}

pub struct InteractionExecutor {
    registry: Arc<CommandRegistry>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl InteractionExecutor {
    pub fn new(registry: Arc<CommandRegistry>, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            registry,
            diagnostics,
        }
    }

    pub async fn handle(&self, client: Arc<Client>, interaction: Interaction) -> InvocationOutcome {
        if !interaction.is_chat_input_command() {
            tracing::debug!(kind = interaction.kind.as_str(), "Ignoring interaction");
            return InvocationOutcome::Ignored;
        }

        let Some(command) = self.registry.lookup(&interaction.command_name) else {
            self.diagnostics.report(Diagnostic::new(
                DiagnosticKind::UnknownCommand,
                interaction.command_name.clone(),
                format!("No command matching {} was found.", interaction.command_name),
            ));
            return InvocationOutcome::UnknownCommand(interaction.command_name);
        };

        tracing::debug!(command = %command.name, user = %interaction.user, "Executing command");

        let ctx = CommandContext::new(interaction, client);
        let boundary = FaultBoundary::new(
            DiagnosticKind::Execution,
            command.name.clone(),
            self.diagnostics.clone(),
        );

        match boundary.guard(command.executor.execute(ctx.clone())).await {
            Ok(()) => {
                let state = ctx.state().await;
                match state {
                    ResponseState::NotResponded => {
                        tracing::warn!(command = %command.name, "Command completed without responding");
                    }
                    ResponseState::Deferred => {
                        tracing::warn!(command = %command.name, "Command deferred but never followed up");
                    }
                    ResponseState::Responded => {}
                }
                InvocationOutcome::Completed(state)
            }
            Err(fault) => {
                let error = match fault {
                    Fault::Error(e) => ExecutionError::Failed(e),
                    Fault::Panic(msg) => ExecutionError::Panicked(msg),
                };
                let recovery = ctx.respond_terminal(ResponsePayload::interaction_error()).await;
                if let Err(e) = &recovery {
                    tracing::error!(command = %command.name, error = %e, "Failed to deliver error response");
                }
                InvocationOutcome::Failed { error, recovery }
            }
        }
    }
}
