//! In-memory adapters for tests and dry runs
//!
//! Nothing here talks to a network. Every call is recorded so callers can
//! assert on what the runtime tried to do.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::application::client::Client;
use crate::application::errors::{GatewayError, RegistrationError, ResponseError};
use crate::domain::entities::{GatewayEvent, Interaction, ReadyInfo, ResponsePayload, User};
use crate::domain::traits::{CommandRegistrar, Gateway, InteractionResponder, SyncTarget};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Gateway that emits `ready`, then any queued events, and returns
#[derive(Default)]
pub struct MemoryGateway {
    queued: Mutex<Vec<GatewayEvent>>,
    logins: Mutex<Vec<String>>,
    reject: Mutex<Option<String>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` right after `ready` on the next login
    pub fn queue(&self, event: GatewayEvent) {
        lock(&self.queued).push(event);
    }

    /// Make the next login fail with `reason`
    pub fn reject_login(&self, reason: impl Into<String>) {
        *lock(&self.reject) = Some(reason.into());
    }

    /// Tokens used for each login so far
    pub fn logins(&self) -> Vec<String> {
        lock(&self.logins).clone()
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn login(&self, token: &str, client: Arc<Client>) -> Result<(), GatewayError> {
        if let Some(reason) = lock(&self.reject).take() {
            return Err(GatewayError::Login(reason));
        }
        lock(&self.logins).push(token.to_string());

        client.emit(GatewayEvent::Ready(ReadyInfo {
            user: User::new("0").with_username("herald").as_bot(),
            application_id: client.application_id().to_string(),
            guild_count: 0,
        }));

        let queued = std::mem::take(&mut *lock(&self.queued));
        for event in queued {
            client.emit(event);
        }
        Ok(())
    }
}

/// One call made against a [`RecordingResponder`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedResponse {
    Reply(ResponsePayload),
    Defer { ephemeral: bool },
    FollowUp(ResponsePayload),
}

/// Responder that records successful calls and can be told to fail
#[derive(Default)]
pub struct RecordingResponder {
    calls: Mutex<Vec<RecordedResponse>>,
    fail_next: Mutex<Option<String>>,
}

impl RecordingResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call with a transport error; it is not recorded
    pub fn fail_next(&self, reason: impl Into<String>) {
        *lock(&self.fail_next) = Some(reason.into());
    }

    pub fn calls(&self) -> Vec<RecordedResponse> {
        lock(&self.calls).clone()
    }

    pub fn replies(&self) -> Vec<ResponsePayload> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedResponse::Reply(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn follow_ups(&self) -> Vec<ResponsePayload> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedResponse::FollowUp(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RecordedResponse) -> Result<(), ResponseError> {
        if let Some(reason) = lock(&self.fail_next).take() {
            return Err(ResponseError::Transport(reason));
        }
        lock(&self.calls).push(call);
        Ok(())
    }
}

#[async_trait]
impl InteractionResponder for RecordingResponder {
    async fn reply(&self, _interaction: &Interaction, payload: &ResponsePayload) -> Result<(), ResponseError> {
        self.record(RecordedResponse::Reply(payload.clone()))
    }

    async fn defer_reply(&self, _interaction: &Interaction, ephemeral: bool) -> Result<(), ResponseError> {
        self.record(RecordedResponse::Defer { ephemeral })
    }

    async fn follow_up(&self, _interaction: &Interaction, payload: &ResponsePayload) -> Result<(), ResponseError> {
        self.record(RecordedResponse::FollowUp(payload.clone()))
    }
}

/// Registrar holding the "remote" command set in memory
#[derive(Default)]
pub struct MemoryRegistrar {
    puts: Mutex<Vec<(SyncTarget, Vec<Value>)>>,
    current: Mutex<Vec<Value>>,
    failure: Mutex<Option<RegistrationError>>,
}

impl MemoryRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every put with `error` from now on
    pub fn fail_with(&self, error: RegistrationError) {
        *lock(&self.failure) = Some(error);
    }

    /// Every accepted put, in order
    pub fn puts(&self) -> Vec<(SyncTarget, Vec<Value>)> {
        lock(&self.puts).clone()
    }

    /// The remote command set after the last accepted put
    pub fn current(&self) -> Vec<Value> {
        lock(&self.current).clone()
    }
}

#[async_trait]
impl CommandRegistrar for MemoryRegistrar {
    async fn put_commands(&self, target: &SyncTarget, commands: &[Value]) -> Result<(), RegistrationError> {
        if let Some(error) = lock(&self.failure).clone() {
            return Err(error);
        }
        lock(&self.puts).push((target.clone(), commands.to_vec()));
        *lock(&self.current) = commands.to_vec();
        Ok(())
    }
}
