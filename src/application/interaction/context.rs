//! Execution context and the per-invocation response state machine

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::client::Client;
use crate::application::errors::ResponseError;
use crate::domain::entities::{Interaction, ResponsePayload};
use crate::domain::traits::InteractionResponder;

/// Response progress of one invocation.
///
/// `NotResponded -> Responded` or `NotResponded -> Deferred -> Responded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    NotResponded,
    Deferred,
    Responded,
}

/// Terminal action taken after a failed execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    Reply,
    FollowUp,
}

struct Inner {
    interaction: Interaction,
    client: Arc<Client>,
    responder: Arc<dyn InteractionResponder>,
    state: Mutex<ResponseState>,
}

/// What a command executor receives. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CommandContext {
    inner: Arc<Inner>,
}

impl CommandContext {
    pub fn new(interaction: Interaction, client: Arc<Client>) -> Self {
        let responder = client.responder().clone();
        Self {
            inner: Arc::new(Inner {
                interaction,
                client,
                responder,
                state: Mutex::new(ResponseState::NotResponded),
            }),
        }
    }

    pub fn interaction(&self) -> &Interaction {
        &self.inner.interaction
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.inner.client
    }

    pub async fn state(&self) -> ResponseState {
        *self.inner.state.lock().await
    }

    /// Initial reply; only valid before any acknowledgement
    pub async fn reply(&self, payload: ResponsePayload) -> Result<(), ResponseError> {
        let mut state = self.inner.state.lock().await;
        if *state != ResponseState::NotResponded {
            return Err(ResponseError::AlreadyAcknowledged);
        }
        self.inner.responder.reply(&self.inner.interaction, &payload).await?;
        *state = ResponseState::Responded;
        Ok(())
    }

    /// Acknowledge now and respond later with [`follow_up`](Self::follow_up)
    pub async fn defer_reply(&self, ephemeral: bool) -> Result<(), ResponseError> {
        let mut state = self.inner.state.lock().await;
        if *state != ResponseState::NotResponded {
            return Err(ResponseError::AlreadyAcknowledged);
        }
        self.inner
            .responder
            .defer_reply(&self.inner.interaction, ephemeral)
            .await?;
        *state = ResponseState::Deferred;
        Ok(())
    }

    /// Message after a reply or deferral
    pub async fn follow_up(&self, payload: ResponsePayload) -> Result<(), ResponseError> {
        let mut state = self.inner.state.lock().await;
        if *state == ResponseState::NotResponded {
            return Err(ResponseError::NotAcknowledged);
        }
        self.inner.responder.follow_up(&self.inner.interaction, &payload).await?;
        *state = ResponseState::Responded;
        Ok(())
    }

    /// Deliver exactly one terminal response, picking reply or follow-up
    /// from the current state under a single lock.
    pub(crate) async fn respond_terminal(&self, payload: ResponsePayload) -> Result<Recovery, ResponseError> {
        let mut state = self.inner.state.lock().await;
        let recovery = match *state {
            ResponseState::NotResponded => {
                self.inner.responder.reply(&self.inner.interaction, &payload).await?;
                Recovery::Reply
            }
            ResponseState::Deferred | ResponseState::Responded => {
                self.inner.responder.follow_up(&self.inner.interaction, &payload).await?;
                Recovery::FollowUp
            }
        };
        *state = ResponseState::Responded;
        Ok(recovery)
    }
}
