use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::application::client::Client;
use crate::application::errors::HandlerResult;
use crate::application::interaction::CommandContext;
use crate::domain::entities::GatewayEvent;

/// Executes one command invocation
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, ctx: CommandContext) -> HandlerResult;
}

/// Handles events delivered under one event name
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, client: Arc<Client>, event: GatewayEvent) -> HandlerResult;
}

/// Startup lifecycle hook, called at most once
#[async_trait]
pub trait Service: Send + Sync {
    async fn init(&self, client: Arc<Client>) -> HandlerResult;
}

struct FnExecutor<F>(F);

#[async_trait]
impl<F, Fut> CommandExecutor for FnExecutor<F>
where
    F: Fn(CommandContext) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn execute(&self, ctx: CommandContext) -> HandlerResult {
        (self.0)(ctx).await
    }
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Arc<Client>, GatewayEvent) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn handle(&self, client: Arc<Client>, event: GatewayEvent) -> HandlerResult {
        (self.0)(client, event).await
    }
}

struct FnService<F>(F);

#[async_trait]
impl<F, Fut> Service for FnService<F>
where
    F: Fn(Arc<Client>) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn init(&self, client: Arc<Client>) -> HandlerResult {
        (self.0)(client).await
    }
}

/// Wrap an async closure as a command executor
pub fn executor_fn<F, Fut>(f: F) -> Arc<dyn CommandExecutor>
where
    F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnExecutor(f))
}

/// Wrap an async closure as an event handler
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(Arc<Client>, GatewayEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Wrap an async closure as a service
pub fn service_fn<F, Fut>(f: F) -> Arc<dyn Service>
where
    F: Fn(Arc<Client>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnService(f))
}
