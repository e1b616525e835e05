// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event bus for analytics domain events
//!
//! Publishing is a best-effort side channel. The services log a failed
//! publish and move on; subscribers log handler failures instead of surfacing
//! them to the publisher.
//!
//! # Implementations
//!
//! - [`NatsEventBus`] - JSON on `analytics.events.{EventType}`
//! - [`InMemoryEventBus`] - in-process dispatch with a record of every publish
//! - [`NoopEventBus`] - used when events are disabled

use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

use crate::config::AnalyticsConfig;
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::events::{DomainEvent, EventType};
use crate::nats::NatsClient;

pub mod memory;
pub mod nats;

pub use memory::InMemoryEventBus;
pub use nats::NatsEventBus;

/// Event handler trait
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle a received event
    async fn handle(&self, event: DomainEvent) -> InfrastructureResult<()>;

    /// Handle error during event processing
    async fn handle_error(&self, error: InfrastructureError) {
        error!(error = %error, "Event handler error");
    }
}

/// Function-based event handler
pub struct FnEventHandler<F>
where
    F: Fn(DomainEvent) -> InfrastructureResult<()> + Send + Sync,
{
    handler: F,
}

impl<F> FnEventHandler<F>
where
    F: Fn(DomainEvent) -> InfrastructureResult<()> + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(DomainEvent) -> InfrastructureResult<()> + Send + Sync,
{
    async fn handle(&self, event: DomainEvent) -> InfrastructureResult<()> {
        (self.handler)(event)
    }
}

/// Publish/subscribe seam between the services and the transport
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> InfrastructureResult<()>;

    /// Deliver handler invocations for one event type
    async fn subscribe(
        &self,
        event_type: EventType,
        handler: Arc<dyn EventHandler>,
    ) -> InfrastructureResult<()>;

    /// Deliver every event type to one handler
    async fn subscribe_all(&self, handler: Arc<dyn EventHandler>) -> InfrastructureResult<()>;
}

/// Drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventBus;

#[async_trait]
impl EventBus for NoopEventBus {
    async fn publish(&self, _event: &DomainEvent) -> InfrastructureResult<()> {
        Ok(())
    }

    async fn subscribe(
        &self,
        _event_type: EventType,
        _handler: Arc<dyn EventHandler>,
    ) -> InfrastructureResult<()> {
        Ok(())
    }

    async fn subscribe_all(&self, _handler: Arc<dyn EventHandler>) -> InfrastructureResult<()> {
        Ok(())
    }
}

/// NATS bus when events are enabled, otherwise [`NoopEventBus`]
pub async fn connect(config: &AnalyticsConfig) -> InfrastructureResult<Arc<dyn EventBus>> {
    if !config.events_enabled {
        return Ok(Arc::new(NoopEventBus));
    }
    let client = NatsClient::new(config.nats.clone()).await?;
    Ok(Arc::new(NatsEventBus::new(client)))
}
