// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS-backed event bus
//!
//! Each event is published as JSON on `analytics.events.{EventType}`. Every
//! subscription runs in its own tokio task until the subscription ends or the
//! bus is shut down.

use async_nats::Subscriber;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{EventBus, EventHandler};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::events::{DomainEvent, EventType};
use crate::nats::NatsClient;
use crate::subjects::{event_subject, SubjectBuilder};

pub struct NatsEventBus {
    client: NatsClient,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl NatsEventBus {
    pub fn new(client: NatsClient) -> Self {
        Self {
            client,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn client(&self) -> &NatsClient {
        &self.client
    }

    /// Stop every subscription task
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        for task in tasks.drain(..) {
            task.abort();
        }
        info!("Event bus subscriptions stopped");
    }

    async fn spawn(&self, subject: String, handler: Arc<dyn EventHandler>) -> InfrastructureResult<()> {
        let subscriber = self.client.subscribe(&subject).await?;

        let task = tokio::spawn(process_messages(subject, subscriber, handler));
        self.tasks.lock().await.push(task);
        Ok(())
    }
}

async fn process_messages(subject: String, mut subscriber: Subscriber, handler: Arc<dyn EventHandler>) {
    while let Some(message) = subscriber.next().await {
        debug!(
            subject = %message.subject,
            payload_size = message.payload.len(),
            "Received event"
        );

        let outcome = match serde_json::from_slice::<DomainEvent>(&message.payload) {
            Ok(event) => handler.handle(event).await,
            Err(e) => Err(InfrastructureError::Deserialization(e.to_string())),
        };

        if let Err(e) = outcome {
            handler.handle_error(e).await;
        }
    }

    warn!(subject = %subject, "Subscription ended");
}

#[async_trait]
impl EventBus for NatsEventBus {
    async fn publish(&self, event: &DomainEvent) -> InfrastructureResult<()> {
        let subject = event_subject(event.event_type);

        self.client.publish(&subject, event).await?;

        debug!(
            subject = %subject,
            event_id = %event.id,
            aggregate_id = %event.aggregate_id,
            version = event.version,
            "Published domain event"
        );
        Ok(())
    }

    async fn subscribe(
        &self,
        event_type: EventType,
        handler: Arc<dyn EventHandler>,
    ) -> InfrastructureResult<()> {
        self.spawn(event_subject(event_type), handler).await
    }

    async fn subscribe_all(&self, handler: Arc<dyn EventHandler>) -> InfrastructureResult<()> {
        self.spawn(SubjectBuilder::build_all(), handler).await
    }
}
