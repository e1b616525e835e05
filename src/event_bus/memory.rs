// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-process event bus
//!
//! Records every accepted publish and dispatches it to matching handlers
//! before `publish` returns. It can be told to reject publishes, which is how
//! the services' swallow-on-failure path is exercised.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{EventBus, EventHandler};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::events::{DomainEvent, EventType};

#[derive(Default)]
pub struct InMemoryEventBus {
    published: RwLock<Vec<DomainEvent>>,
    /// `None` matches every event type
    handlers: RwLock<Vec<(Option<EventType>, Arc<dyn EventHandler>)>>,
    failing: AtomicBool,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent publishes fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every event accepted so far, in publish order
    pub async fn published(&self) -> Vec<DomainEvent> {
        self.published.read().await.clone()
    }

    pub async fn published_types(&self) -> Vec<EventType> {
        self.published
            .read()
            .await
            .iter()
            .map(|e| e.event_type)
            .collect()
    }

    pub async fn clear(&self) {
        self.published.write().await.clear();
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: &DomainEvent) -> InfrastructureResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(InfrastructureError::NatsPublish(format!(
                "bus rejected {}",
                event.event_type
            )));
        }

        self.published.write().await.push(event.clone());
        debug!(event_type = %event.event_type, aggregate_id = %event.aggregate_id, "Recorded event");

        let handlers: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .await
            .iter()
            .filter(|(filter, _)| filter.map_or(true, |t| t == event.event_type))
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            if let Err(e) = handler.handle(event.clone()).await {
                handler.handle_error(e).await;
            }
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        event_type: EventType,
        handler: Arc<dyn EventHandler>,
    ) -> InfrastructureResult<()> {
        self.handlers.write().await.push((Some(event_type), handler));
        Ok(())
    }

    async fn subscribe_all(&self, handler: Arc<dyn EventHandler>) -> InfrastructureResult<()> {
        self.handlers.write().await.push((None, handler));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::FnEventHandler;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn event(event_type: EventType) -> DomainEvent {
        DomainEvent::new(event_type, "agg-1", 2, json!({}), Utc::now())
    }

    #[tokio::test]
    async fn test_dispatches_to_matching_handlers() {
        let bus = InMemoryEventBus::new();
        let widget_hits = Arc::new(AtomicUsize::new(0));
        let all_hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&widget_hits);
        bus.subscribe(
            EventType::WidgetAdded,
            Arc::new(FnEventHandler::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })),
        )
        .await
        .unwrap();

        let counter = Arc::clone(&all_hits);
        bus.subscribe_all(Arc::new(FnEventHandler::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })))
        .await
        .unwrap();

        bus.publish(&event(EventType::WidgetAdded)).await.unwrap();
        bus.publish(&event(EventType::UnitChanged)).await.unwrap();

        assert_eq!(widget_hits.load(Ordering::SeqCst), 1);
        assert_eq!(all_hits.load(Ordering::SeqCst), 2);
        assert_eq!(
            bus.published_types().await,
            vec![EventType::WidgetAdded, EventType::UnitChanged]
        );
    }

    #[tokio::test]
    async fn test_handler_errors_do_not_reach_publisher() {
        let bus = InMemoryEventBus::new();
        bus.subscribe_all(Arc::new(FnEventHandler::new(|_| {
            Err(InfrastructureError::Storage("projection down".to_string()))
        })))
        .await
        .unwrap();

        assert!(bus.publish(&event(EventType::StatusChanged)).await.is_ok());
        assert_eq!(bus.published().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failing_bus_rejects_and_records_nothing() {
        let bus = InMemoryEventBus::new();
        bus.set_failing(true);

        let err = bus.publish(&event(EventType::WidgetAdded)).await.unwrap_err();
        assert!(matches!(err, InfrastructureError::NatsPublish(_)));
        assert!(bus.published().await.is_empty());

        bus.set_failing(false);
        bus.publish(&event(EventType::WidgetAdded)).await.unwrap();
        bus.clear().await;
        assert!(bus.published().await.is_empty());
    }
}
