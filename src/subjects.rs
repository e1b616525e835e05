// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject hierarchy for analytics events
//!
//! # Subject Pattern
//!
//! ```text
//! analytics.events.{EventType}
//! ```
//!
//! This allows for:
//! - Precise subscriptions (`analytics.events.WidgetAdded`)
//! - Global subscriptions (`analytics.events.>`)
//!
//! # Examples
//!
//! ```rust
//! use analytics_dashboard::events::EventType;
//! use analytics_dashboard::subjects::SubjectBuilder;
//!
//! let subject = SubjectBuilder::new().event(EventType::WidgetAdded).build();
//! assert_eq!(subject, "analytics.events.WidgetAdded");
//!
//! assert_eq!(SubjectBuilder::build_all(), "analytics.events.>");
//! ```

use crate::events::EventType;

/// Root namespace for all analytics subjects
pub const ANALYTICS_ROOT: &str = "analytics";

/// Channel below the root carrying domain events
pub const EVENTS_CHANNEL: &str = "events";

/// Builder for analytics NATS subjects
#[derive(Debug, Clone, Default)]
pub struct SubjectBuilder {
    event: Option<EventType>,
}

impl SubjectBuilder {
    pub fn new() -> Self {
        Self { event: None }
    }

    /// Set the event type
    pub fn event(mut self, event: EventType) -> Self {
        self.event = Some(event);
        self
    }

    /// Build the subject string
    ///
    /// Without an event type this is the wildcard over all events.
    pub fn build(self) -> String {
        match self.event {
            Some(event) => format!("{ANALYTICS_ROOT}.{EVENTS_CHANNEL}.{event}"),
            None => Self::build_all(),
        }
    }

    /// Build a subscription for all analytics events
    ///
    /// Returns: `analytics.events.>`
    pub fn build_all() -> String {
        format!("{ANALYTICS_ROOT}.{EVENTS_CHANNEL}.>")
    }
}

/// Subject a given event type is published on
pub fn event_subject(event: EventType) -> String {
    SubjectBuilder::new().event(event).build()
}

/// Recover the event type from a concrete subject
pub fn parse_event_subject(subject: &str) -> Option<EventType> {
    let mut parts = subject.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(ANALYTICS_ROOT), Some(EVENTS_CHANNEL), Some(name), None) => name.parse().ok(),
        _ => None,
    }
}
