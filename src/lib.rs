// Copyright (c) 2025 - Cowboy AI, Inc.
//! Analytics dashboard domain and services
//!
//! Dashboards of positioned widgets, metric definitions with their raw
//! samples, and scheduled reports. Every aggregate keeps a version counter
//! and a queue of domain events raised by its mutations; the service layer
//! persists aggregates with optimistic concurrency and publishes the drained
//! events on NATS.
//!
//! # Modules
//!
//! - [`domain`] - aggregates, value objects and business rules
//! - [`events`] - the domain event envelope and catalogue
//! - [`aggregation`] - SUM / AVG / MIN / MAX / COUNT / DISTINCT over samples
//! - [`repository`] - persistence interfaces and in-memory implementations
//! - [`event_bus`] - publish/subscribe over NATS or in process
//! - [`service`] - command and query handlers

pub mod aggregate;
pub mod aggregation;
pub mod config;
pub mod domain;
pub mod errors;
pub mod event_bus;
pub mod events;
pub mod nats;
pub mod repository;
pub mod service;
pub mod subjects;

// Re-export commonly used types
pub use aggregate::{AggregateRoot, CreateDashboardCommand, CreateMetricCommand, CreateReportCommand};
pub use aggregation::AggregateResult;
pub use config::AnalyticsConfig;
pub use domain::{
    Dashboard, DashboardId, DomainError, DomainResult, ErrorCode, Metric, MetricData, MetricId,
    Report, ReportId, TimeRange, UserId, Widget, WidgetId,
};
pub use errors::{InfrastructureError, InfrastructureResult};
pub use event_bus::{EventBus, EventHandler, InMemoryEventBus, NatsEventBus, NoopEventBus};
pub use events::{AggregateKind, DomainEvent, EventType};
pub use nats::{NatsClient, NatsConfig};
pub use service::{
    Clock, DashboardService, FixedClock, MetricService, ReportService, ServiceError,
    ServiceResult, SystemClock,
};
