// Copyright (c) 2025 - Cowboy AI, Inc.
//! Analytics Domain Events
//!
//! Events are immutable facts raised by aggregate mutations.
//!
//! # Principles
//!
//! 1. **Past tense**: named for what happened (`WidgetAdded`, not `AddWidget`)
//! 2. **Versioned by aggregate**: `version` is the aggregate version the
//!    mutation produced, so events of one aggregate are totally ordered
//! 3. **Self-contained**: payloads are plain JSON, aggregates are referenced
//!    by id only
//!
//! # Event Flow
//!
//! ```text
//! Service → Aggregate → pending events → Repository.update → EventBus.publish
//!  (command)  (validate)    (what happened)     (persist)       (best effort)
//! ```
//!
//! Creation events (`DashboardCreated`, `MetricCreated`, `ReportCreated`) are
//! raised by the service layer, not the constructors.

pub mod domain_event;

pub use domain_event::{AggregateKind, DomainEvent, EventType, UnknownEventType};
