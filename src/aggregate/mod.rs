// Copyright (c) 2025 - Cowboy AI, Inc.
//! Aggregate roots and their creation commands
//!
//! The three analytics aggregates share one shape: an identity, an optimistic
//! concurrency `version`, a creation instant and a queue of events raised
//! since the last drain. [`AggregateRoot`] captures that shape so storage and
//! services can treat them uniformly.
//!
//! # Command Flow
//!
//! ```text
//! Command → validate() → Aggregate::new / mutate(now) → pending events
//!                                      ↓
//!                  Repository.update(aggregate, loaded version)
//!                                      ↓
//!                      take_pending_events() → EventBus
//! ```
//!
//! # Time as Parameter
//!
//! Aggregates never read the clock. Every constructor and mutator takes the
//! instant from its caller.

use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::hash::Hash;

use crate::domain::{Dashboard, DashboardId, Metric, MetricId, Report, ReportId};
use crate::events::{AggregateKind, DomainEvent};

pub mod commands;

pub use commands::{CreateDashboardCommand, CreateMetricCommand, CreateReportCommand};

/// Consistency boundary with a version counter and pending events
pub trait AggregateRoot: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Ord + Hash + Display + Send + Sync + 'static;

    const KIND: AggregateKind;

    fn id(&self) -> &Self::Id;

    /// Starts at 1, grows by one per successful mutation
    fn version(&self) -> u64;

    fn created_at(&self) -> DateTime<Utc>;

    fn pending_events(&self) -> &[DomainEvent];

    fn take_pending_events(&mut self) -> Vec<DomainEvent>;
}

impl AggregateRoot for Dashboard {
    type Id = DashboardId;

    const KIND: AggregateKind = AggregateKind::Dashboard;

    fn id(&self) -> &DashboardId {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn pending_events(&self) -> &[DomainEvent] {
        Dashboard::pending_events(self)
    }

    fn take_pending_events(&mut self) -> Vec<DomainEvent> {
        Dashboard::take_pending_events(self)
    }
}

impl AggregateRoot for Metric {
    type Id = MetricId;

    const KIND: AggregateKind = AggregateKind::Metric;

    fn id(&self) -> &MetricId {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn pending_events(&self) -> &[DomainEvent] {
        Metric::pending_events(self)
    }

    fn take_pending_events(&mut self) -> Vec<DomainEvent> {
        Metric::take_pending_events(self)
    }
}

impl AggregateRoot for Report {
    type Id = ReportId;

    const KIND: AggregateKind = AggregateKind::Report;

    fn id(&self) -> &ReportId {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn pending_events(&self) -> &[DomainEvent] {
        Report::pending_events(self)
    }

    fn take_pending_events(&mut self) -> Vec<DomainEvent> {
        Report::take_pending_events(self)
    }
}
