// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for Analytics
//!
//! Command and query handlers that drive the aggregates through their
//! repositories and announce what happened on the event bus.
//!
//! # Architecture
//!
//! ```text
//! Client Request
//!     ↓
//! Service Layer (this module)
//!     ↓
//! Load → Aggregate mutation(now) → pending events
//!     ↓
//! Repository.update(aggregate, loaded version)
//!     ↓
//! EventBus.publish (failures logged, never returned)
//! ```
//!
//! # Transaction Semantics
//!
//! Each command is one load / mutate / compare-and-swap write. Validation,
//! not-found and storage failures abort the command and reach the caller.
//! Once the write succeeds, the command has succeeded regardless of what the
//! event bus does.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::{DomainError, DomainResult, ErrorCode, TimeRange};
use crate::errors::InfrastructureError;
use crate::event_bus::EventBus;
use crate::events::DomainEvent;

pub mod dashboard;
pub mod metric;
pub mod report;

pub use dashboard::DashboardService;
pub use metric::MetricService;
pub use report::{GeneratedReport, ReportData, ReportGenerator, ReportNotifier, ReportService};

/// Service layer result type
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service layer errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Business rule violation or missing domain entity
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage or transport failure
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),
}

impl ServiceError {
    /// Missing aggregate, widget, dimension or recipient
    pub fn is_not_found(&self) -> bool {
        match self {
            ServiceError::Domain(e) => e.is_not_found(),
            ServiceError::Infrastructure(e) => e.is_not_found(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Infrastructure(e) if e.is_conflict())
    }

    /// Validation code, if this is a validation failure
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ServiceError::Domain(e) => e.code(),
            ServiceError::Infrastructure(_) => None,
        }
    }
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|p| p.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Publish in order; a failed publish is logged and skipped
pub(crate) async fn publish_events(bus: &dyn EventBus, events: Vec<DomainEvent>) {
    for event in events {
        match bus.publish(&event).await {
            Ok(()) => debug!(
                event_type = %event.event_type,
                aggregate_id = %event.aggregate_id,
                version = event.version,
                "Published domain event"
            ),
            Err(e) => warn!(
                error = %e,
                event_type = %event.event_type,
                aggregate_id = %event.aggregate_id,
                version = event.version,
                "Failed to publish domain event"
            ),
        }
    }
}

/// Reject empty or inverted windows
pub(crate) fn validate_range(range: Option<&TimeRange>) -> DomainResult<()> {
    match range {
        Some(range) => range.validate(),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_error_classification() {
        let missing: ServiceError = DomainError::not_found("widget", "w-1").into();
        assert!(missing.is_not_found());
        assert_eq!(missing.code(), None);

        let stored_missing: ServiceError = InfrastructureError::not_found("metric", "m-1").into();
        assert!(stored_missing.is_not_found());

        let invalid: ServiceError =
            DomainError::validation(ErrorCode::InvalidLayout, "bad grid").into();
        assert_eq!(invalid.code(), Some(ErrorCode::InvalidLayout));
        assert_eq!(invalid.to_string(), "INVALID_LAYOUT: bad grid");
        assert!(!invalid.is_conflict());
    }

    #[test]
    fn test_fixed_clock() {
        let start = Utc.with_ymd_and_hms(2026, 1, 19, 12, 0, 0).unwrap();
        let clock = FixedClock::new(start);

        clock.advance(chrono::Duration::minutes(5));
        assert_eq!(clock.now(), start + chrono::Duration::minutes(5));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
