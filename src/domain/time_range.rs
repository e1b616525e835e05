// Copyright (c) 2025 - Cowboy AI, Inc.
//! Time window used to restrict metric-data queries and aggregations

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::invariants::{DomainError, DomainResult, ErrorCode};

/// Closed interval `[start, end]` over UTC instants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The `duration` immediately preceding `end`
    pub fn last(duration: Duration, end: DateTime<Utc>) -> Self {
        Self {
            start: end - duration,
            end,
        }
    }

    /// A range is valid when `start` is strictly before `end`
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Reject ranges that are empty or inverted
    pub fn validate(&self) -> DomainResult<()> {
        if !self.is_valid() {
            return Err(DomainError::validation(
                ErrorCode::InvalidTimeRange,
                format!("time range start {} must precede end {}", self.start, self.end),
            ));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Inclusive on both ends
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}
