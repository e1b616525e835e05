// Copyright (c) 2025 - Cowboy AI, Inc.
//! Analytics Domain Models
//!
//! The three aggregates of the analytics context and the value objects they
//! are built from.
//!
//! # Aggregates
//!
//! - [`Dashboard`] - Grid layout and the widgets placed on it
//! - [`Metric`] - Typing, dimensions and reduction rules of a measurement
//! - [`Report`] - Scheduled rendering of a template to recipients
//!
//! # Value Objects
//!
//! - Identifiers ([`DashboardId`], [`MetricId`], [`ReportId`], [`WidgetId`], [`UserId`])
//! - [`TimeRange`] - Inclusive window over metric samples
//! - [`MetricData`] - One time-stamped sample, owned by no aggregate
//!
//! # Mutation Contract
//!
//! Every mutating method takes the current instant, validates first and then
//! applies. On success the aggregate version grows by exactly one and exactly
//! one [`DomainEvent`](crate::events::DomainEvent) carrying the new version is
//! queued. On failure nothing changes.

/// Closed enum carried on the wire as a fixed string
///
/// Parsing an unknown string yields a validation error with the given code.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $code:expr, $label:literal {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| {
                        $crate::domain::DomainError::validation(
                            $code,
                            format!(concat!("unknown ", $label, ": {}"), s),
                        )
                    })
            }
        }
    };
}

pub mod dashboard;
pub mod ids;
pub mod invariants;
pub mod metric;
pub mod report;
pub mod time_range;

pub use dashboard::{
    Dashboard, DashboardLayout, DataSource, Widget, WidgetPosition, WidgetSize, WidgetType,
    DEFAULT_REFRESH_INTERVAL_SECS,
};
pub use ids::{DashboardId, MetricId, ReportId, UserId, WidgetId};
pub use invariants::{DomainError, DomainResult, ErrorCode};
pub use metric::{
    AggregationType, CalculationCondition, ConditionOperator, Dimension, DimensionType, Metric,
    MetricCalculation, MetricCategory, MetricData, MetricType,
};
pub use report::{
    OutputFormat, Report, ReportLayout, ReportMargins, ReportSchedule, ReportSection,
    ReportStatus, ReportTemplate, ReportType, ScheduleType,
};
pub use time_range::TimeRange;
