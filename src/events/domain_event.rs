// Copyright (c) 2025 - Cowboy AI, Inc.
//! The domain event record
//!
//! Events point at their aggregate by id and version only. They never hold
//! the aggregate itself, so they serialize and replay on their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of aggregate an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Dashboard,
    Metric,
    Report,
}

impl AggregateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKind::Dashboard => "dashboard",
            AggregateKind::Metric => "metric",
            AggregateKind::Report => "report",
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of event types (past tense)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    // Dashboard
    DashboardCreated,
    WidgetAdded,
    WidgetUpdated,
    WidgetRemoved,
    LayoutUpdated,
    VisibilityChanged,
    RefreshIntervalChanged,

    // Metric
    MetricCreated,
    UnitChanged,
    AggregationChanged,
    DataSourceChanged,
    DimensionAdded,
    DimensionRemoved,
    CalculationUpdated,
    FilterAdded,
    FilterRemoved,

    // Report
    ReportCreated,
    TemplateUpdated,
    ScheduleUpdated,
    OutputFormatChanged,
    RecipientAdded,
    RecipientRemoved,
    StatusChanged,
    ReportGenerated,
}

impl EventType {
    pub const ALL: [EventType; 24] = [
        EventType::DashboardCreated,
        EventType::WidgetAdded,
        EventType::WidgetUpdated,
        EventType::WidgetRemoved,
        EventType::LayoutUpdated,
        EventType::VisibilityChanged,
        EventType::RefreshIntervalChanged,
        EventType::MetricCreated,
        EventType::UnitChanged,
        EventType::AggregationChanged,
        EventType::DataSourceChanged,
        EventType::DimensionAdded,
        EventType::DimensionRemoved,
        EventType::CalculationUpdated,
        EventType::FilterAdded,
        EventType::FilterRemoved,
        EventType::ReportCreated,
        EventType::TemplateUpdated,
        EventType::ScheduleUpdated,
        EventType::OutputFormatChanged,
        EventType::RecipientAdded,
        EventType::RecipientRemoved,
        EventType::StatusChanged,
        EventType::ReportGenerated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::DashboardCreated => "DashboardCreated",
            EventType::WidgetAdded => "WidgetAdded",
            EventType::WidgetUpdated => "WidgetUpdated",
            EventType::WidgetRemoved => "WidgetRemoved",
            EventType::LayoutUpdated => "LayoutUpdated",
            EventType::VisibilityChanged => "VisibilityChanged",
            EventType::RefreshIntervalChanged => "RefreshIntervalChanged",
            EventType::MetricCreated => "MetricCreated",
            EventType::UnitChanged => "UnitChanged",
            EventType::AggregationChanged => "AggregationChanged",
            EventType::DataSourceChanged => "DataSourceChanged",
            EventType::DimensionAdded => "DimensionAdded",
            EventType::DimensionRemoved => "DimensionRemoved",
            EventType::CalculationUpdated => "CalculationUpdated",
            EventType::FilterAdded => "FilterAdded",
            EventType::FilterRemoved => "FilterRemoved",
            EventType::ReportCreated => "ReportCreated",
            EventType::TemplateUpdated => "TemplateUpdated",
            EventType::ScheduleUpdated => "ScheduleUpdated",
            EventType::OutputFormatChanged => "OutputFormatChanged",
            EventType::RecipientAdded => "RecipientAdded",
            EventType::RecipientRemoved => "RecipientRemoved",
            EventType::StatusChanged => "StatusChanged",
            EventType::ReportGenerated => "ReportGenerated",
        }
    }

    /// Aggregate that raises this event type
    pub fn aggregate_kind(&self) -> AggregateKind {
        use EventType::*;

        match self {
            DashboardCreated | WidgetAdded | WidgetUpdated | WidgetRemoved | LayoutUpdated
            | VisibilityChanged | RefreshIntervalChanged => AggregateKind::Dashboard,
            MetricCreated | UnitChanged | AggregationChanged | DataSourceChanged
            | DimensionAdded | DimensionRemoved | CalculationUpdated | FilterAdded
            | FilterRemoved => AggregateKind::Metric,
            ReportCreated | TemplateUpdated | ScheduleUpdated | OutputFormatChanged
            | RecipientAdded | RecipientRemoved | StatusChanged | ReportGenerated => {
                AggregateKind::Report
            }
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown event type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type: {0}")]
pub struct UnknownEventType(pub String);

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

/// Immutable fact raised by an aggregate mutation
///
/// `version` equals the aggregate version produced by the mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    /// Unique event identifier (UUID v7 for time ordering)
    pub id: Uuid,

    #[serde(rename = "type")]
    pub event_type: EventType,

    pub aggregate_id: String,

    pub version: u64,

    /// Event payload, always a JSON object
    pub data: Value,

    #[serde(default)]
    pub metadata: Map<String, Value>,

    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(
        event_type: EventType,
        aggregate_id: impl Into<String>,
        version: u64,
        data: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let data = match data {
            Value::Object(_) => data,
            Value::Null => Value::Object(Map::new()),
            other => {
                let mut wrapped = Map::new();
                wrapped.insert("value".to_string(), other);
                Value::Object(wrapped)
            }
        };

        Self {
            id: Uuid::now_v7(),
            event_type,
            aggregate_id: aggregate_id.into(),
            version,
            data,
            metadata: Map::new(),
            timestamp,
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Tag the event with the request flow that produced it
    pub fn with_correlation_id(self, correlation_id: Uuid) -> Self {
        self.with_metadata("correlationId", correlation_id.to_string())
    }

    pub fn correlation_id(&self) -> Option<Uuid> {
        self.metadata
            .get("correlationId")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
    }

    pub fn aggregate_kind(&self) -> AggregateKind {
        self.event_type.aggregate_kind()
    }

    /// Convenience accessor for a payload field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}
