// Copyright (c) 2025 - Cowboy AI, Inc.
//! Metric Aggregate and metric samples
//!
//! A metric describes how raw samples are typed, categorized, broken down by
//! dimension and reduced. Samples ([`MetricData`]) live outside the aggregate
//! and only reference it by id.
//!
//! # Invariants
//! - Dimension names are unique (exact, case-sensitive match)
//! - A calculation has a formula of at least three characters and every
//!   condition carries a field and an operator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::dashboard::DataSource;
use super::ids::MetricId;
use super::invariants::{validate_calculation, DomainError, DomainResult, ErrorCode};
use crate::events::{DomainEvent, EventType};

wire_enum! {
    /// Kind of measurement
    MetricType, ErrorCode::InvalidType, "metric type" {
        Counter => "COUNTER",
        Gauge => "GAUGE",
        Histogram => "HISTOGRAM",
        Summary => "SUMMARY",
    }
}

wire_enum! {
    MetricCategory, ErrorCode::InvalidCategory, "metric category" {
        Performance => "PERFORMANCE",
        Business => "BUSINESS",
        System => "SYSTEM",
        User => "USER",
    }
}

wire_enum! {
    /// Reduction applied to a metric's samples
    AggregationType, ErrorCode::InvalidAggregation, "aggregation type" {
        Sum => "SUM",
        Avg => "AVG",
        Min => "MIN",
        Max => "MAX",
        Count => "COUNT",
        Distinct => "DISTINCT",
    }
}

impl Default for AggregationType {
    fn default() -> Self {
        AggregationType::Sum
    }
}

wire_enum! {
    DimensionType, ErrorCode::InvalidDimension, "dimension type" {
        String => "string",
        Number => "number",
        Date => "date",
        Boolean => "boolean",
    }
}

impl Default for DimensionType {
    fn default() -> Self {
        DimensionType::String
    }
}

/// Named attribute samples can be grouped or filtered by
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    #[serde(rename = "type")]
    pub dimension_type: DimensionType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

impl Dimension {
    pub fn new(name: impl Into<String>, dimension_type: DimensionType) -> Self {
        Self {
            name: name.into(),
            dimension_type,
            description: String::new(),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

wire_enum! {
    ConditionOperator, ErrorCode::InvalidCondition, "condition operator" {
        Eq => "=",
        Ne => "!=",
        Gt => ">",
        Lt => "<",
        Ge => ">=",
        Le => "<=",
        In => "IN",
        NotIn => "NOT_IN",
    }
}

/// Predicate of a derived-metric calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationCondition {
    pub field: String,
    /// `None` models a condition submitted without an operator
    #[serde(default)]
    pub operator: Option<ConditionOperator>,
    #[serde(default)]
    pub value: Value,
}

impl CalculationCondition {
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: Some(operator),
            value: value.into(),
        }
    }
}

/// Formula configuration of a derived metric
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCalculation {
    pub formula: String,
    #[serde(default)]
    pub variables: HashMap<String, Value>,
    #[serde(default)]
    pub conditions: Vec<CalculationCondition>,
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_validated: Option<DateTime<Utc>>,
}

impl MetricCalculation {
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            ..Self::default()
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_condition(mut self, condition: CalculationCondition) -> Self {
        self.conditions.push(condition);
        self
    }
}

/// One time-stamped sample of a metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricData {
    pub id: String,
    pub metric_id: MetricId,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    #[serde(default)]
    pub dimensions: HashMap<String, Value>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl MetricData {
    pub fn new(metric_id: MetricId, timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            metric_id,
            timestamp,
            value,
            dimensions: HashMap::new(),
            labels: HashMap::new(),
        }
    }

    pub fn with_dimension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.dimensions.insert(key.into(), value.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Exact match on every requested dimension (AND of point predicates)
    pub fn matches_dimensions(&self, wanted: &HashMap<String, Value>) -> bool {
        wanted
            .iter()
            .all(|(key, value)| self.dimensions.get(key) == Some(value))
    }
}

/// Metric aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: MetricId,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub category: MetricCategory,
    pub unit: String,
    pub aggregation: AggregationType,
    #[serde(default)]
    pub data_source: DataSource,
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub filters: HashMap<String, Value>,
    #[serde(default)]
    pub calculation: MetricCalculation,
    pub is_calculated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,

    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Metric {
    /// New metric aggregated by SUM, with no unit, dimensions or filters
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        metric_type: MetricType,
        category: MetricCategory,
        now: DateTime<Utc>,
    ) -> Self {
        Self::with_id(MetricId::new(), name, description, metric_type, category, now)
    }

    pub fn with_id(
        id: MetricId,
        name: impl Into<String>,
        description: impl Into<String>,
        metric_type: MetricType,
        category: MetricCategory,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            metric_type,
            category,
            unit: String::new(),
            aggregation: AggregationType::default(),
            data_source: DataSource::default(),
            dimensions: Vec::new(),
            filters: HashMap::new(),
            calculation: MetricCalculation::default(),
            is_calculated: false,
            created_at: now,
            updated_at: now,
            version: 1,
            events: Vec::new(),
        }
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn set_unit(&mut self, unit: impl Into<String>, now: DateTime<Utc>) {
        self.unit = unit.into();
        let data = json!({ "unit": self.unit });
        self.raise(EventType::UnitChanged, data, now);
    }

    pub fn set_aggregation(&mut self, aggregation: AggregationType, now: DateTime<Utc>) {
        self.aggregation = aggregation;
        self.raise(
            EventType::AggregationChanged,
            json!({ "aggregation": aggregation }),
            now,
        );
    }

    pub fn set_data_source(&mut self, data_source: DataSource, now: DateTime<Utc>) {
        let data = json!({ "dataSource": data_source });
        self.data_source = data_source;
        self.raise(EventType::DataSourceChanged, data, now);
    }

    pub fn add_dimension(&mut self, dimension: Dimension, now: DateTime<Utc>) -> DomainResult<()> {
        if dimension.name.is_empty() {
            return Err(DomainError::validation(
                ErrorCode::InvalidDimension,
                "dimension name cannot be empty",
            ));
        }
        if self.dimension(&dimension.name).is_some() {
            return Err(DomainError::validation(
                ErrorCode::DuplicateDimension,
                format!("dimension {} already exists", dimension.name),
            ));
        }

        let data = json!({ "dimension": dimension });
        self.dimensions.push(dimension);
        self.raise(EventType::DimensionAdded, data, now);
        Ok(())
    }

    pub fn remove_dimension(&mut self, name: &str, now: DateTime<Utc>) -> DomainResult<()> {
        let index = self
            .dimensions
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| DomainError::not_found("dimension", name))?;

        self.dimensions.remove(index);
        self.raise(
            EventType::DimensionRemoved,
            json!({ "dimensionName": name }),
            now,
        );
        Ok(())
    }

    /// Validate and install a derived-metric calculation
    ///
    /// On success the calculation is stamped valid at `now` and the metric
    /// becomes calculated.
    pub fn set_calculation(
        &mut self,
        mut calculation: MetricCalculation,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        validate_calculation(&calculation)?;

        calculation.is_valid = true;
        calculation.last_validated = Some(now);
        let data = json!({ "calculation": calculation });

        self.calculation = calculation;
        self.is_calculated = true;
        self.raise(EventType::CalculationUpdated, data, now);
        Ok(())
    }

    /// Insert or overwrite a filter
    pub fn add_filter(&mut self, key: impl Into<String>, value: Value, now: DateTime<Utc>) {
        let key = key.into();
        let data = json!({ "key": key, "value": value });
        self.filters.insert(key, value);
        self.raise(EventType::FilterAdded, data, now);
    }

    /// Returns whether a filter was removed; absent keys are a silent no-op
    pub fn remove_filter(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        if self.filters.remove(key).is_none() {
            return false;
        }
        self.raise(EventType::FilterRemoved, json!({ "key": key }), now);
        true
    }

    pub fn pending_events(&self) -> &[DomainEvent] {
        &self.events
    }

    pub fn take_pending_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn raise(&mut self, event_type: EventType, data: Value, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
        self.events.push(DomainEvent::new(
            event_type,
            self.id.as_str(),
            self.version,
            data,
            now,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 19, 12, 0, 0).unwrap()
    }

    fn metric() -> Metric {
        Metric::new(
            "Latency",
            "Request latency",
            MetricType::Histogram,
            MetricCategory::Performance,
            now(),
        )
    }

    #[test]
    fn test_new_metric_defaults() {
        let metric = metric();

        assert_eq!(metric.aggregation, AggregationType::Sum);
        assert!(metric.dimensions.is_empty());
        assert!(metric.filters.is_empty());
        assert!(!metric.is_calculated);
        assert_eq!(metric.version, 1);
        assert!(metric.pending_events().is_empty());
    }

    #[test_case("SUM" => Ok(AggregationType::Sum))]
    #[test_case("DISTINCT" => Ok(AggregationType::Distinct))]
    #[test_case("MEDIAN" => Err(Some(ErrorCode::InvalidAggregation)))]
    #[test_case("sum" => Err(Some(ErrorCode::InvalidAggregation)) ; "wire names are case sensitive")]
    fn test_aggregation_parsing(input: &str) -> Result<AggregationType, Option<ErrorCode>> {
        input.parse::<AggregationType>().map_err(|e| e.code())
    }

    #[test]
    fn test_set_aggregation_raises_event() {
        let mut metric = metric();
        metric.set_aggregation(AggregationType::Max, now());

        assert_eq!(metric.aggregation, AggregationType::Max);
        let event = &metric.pending_events()[0];
        assert_eq!(event.event_type, EventType::AggregationChanged);
        assert_eq!(event.field("aggregation"), Some(&json!("MAX")));
        assert_eq!(event.version, 2);
    }

    #[test]
    fn test_duplicate_dimension_is_rejected() {
        let mut metric = metric();
        metric
            .add_dimension(Dimension::new("region", DimensionType::String), now())
            .unwrap();
        let before = metric.clone();

        let err = metric
            .add_dimension(Dimension::new("region", DimensionType::Number), now())
            .unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::DuplicateDimension));
        assert_eq!(metric, before);
    }

    #[test]
    fn test_dimension_names_are_case_sensitive() {
        let mut metric = metric();
        metric
            .add_dimension(Dimension::new("region", DimensionType::String), now())
            .unwrap();
        metric
            .add_dimension(Dimension::new("Region", DimensionType::String), now())
            .unwrap();

        assert_eq!(metric.dimensions.len(), 2);
    }

    #[test]
    fn test_empty_dimension_name_is_invalid() {
        let mut metric = metric();
        let err = metric
            .add_dimension(Dimension::new("", DimensionType::String), now())
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidDimension));
    }

    #[test]
    fn test_remove_dimension() {
        let mut metric = metric();
        metric
            .add_dimension(Dimension::new("region", DimensionType::String), now())
            .unwrap();

        metric.remove_dimension("region", now()).unwrap();
        assert!(metric.dimensions.is_empty());
        assert_eq!(metric.version, 3);

        let before = metric.clone();
        assert!(metric.remove_dimension("region", now()).unwrap_err().is_not_found());
        assert_eq!(metric, before);
    }

    #[test]
    fn test_set_calculation_stamps_validation() {
        let mut metric = metric();
        let calculation = MetricCalculation::new("errors / requests")
            .with_condition(CalculationCondition::new("status", ConditionOperator::Ge, 500));

        metric.set_calculation(calculation, now()).unwrap();

        assert!(metric.is_calculated);
        assert!(metric.calculation.is_valid);
        assert_eq!(metric.calculation.last_validated, Some(now()));
        assert_eq!(
            metric.pending_events()[0].event_type,
            EventType::CalculationUpdated
        );
    }

    #[test]
    fn test_invalid_calculation_changes_nothing() {
        let mut metric = metric();
        let before = metric.clone();

        let err = metric
            .set_calculation(MetricCalculation::new("x"), now())
            .unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::InvalidFormula));
        assert_eq!(metric, before);
    }

    #[test]
    fn test_filters() {
        let mut metric = metric();
        metric.add_filter("env", json!("prod"), now());
        metric.add_filter("env", json!("staging"), now());

        assert_eq!(metric.filters.get("env"), Some(&json!("staging")));
        assert_eq!(metric.version, 3);

        assert!(!metric.remove_filter("missing", now()));
        assert_eq!(metric.version, 3);
        assert_eq!(metric.pending_events().len(), 2);

        assert!(metric.remove_filter("env", now()));
        assert_eq!(metric.version, 4);
        assert_eq!(
            metric.pending_events().last().unwrap().event_type,
            EventType::FilterRemoved
        );
    }

    #[test]
    fn test_unit_and_data_source() {
        let mut metric = metric();
        metric.set_unit("ms", now());
        metric.set_data_source(DataSource::new("prometheus", "http://prom:9090", "rate(x[5m])"), now());

        assert_eq!(metric.unit, "ms");
        assert_eq!(metric.data_source.source_type, "prometheus");
        let types: Vec<_> = metric.pending_events().iter().map(|e| e.event_type).collect();
        assert_eq!(types, vec![EventType::UnitChanged, EventType::DataSourceChanged]);
    }

    #[test]
    fn test_operator_wire_names() {
        assert_eq!(serde_json::to_value(ConditionOperator::NotIn).unwrap(), json!("NOT_IN"));
        assert_eq!(">=".parse::<ConditionOperator>().unwrap(), ConditionOperator::Ge);

        let condition: CalculationCondition =
            serde_json::from_value(json!({ "field": "region" })).unwrap();
        assert_eq!(condition.operator, None);
    }

    #[test]
    fn test_sample_dimension_matching() {
        let sample = MetricData::new(MetricId::from("m-1"), now(), 1.0)
            .with_dimension("region", "eu")
            .with_dimension("tier", 2);

        let mut wanted = HashMap::new();
        assert!(sample.matches_dimensions(&wanted));

        wanted.insert("region".to_string(), json!("eu"));
        assert!(sample.matches_dimensions(&wanted));

        wanted.insert("tier".to_string(), json!("2"));
        assert!(!sample.matches_dimensions(&wanted));
    }
}
