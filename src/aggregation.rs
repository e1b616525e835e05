// Copyright (c) 2025 - Cowboy AI, Inc.
//! Metric-Data Aggregation Engine
//!
//! Pure reduction of metric samples to a single value. Nothing here holds
//! state, so every function is safe to call from any number of tasks.
//!
//! # Reducers
//!
//! | aggregation | value                               | empty input |
//! |-------------|-------------------------------------|-------------|
//! | SUM         | Σ value                             | `None`      |
//! | AVG         | arithmetic mean                     | `None`      |
//! | MIN / MAX   | smallest / largest value            | `None`      |
//! | COUNT       | number of samples                   | `Some(0)`   |
//! | DISTINCT    | number of distinct values (by bits) | `Some(0)`   |
//!
//! DISTINCT compares values by their IEEE-754 bit pattern, so `0.0` and
//! `-0.0` are two values and every NaN payload is its own value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::domain::{AggregationType, MetricData, MetricId, TimeRange};

/// Id given to a sample synthesized from an aggregate
pub fn aggregated_sample_id(metric_id: &MetricId) -> String {
    format!("aggregated-{metric_id}")
}

/// Outcome of reducing a set of samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub aggregation: AggregationType,
    /// `None` means no data
    pub value: Option<f64>,
    pub sample_count: usize,
    /// Latest timestamp among contributing samples
    pub timestamp: Option<DateTime<Utc>>,
}

impl AggregateResult {
    pub fn has_data(&self) -> bool {
        self.sample_count > 0
    }

    /// Render as a synthetic sample with id `aggregated-{metric_id}`
    ///
    /// `None` when there is no value. A result without contributing samples
    /// is stamped with `fallback`.
    pub fn into_metric_data(
        self,
        metric_id: &MetricId,
        fallback: DateTime<Utc>,
    ) -> Option<MetricData> {
        let value = self.value?;
        Some(MetricData {
            id: aggregated_sample_id(metric_id),
            metric_id: metric_id.clone(),
            timestamp: self.timestamp.unwrap_or(fallback),
            value,
            dimensions: HashMap::new(),
            labels: HashMap::from([
                ("aggregation".to_string(), self.aggregation.to_string()),
                ("samples".to_string(), self.sample_count.to_string()),
            ]),
        })
    }
}

/// Samples of `metric_id` matching every requested dimension and inside `range`
pub fn select<'a>(
    samples: impl IntoIterator<Item = &'a MetricData>,
    metric_id: &MetricId,
    dimensions: Option<&HashMap<String, Value>>,
    range: Option<&TimeRange>,
) -> Vec<&'a MetricData> {
    samples
        .into_iter()
        .filter(|s| &s.metric_id == metric_id)
        .filter(|s| dimensions.map_or(true, |wanted| s.matches_dimensions(wanted)))
        .filter(|s| range.map_or(true, |r| r.contains(s.timestamp)))
        .collect()
}

/// Reduce samples already narrowed to one metric
///
/// When `range` is given only samples with `timestamp ∈ [start, end]` count.
pub fn aggregate<'a>(
    samples: impl IntoIterator<Item = &'a MetricData>,
    aggregation: AggregationType,
    range: Option<&TimeRange>,
) -> AggregateResult {
    let mut values = Vec::new();
    let mut latest: Option<DateTime<Utc>> = None;

    for sample in samples {
        if range.is_some_and(|r| !r.contains(sample.timestamp)) {
            continue;
        }
        values.push(sample.value);
        latest = Some(latest.map_or(sample.timestamp, |t| t.max(sample.timestamp)));
    }

    AggregateResult {
        aggregation,
        value: reduce(&values, aggregation),
        sample_count: values.len(),
        timestamp: latest,
    }
}

/// Apply one reducer to raw values
pub fn reduce(values: &[f64], aggregation: AggregationType) -> Option<f64> {
    match aggregation {
        AggregationType::Count => Some(values.len() as f64),
        AggregationType::Distinct => {
            let distinct: HashSet<u64> = values.iter().map(|v| v.to_bits()).collect();
            Some(distinct.len() as f64)
        }
        _ if values.is_empty() => None,
        AggregationType::Sum => Some(values.iter().sum()),
        AggregationType::Avg => Some(values.iter().sum::<f64>() / values.len() as f64),
        AggregationType::Min => values.iter().copied().reduce(f64::min),
        AggregationType::Max => values.iter().copied().reduce(f64::max),
    }
}
