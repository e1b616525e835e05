// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Aggregation Engine

use analytics_dashboard::aggregation::{aggregate, reduce};
use analytics_dashboard::domain::{AggregationType, MetricData, MetricId, TimeRange};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

fn t(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 19, 12, 0, 0).unwrap() + Duration::minutes(minutes)
}

/// Integral values keep sums exact
fn values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((-1000i32..1000).prop_map(f64::from), 0..30)
}

fn samples() -> impl Strategy<Value = Vec<MetricData>> {
    prop::collection::vec((0i64..120, -100i32..100), 0..30).prop_map(|points| {
        points
            .into_iter()
            .map(|(minute, value)| MetricData::new(MetricId::from("m"), t(minute), f64::from(value)))
            .collect()
    })
}

proptest! {
    /// Property: COUNT is the number of values, DISTINCT never exceeds it
    #[test]
    fn prop_count_and_distinct(values in values()) {
        let count = reduce(&values, AggregationType::Count);
        let distinct = reduce(&values, AggregationType::Distinct);

        prop_assert_eq!(count, Some(values.len() as f64));
        prop_assert!(distinct.unwrap_or_default() <= values.len() as f64);
    }

    /// Property: MIN ≤ AVG ≤ MAX, and all three are absent for no data
    #[test]
    fn prop_avg_between_min_and_max(values in values()) {
        let min = reduce(&values, AggregationType::Min);
        let avg = reduce(&values, AggregationType::Avg);
        let max = reduce(&values, AggregationType::Max);

        if values.is_empty() {
            prop_assert_eq!((min, avg, max), (None, None, None));
        } else {
            let (min, avg, max) = (min.unwrap(), avg.unwrap(), max.unwrap());
            prop_assert!(min <= avg && avg <= max);
            prop_assert_eq!(reduce(&values, AggregationType::Sum), Some(values.iter().sum::<f64>()));
        }
    }

    /// Property: Windowed aggregation equals aggregation over pre-filtered samples
    #[test]
    fn prop_window_matches_filter(samples in samples(), start in 0i64..60, len in 1i64..60) {
        let range = TimeRange::new(t(start), t(start + len));
        let inside: Vec<&MetricData> = samples.iter().filter(|s| range.contains(s.timestamp)).collect();

        let windowed = aggregate(&samples, AggregationType::Sum, Some(&range));
        let filtered = aggregate(inside.iter().copied(), AggregationType::Sum, None);

        prop_assert_eq!(windowed, filtered);
    }
}
