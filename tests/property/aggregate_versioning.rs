// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Aggregate Versioning
//!
//! Every successful mutation bumps the version by exactly one and raises
//! exactly one event carrying that version. Every failed mutation leaves
//! the aggregate untouched.

use analytics_dashboard::domain::{
    AggregationType, Dimension, DimensionType, Metric, MetricCategory, MetricType, Report,
    ReportStatus, ReportType, UserId,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug, Clone)]
enum MetricCommand {
    SetUnit(String),
    SetAggregation(AggregationType),
    AddDimension(String),
    RemoveDimension(String),
    AddFilter(String),
    RemoveFilter(String),
}

#[derive(Debug, Clone)]
enum ReportCommand {
    AddRecipient(String),
    RemoveRecipient(String),
    SetStatus(ReportStatus),
    MarkGenerated,
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 19, 12, 0, 0).unwrap()
}

/// Apply a command; `Ok(false)` means an accepted no-op
fn apply_metric(metric: &mut Metric, command: MetricCommand, now: DateTime<Utc>) -> Result<bool, ()> {
    match command {
        MetricCommand::SetUnit(unit) => metric.set_unit(unit, now),
        MetricCommand::SetAggregation(aggregation) => metric.set_aggregation(aggregation, now),
        MetricCommand::AddDimension(name) => metric
            .add_dimension(Dimension::new(name, DimensionType::String), now)
            .map_err(|_| ())?,
        MetricCommand::RemoveDimension(name) => metric.remove_dimension(&name, now).map_err(|_| ())?,
        MetricCommand::AddFilter(key) => metric.add_filter(key, json!(1), now),
        MetricCommand::RemoveFilter(key) => return Ok(metric.remove_filter(&key, now)),
    }
    Ok(true)
}

fn apply_report(report: &mut Report, command: ReportCommand, now: DateTime<Utc>) -> Result<(), ()> {
    match command {
        ReportCommand::AddRecipient(email) => report.add_recipient(email, now).map_err(|_| ()),
        ReportCommand::RemoveRecipient(email) => report.remove_recipient(&email, now).map_err(|_| ()),
        ReportCommand::SetStatus(status) => {
            report.set_status(status, now);
            Ok(())
        }
        ReportCommand::MarkGenerated => {
            report.mark_as_generated(now);
            Ok(())
        }
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Small name pool so duplicates and misses both occur
fn name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["region", "host", "env", ""]).prop_map(String::from)
}

fn aggregation() -> impl Strategy<Value = AggregationType> {
    prop::sample::select(AggregationType::ALL.to_vec())
}

fn metric_command() -> impl Strategy<Value = MetricCommand> {
    prop_oneof![
        "[a-z%]{0,8}".prop_map(MetricCommand::SetUnit),
        aggregation().prop_map(MetricCommand::SetAggregation),
        name().prop_map(MetricCommand::AddDimension),
        name().prop_map(MetricCommand::RemoveDimension),
        name().prop_map(MetricCommand::AddFilter),
        name().prop_map(MetricCommand::RemoveFilter),
    ]
}

fn report_command() -> impl Strategy<Value = ReportCommand> {
    let email = prop::sample::select(vec!["a@example.com", "b@example.com", ""]).prop_map(String::from);
    prop_oneof![
        email.clone().prop_map(ReportCommand::AddRecipient),
        email.prop_map(ReportCommand::RemoveRecipient),
        prop::sample::select(ReportStatus::ALL.to_vec()).prop_map(ReportCommand::SetStatus),
        Just(ReportCommand::MarkGenerated),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: One mutation, one version, one event
    #[test]
    fn prop_metric_version_tracks_events(commands in prop::collection::vec(metric_command(), 0..40)) {
        let mut metric = Metric::new("m", "", MetricType::Gauge, MetricCategory::System, base_time());

        for (step, command) in commands.into_iter().enumerate() {
            let before = metric.clone();
            let now = base_time() + Duration::seconds(step as i64 + 1);

            match apply_metric(&mut metric, command, now) {
                Ok(true) => {
                    prop_assert_eq!(metric.version, before.version + 1);
                    prop_assert_eq!(metric.updated_at, now);

                    let events = metric.take_pending_events();
                    prop_assert_eq!(events.len(), 1);
                    prop_assert_eq!(events[0].version, metric.version);
                    prop_assert_eq!(events[0].aggregate_id.as_str(), metric.id.as_str());
                }
                Ok(false) | Err(()) => {
                    prop_assert_eq!(&metric, &before, "rejected or no-op command must not change the metric");
                }
            }
        }
    }

    /// Property: Report versions only move forward, one step per accepted command
    #[test]
    fn prop_report_version_tracks_events(commands in prop::collection::vec(report_command(), 0..40)) {
        let mut report = Report::new("r", "", ReportType::Custom, UserId::from("u"), base_time());
        let mut accepted = 0u64;

        for (step, command) in commands.into_iter().enumerate() {
            let before = report.clone();
            let now = base_time() + Duration::seconds(step as i64 + 1);

            if apply_report(&mut report, command, now).is_ok() {
                accepted += 1;
            } else {
                prop_assert_eq!(&report, &before);
            }
        }

        let events = report.take_pending_events();
        prop_assert_eq!(report.version, 1 + accepted);
        prop_assert_eq!(events.len() as u64, accepted);

        let versions: Vec<u64> = events.iter().map(|e| e.version).collect();
        let expected: Vec<u64> = (2..=report.version).collect();
        prop_assert_eq!(versions, expected);
    }
}
