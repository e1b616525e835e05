// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for analytics-dashboard
//!
//! Deterministic ids, a fixed clock and fully wired in-memory services.
//!
//! # Design Principles
//! - Time comes from a [`FixedClock`] starting at [`FIXED_TIMESTAMP`]
//! - Aggregate ids are fixed constants wherever a test asserts on them
//! - Every service shares one [`InMemoryEventBus`] so tests can inspect what was published

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use analytics_dashboard::domain::{
    Dashboard, DashboardId, Metric, MetricCategory, MetricData, MetricId, MetricType, Report,
    ReportId, ReportType, UserId, Widget, WidgetPosition, WidgetSize, WidgetType,
};
use analytics_dashboard::events::{DomainEvent, EventType};
use analytics_dashboard::repository::{
    InMemoryDashboardRepository, InMemoryMetricDataStore, InMemoryMetricRepository,
    InMemoryReportRepository,
};
use analytics_dashboard::{
    DashboardService, EventBus, FixedClock, InMemoryEventBus, MetricService, ReportService,
};

pub const EVENT_ID_1: &str = "01934f4a-0001-7000-8000-000000000001";

pub const DASHBOARD_ID_1: &str = "01934f4a-1000-7000-8000-000000001000";
pub const METRIC_ID_1: &str = "01934f4a-2000-7000-8000-000000002000";
pub const REPORT_ID_1: &str = "01934f4a-3000-7000-8000-000000003000";
pub const WIDGET_ID_1: &str = "01934f4a-4000-7000-8000-000000004000";

pub const OWNER_ID_1: &str = "user-001";
pub const OWNER_ID_2: &str = "user-002";

pub const CORRELATION_ID_1: &str = "01934f4a-c001-7000-8000-00000000c001";

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

/// Fixed timestamp shifted by whole minutes
pub fn minutes(offset: i64) -> DateTime<Utc> {
    fixed_timestamp() + Duration::minutes(offset)
}

pub fn widget_at(x: i32, y: i32, width: i32, height: i32) -> Widget {
    Widget::new(
        WidgetType::Chart,
        "Requests",
        WidgetPosition { x, y },
        WidgetSize { width, height },
    )
}

pub fn dashboard_fixture() -> Dashboard {
    Dashboard::with_id(
        DashboardId::from(DASHBOARD_ID_1),
        "Operations",
        "Service health overview",
        UserId::from(OWNER_ID_1),
        fixed_timestamp(),
    )
}

pub fn metric_fixture() -> Metric {
    Metric::with_id(
        MetricId::from(METRIC_ID_1),
        "http.latency",
        "Request latency",
        MetricType::Histogram,
        MetricCategory::Performance,
        fixed_timestamp(),
    )
}

pub fn report_fixture() -> Report {
    Report::with_id(
        ReportId::from(REPORT_ID_1),
        "Weekly performance",
        "",
        ReportType::Performance,
        UserId::from(OWNER_ID_1),
        fixed_timestamp(),
    )
}

pub fn sample(metric_id: &str, offset_minutes: i64, value: f64) -> MetricData {
    MetricData::new(MetricId::from(metric_id), minutes(offset_minutes), value)
}

/// A published event with fixed id and timestamp
pub fn widget_added_event_fixture() -> DomainEvent {
    let mut event = DomainEvent::new(
        EventType::WidgetAdded,
        DASHBOARD_ID_1,
        2,
        serde_json::json!({ "widgetId": WIDGET_ID_1, "type": "CHART" }),
        fixed_timestamp(),
    );
    event.id = parse_uuid(EVENT_ID_1);
    event
}

/// All three services over shared in-memory storage and bus
pub struct TestContext {
    pub clock: Arc<FixedClock>,
    pub bus: Arc<InMemoryEventBus>,
    pub dashboard_repository: Arc<InMemoryDashboardRepository>,
    pub metric_repository: Arc<InMemoryMetricRepository>,
    pub report_repository: Arc<InMemoryReportRepository>,
    pub metric_data: Arc<InMemoryMetricDataStore>,
    pub dashboards: DashboardService,
    pub metrics: MetricService,
    pub reports: ReportService,
}

impl TestContext {
    pub fn new() -> Self {
        let clock = Arc::new(FixedClock::new(fixed_timestamp()));
        let bus = Arc::new(InMemoryEventBus::new());
        let dashboard_repository = Arc::new(InMemoryDashboardRepository::new());
        let metric_repository = Arc::new(InMemoryMetricRepository::new());
        let report_repository = Arc::new(InMemoryReportRepository::new());
        let metric_data = Arc::new(InMemoryMetricDataStore::new());

        let events: Arc<dyn EventBus> = bus.clone();

        Self {
            dashboards: DashboardService::new(
                dashboard_repository.clone(),
                events.clone(),
                clock.clone(),
            ),
            metrics: MetricService::new(
                metric_repository.clone(),
                metric_data.clone(),
                events.clone(),
                clock.clone(),
            ),
            reports: ReportService::new(report_repository.clone(), events, clock.clone()),
            clock,
            bus,
            dashboard_repository,
            metric_repository,
            report_repository,
            metric_data,
        }
    }

    pub async fn published_types(&self) -> Vec<EventType> {
        self.bus.published_types().await
    }
}
