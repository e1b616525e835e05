// Copyright (c) 2025 - Cowboy AI, Inc.
//! Persistence interfaces
//!
//! One repository per aggregate plus a store for raw metric samples.
//!
//! # Optimistic Concurrency
//!
//! `update` takes the version the caller loaded. The write succeeds only when
//! the stored version still equals it; otherwise it fails with
//! [`InfrastructureError::ConcurrencyConflict`](crate::errors::InfrastructureError::ConcurrencyConflict).
//!
//! Pending events are never persisted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

use crate::aggregation::AggregateResult;
use crate::domain::{
    AggregationType, Dashboard, DashboardId, Metric, MetricCategory, MetricData, MetricId,
    MetricType, Report, ReportId, ReportStatus, TimeRange, UserId,
};
use crate::errors::InfrastructureResult;

pub mod memory;

pub use memory::{
    InMemoryDashboardRepository, InMemoryMetricDataStore, InMemoryMetricRepository,
    InMemoryReportRepository, InMemoryRepository,
};

#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn save(&self, dashboard: &Dashboard) -> InfrastructureResult<DashboardId>;

    async fn find_by_id(&self, id: &DashboardId) -> InfrastructureResult<Dashboard>;

    async fn find_by_owner(&self, owner_id: &UserId) -> InfrastructureResult<Vec<Dashboard>>;

    async fn find_public(&self) -> InfrastructureResult<Vec<Dashboard>>;

    async fn update(&self, dashboard: &Dashboard, expected_version: u64) -> InfrastructureResult<()>;

    async fn delete(&self, id: &DashboardId) -> InfrastructureResult<()>;
}

#[async_trait]
pub trait MetricRepository: Send + Sync {
    async fn save(&self, metric: &Metric) -> InfrastructureResult<MetricId>;

    async fn find_by_id(&self, id: &MetricId) -> InfrastructureResult<Metric>;

    async fn find_by_category(&self, category: MetricCategory) -> InfrastructureResult<Vec<Metric>>;

    async fn find_by_type(&self, metric_type: MetricType) -> InfrastructureResult<Vec<Metric>>;

    async fn find_all(&self) -> InfrastructureResult<Vec<Metric>>;

    async fn update(&self, metric: &Metric, expected_version: u64) -> InfrastructureResult<()>;

    async fn delete(&self, id: &MetricId) -> InfrastructureResult<()>;
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn save(&self, report: &Report) -> InfrastructureResult<ReportId>;

    async fn find_by_id(&self, id: &ReportId) -> InfrastructureResult<Report>;

    async fn find_by_owner(&self, owner_id: &UserId) -> InfrastructureResult<Vec<Report>>;

    async fn find_by_status(&self, status: ReportStatus) -> InfrastructureResult<Vec<Report>>;

    /// ACTIVE, scheduled reports whose next run is at or before `before`
    async fn find_scheduled(&self, before: DateTime<Utc>) -> InfrastructureResult<Vec<Report>>;

    async fn update(&self, report: &Report, expected_version: u64) -> InfrastructureResult<()>;

    async fn delete(&self, id: &ReportId) -> InfrastructureResult<()>;
}

/// Store of raw metric samples
///
/// Query results are ordered by timestamp, oldest first.
#[async_trait]
pub trait MetricDataStore: Send + Sync {
    async fn save(&self, sample: &MetricData) -> InfrastructureResult<()>;

    async fn save_batch(&self, samples: &[MetricData]) -> InfrastructureResult<()>;

    async fn find_by_metric_id(
        &self,
        metric_id: &MetricId,
        range: Option<TimeRange>,
    ) -> InfrastructureResult<Vec<MetricData>>;

    /// Exact match on every requested dimension
    async fn find_by_metric_id_and_dimensions(
        &self,
        metric_id: &MetricId,
        dimensions: &HashMap<String, Value>,
        range: Option<TimeRange>,
    ) -> InfrastructureResult<Vec<MetricData>>;

    async fn aggregate_by_metric_id(
        &self,
        metric_id: &MetricId,
        aggregation: AggregationType,
        range: Option<TimeRange>,
    ) -> InfrastructureResult<AggregateResult>;

    /// Remove samples strictly older than `before`, returning how many went
    async fn delete_older_than(&self, before: DateTime<Utc>) -> InfrastructureResult<usize>;
}
