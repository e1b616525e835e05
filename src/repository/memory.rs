// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory storage
//!
//! Backs tests and single-process deployments. Aggregates are stored without
//! their pending events and listed by creation time; samples are kept in
//! timestamp order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{DashboardRepository, MetricDataStore, MetricRepository, ReportRepository};
use crate::aggregate::AggregateRoot;
use crate::aggregation::{self, AggregateResult};
use crate::domain::{
    AggregationType, Dashboard, DashboardId, Metric, MetricCategory, MetricData, MetricId,
    MetricType, Report, ReportId, ReportStatus, TimeRange, UserId,
};
use crate::errors::{InfrastructureError, InfrastructureResult};

/// Version-checked map of aggregates keyed by id
pub struct InMemoryRepository<A: AggregateRoot> {
    records: RwLock<HashMap<A::Id, A>>,
}

pub type InMemoryDashboardRepository = InMemoryRepository<Dashboard>;
pub type InMemoryMetricRepository = InMemoryRepository<Metric>;
pub type InMemoryReportRepository = InMemoryRepository<Report>;

impl<A: AggregateRoot> Default for InMemoryRepository<A> {
    fn default() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl<A: AggregateRoot> InMemoryRepository<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn stored_copy(aggregate: &A) -> A {
        let mut copy = aggregate.clone();
        copy.take_pending_events();
        copy
    }

    async fn insert(&self, aggregate: &A) -> InfrastructureResult<A::Id> {
        let mut records = self.records.write().await;
        let id = aggregate.id().clone();

        if records.contains_key(&id) {
            return Err(InfrastructureError::Storage(format!(
                "{} {} already exists",
                A::KIND,
                id
            )));
        }

        records.insert(id.clone(), Self::stored_copy(aggregate));
        debug!(kind = %A::KIND, id = %id, "Stored aggregate");
        Ok(id)
    }

    async fn get(&self, id: &A::Id) -> InfrastructureResult<A> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| InfrastructureError::not_found(A::KIND.as_str(), id.to_string()))
    }

    async fn select<F>(&self, predicate: F) -> Vec<A>
    where
        F: Fn(&A) -> bool,
    {
        let mut found: Vec<A> = self
            .records
            .read()
            .await
            .values()
            .filter(|a| predicate(a))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        found
    }

    /// Compare-and-swap on the stored version
    async fn replace(&self, aggregate: &A, expected_version: u64) -> InfrastructureResult<()> {
        let mut records = self.records.write().await;
        let id = aggregate.id();

        let stored = records
            .get_mut(id)
            .ok_or_else(|| InfrastructureError::not_found(A::KIND.as_str(), id.to_string()))?;

        if stored.version() != expected_version {
            return Err(InfrastructureError::ConcurrencyConflict {
                entity: A::KIND.as_str(),
                id: id.to_string(),
                expected: expected_version,
                actual: stored.version(),
            });
        }

        *stored = Self::stored_copy(aggregate);
        debug!(kind = %A::KIND, id = %id, version = aggregate.version(), "Updated aggregate");
        Ok(())
    }

    async fn remove(&self, id: &A::Id) -> InfrastructureResult<()> {
        self.records
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| InfrastructureError::not_found(A::KIND.as_str(), id.to_string()))
    }
}

#[async_trait]
impl DashboardRepository for InMemoryRepository<Dashboard> {
    async fn save(&self, dashboard: &Dashboard) -> InfrastructureResult<DashboardId> {
        self.insert(dashboard).await
    }

    async fn find_by_id(&self, id: &DashboardId) -> InfrastructureResult<Dashboard> {
        self.get(id).await
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> InfrastructureResult<Vec<Dashboard>> {
        Ok(self.select(|d| &d.owner_id == owner_id).await)
    }

    async fn find_public(&self) -> InfrastructureResult<Vec<Dashboard>> {
        Ok(self.select(|d| d.is_public).await)
    }

    async fn update(&self, dashboard: &Dashboard, expected_version: u64) -> InfrastructureResult<()> {
        self.replace(dashboard, expected_version).await
    }

    async fn delete(&self, id: &DashboardId) -> InfrastructureResult<()> {
        self.remove(id).await
    }
}

#[async_trait]
impl MetricRepository for InMemoryRepository<Metric> {
    async fn save(&self, metric: &Metric) -> InfrastructureResult<MetricId> {
        self.insert(metric).await
    }

    async fn find_by_id(&self, id: &MetricId) -> InfrastructureResult<Metric> {
        self.get(id).await
    }

    async fn find_by_category(&self, category: MetricCategory) -> InfrastructureResult<Vec<Metric>> {
        Ok(self.select(|m| m.category == category).await)
    }

    async fn find_by_type(&self, metric_type: MetricType) -> InfrastructureResult<Vec<Metric>> {
        Ok(self.select(|m| m.metric_type == metric_type).await)
    }

    async fn find_all(&self) -> InfrastructureResult<Vec<Metric>> {
        Ok(self.select(|_| true).await)
    }

    async fn update(&self, metric: &Metric, expected_version: u64) -> InfrastructureResult<()> {
        self.replace(metric, expected_version).await
    }

    async fn delete(&self, id: &MetricId) -> InfrastructureResult<()> {
        self.remove(id).await
    }
}

#[async_trait]
impl ReportRepository for InMemoryRepository<Report> {
    async fn save(&self, report: &Report) -> InfrastructureResult<ReportId> {
        self.insert(report).await
    }

    async fn find_by_id(&self, id: &ReportId) -> InfrastructureResult<Report> {
        self.get(id).await
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> InfrastructureResult<Vec<Report>> {
        Ok(self.select(|r| &r.owner_id == owner_id).await)
    }

    async fn find_by_status(&self, status: ReportStatus) -> InfrastructureResult<Vec<Report>> {
        Ok(self.select(|r| r.status == status).await)
    }

    async fn find_scheduled(&self, before: DateTime<Utc>) -> InfrastructureResult<Vec<Report>> {
        Ok(self.select(|r| r.is_due(before)).await)
    }

    async fn update(&self, report: &Report, expected_version: u64) -> InfrastructureResult<()> {
        self.replace(report, expected_version).await
    }

    async fn delete(&self, id: &ReportId) -> InfrastructureResult<()> {
        self.remove(id).await
    }
}

/// Samples kept sorted by timestamp
#[derive(Default)]
pub struct InMemoryMetricDataStore {
    samples: RwLock<Vec<MetricData>>,
}

impl InMemoryMetricDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.samples.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.samples.read().await.is_empty()
    }

    fn insert_sorted(samples: &mut Vec<MetricData>, sample: MetricData) {
        let at = samples.partition_point(|s| s.timestamp <= sample.timestamp);
        samples.insert(at, sample);
    }
}

#[async_trait]
impl MetricDataStore for InMemoryMetricDataStore {
    async fn save(&self, sample: &MetricData) -> InfrastructureResult<()> {
        let mut samples = self.samples.write().await;
        Self::insert_sorted(&mut samples, sample.clone());
        Ok(())
    }

    async fn save_batch(&self, batch: &[MetricData]) -> InfrastructureResult<()> {
        let mut samples = self.samples.write().await;
        for sample in batch {
            Self::insert_sorted(&mut samples, sample.clone());
        }
        debug!(count = batch.len(), "Stored metric samples");
        Ok(())
    }

    async fn find_by_metric_id(
        &self,
        metric_id: &MetricId,
        range: Option<TimeRange>,
    ) -> InfrastructureResult<Vec<MetricData>> {
        let samples = self.samples.read().await;
        Ok(aggregation::select(samples.iter(), metric_id, None, range.as_ref())
            .into_iter()
            .cloned()
            .collect())
    }

    async fn find_by_metric_id_and_dimensions(
        &self,
        metric_id: &MetricId,
        dimensions: &HashMap<String, Value>,
        range: Option<TimeRange>,
    ) -> InfrastructureResult<Vec<MetricData>> {
        let samples = self.samples.read().await;
        Ok(
            aggregation::select(samples.iter(), metric_id, Some(dimensions), range.as_ref())
                .into_iter()
                .cloned()
                .collect(),
        )
    }

    async fn aggregate_by_metric_id(
        &self,
        metric_id: &MetricId,
        aggregation_type: AggregationType,
        range: Option<TimeRange>,
    ) -> InfrastructureResult<AggregateResult> {
        let samples = self.samples.read().await;
        let selected = aggregation::select(samples.iter(), metric_id, None, None);
        Ok(aggregation::aggregate(
            selected,
            aggregation_type,
            range.as_ref(),
        ))
    }

    async fn delete_older_than(&self, before: DateTime<Utc>) -> InfrastructureResult<usize> {
        let mut samples = self.samples.write().await;
        let len = samples.len();
        samples.retain(|s| s.timestamp >= before);
        Ok(len - samples.len())
    }
}
