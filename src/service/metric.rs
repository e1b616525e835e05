// Copyright (c) 2025 - Cowboy AI, Inc.
//! Metric definitions and their sample data
//!
//! Definition commands follow the same load / mutate / update / publish
//! cycle as the other services. Sample recording and querying go straight
//! to the [`MetricDataStore`] after checking the metric exists.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

use super::{publish_events, validate_range, Clock, ServiceResult};
use crate::aggregate::CreateMetricCommand;
use crate::aggregation::AggregateResult;
use crate::domain::invariants::validate_unit;
use crate::domain::{
    AggregationType, DataSource, Dimension, DomainResult, Metric, MetricCalculation,
    MetricCategory, MetricData, MetricId, MetricType, TimeRange,
};
use crate::event_bus::EventBus;
use crate::events::{DomainEvent, EventType};
use crate::repository::{MetricDataStore, MetricRepository};

pub struct MetricService {
    repository: Arc<dyn MetricRepository>,
    data: Arc<dyn MetricDataStore>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn Clock>,
}

impl MetricService {
    pub fn new(
        repository: Arc<dyn MetricRepository>,
        data: Arc<dyn MetricDataStore>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            data,
            events,
            clock,
        }
    }

    /// Create a metric; a non-empty unit is applied as a follow-up change
    pub async fn create(&self, command: CreateMetricCommand) -> ServiceResult<Metric> {
        let (metric_type, category) = command.validate()?;
        let now = self.clock.now();

        let mut metric = Metric::new(command.name, command.description, metric_type, category, now);
        let created = DomainEvent::new(
            EventType::MetricCreated,
            metric.id.as_str(),
            metric.version,
            json!({ "name": metric.name, "type": metric_type, "category": category }),
            now,
        );
        if !command.unit.is_empty() {
            metric.set_unit(command.unit, now);
        }

        self.repository.save(&metric).await?;

        let mut events = vec![created];
        events.extend(metric.take_pending_events());
        publish_events(self.events.as_ref(), events).await;

        info!(metric_id = %metric.id, metric_type = %metric_type, category = %category, "Metric created");
        Ok(metric)
    }

    pub async fn get(&self, id: &MetricId) -> ServiceResult<Metric> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// All metrics, optionally narrowed by category and type
    pub async fn list(
        &self,
        category: Option<MetricCategory>,
        metric_type: Option<MetricType>,
    ) -> ServiceResult<Vec<Metric>> {
        let metrics = match (category, metric_type) {
            (Some(category), Some(metric_type)) => self
                .repository
                .find_by_category(category)
                .await?
                .into_iter()
                .filter(|m| m.metric_type == metric_type)
                .collect(),
            (Some(category), None) => self.repository.find_by_category(category).await?,
            (None, Some(metric_type)) => self.repository.find_by_type(metric_type).await?,
            (None, None) => self.repository.find_all().await?,
        };
        Ok(metrics)
    }

    pub async fn set_unit(&self, id: &MetricId, unit: impl Into<String>) -> ServiceResult<Metric> {
        let unit = unit.into();
        validate_unit(&unit)?;
        self.execute(id, |m, now| {
            m.set_unit(unit, now);
            Ok(())
        })
        .await
    }

    pub async fn set_aggregation(
        &self,
        id: &MetricId,
        aggregation: AggregationType,
    ) -> ServiceResult<Metric> {
        self.execute(id, |m, now| {
            m.set_aggregation(aggregation, now);
            Ok(())
        })
        .await
    }

    pub async fn set_data_source(&self, id: &MetricId, data_source: DataSource) -> ServiceResult<Metric> {
        self.execute(id, |m, now| {
            m.set_data_source(data_source, now);
            Ok(())
        })
        .await
    }

    pub async fn add_dimension(&self, id: &MetricId, dimension: Dimension) -> ServiceResult<Metric> {
        self.execute(id, |m, now| m.add_dimension(dimension, now)).await
    }

    pub async fn remove_dimension(&self, id: &MetricId, name: &str) -> ServiceResult<Metric> {
        self.execute(id, |m, now| m.remove_dimension(name, now)).await
    }

    pub async fn set_calculation(
        &self,
        id: &MetricId,
        calculation: MetricCalculation,
    ) -> ServiceResult<Metric> {
        self.execute(id, |m, now| m.set_calculation(calculation, now)).await
    }

    pub async fn add_filter(
        &self,
        id: &MetricId,
        key: impl Into<String>,
        value: Value,
    ) -> ServiceResult<Metric> {
        let key = key.into();
        self.execute(id, |m, now| {
            m.add_filter(key, value, now);
            Ok(())
        })
        .await
    }

    /// Removing an absent filter leaves the metric untouched
    pub async fn remove_filter(&self, id: &MetricId, key: &str) -> ServiceResult<Metric> {
        self.execute(id, |m, now| {
            m.remove_filter(key, now);
            Ok(())
        })
        .await
    }

    pub async fn delete(&self, id: &MetricId) -> ServiceResult<()> {
        self.repository.delete(id).await?;
        info!(metric_id = %id, "Metric deleted");
        Ok(())
    }

    pub async fn record_sample(&self, sample: MetricData) -> ServiceResult<()> {
        self.repository.find_by_id(&sample.metric_id).await?;
        self.data.save(&sample).await?;
        debug!(metric_id = %sample.metric_id, value = sample.value, "Sample recorded");
        Ok(())
    }

    /// Record a batch; every referenced metric must exist or nothing is stored
    pub async fn record_samples(&self, samples: Vec<MetricData>) -> ServiceResult<usize> {
        let metric_ids: BTreeSet<&MetricId> = samples.iter().map(|s| &s.metric_id).collect();
        for metric_id in metric_ids {
            self.repository.find_by_id(metric_id).await?;
        }

        self.data.save_batch(&samples).await?;
        debug!(count = samples.len(), "Samples recorded");
        Ok(samples.len())
    }

    pub async fn get_metric_data(
        &self,
        id: &MetricId,
        range: Option<TimeRange>,
    ) -> ServiceResult<Vec<MetricData>> {
        validate_range(range.as_ref())?;
        Ok(self.data.find_by_metric_id(id, range).await?)
    }

    pub async fn get_metric_data_by_dimensions(
        &self,
        id: &MetricId,
        dimensions: &HashMap<String, Value>,
        range: Option<TimeRange>,
    ) -> ServiceResult<Vec<MetricData>> {
        validate_range(range.as_ref())?;
        Ok(self
            .data
            .find_by_metric_id_and_dimensions(id, dimensions, range)
            .await?)
    }

    /// Reduce a metric's samples, defaulting to the metric's own aggregation
    pub async fn aggregate(
        &self,
        id: &MetricId,
        aggregation: Option<AggregationType>,
        range: Option<TimeRange>,
    ) -> ServiceResult<AggregateResult> {
        validate_range(range.as_ref())?;
        let metric = self.repository.find_by_id(id).await?;
        let aggregation = aggregation.unwrap_or(metric.aggregation);

        let result = self
            .data
            .aggregate_by_metric_id(id, aggregation, range)
            .await?;
        debug!(
            metric_id = %id,
            aggregation = %aggregation,
            samples = result.sample_count,
            "Metric aggregated"
        );
        Ok(result)
    }

    /// Aggregate rendered as a synthetic `aggregated-{id}` sample
    pub async fn aggregate_as_sample(
        &self,
        id: &MetricId,
        aggregation: Option<AggregationType>,
        range: Option<TimeRange>,
    ) -> ServiceResult<Option<MetricData>> {
        let result = self.aggregate(id, aggregation, range).await?;
        Ok(result.into_metric_data(id, self.clock.now()))
    }

    /// Drop samples older than `now - retention`
    pub async fn purge_older_than(&self, retention: Duration) -> ServiceResult<usize> {
        let cutoff = self.clock.now() - retention;
        let removed = self.data.delete_older_than(cutoff).await?;
        info!(removed, cutoff = %cutoff, "Purged metric samples");
        Ok(removed)
    }

    async fn execute<F>(&self, id: &MetricId, mutation: F) -> ServiceResult<Metric>
    where
        F: FnOnce(&mut Metric, DateTime<Utc>) -> DomainResult<()> + Send,
    {
        let mut metric = self.repository.find_by_id(id).await?;
        let loaded = metric.version;

        mutation(&mut metric, self.clock.now())?;
        if metric.version == loaded {
            return Ok(metric);
        }

        self.repository.update(&metric, loaded).await?;
        publish_events(self.events.as_ref(), metric.take_pending_events()).await;
        Ok(metric)
    }
}
