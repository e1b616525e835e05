// Copyright (c) 2025 - Cowboy AI, Inc.
//! Report definitions, scheduling and generation
//!
//! Rendering and delivery live behind [`ReportGenerator`] and
//! [`ReportNotifier`]. The service only drives the status lifecycle around
//! them:
//!
//! ```text
//! ACTIVE ──generate──▶ GENERATING ──ok──▶ ACTIVE (lastGeneratedAt, nextRunAt)
//!                           │
//!                           └──err──▶ ERROR
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{publish_events, Clock, ServiceResult};
use crate::aggregate::CreateReportCommand;
use crate::domain::{
    DomainResult, MetricData, OutputFormat, Report, ReportId, ReportSchedule, ReportStatus,
    ReportTemplate, UserId,
};
use crate::errors::InfrastructureResult;
use crate::event_bus::EventBus;
use crate::events::{DomainEvent, EventType};
use crate::repository::ReportRepository;

/// Data handed to a generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    /// Raw or aggregated samples
    pub samples: Vec<MetricData>,
    pub parameters: HashMap<String, Value>,
}

impl ReportData {
    pub fn new(samples: Vec<MetricData>) -> Self {
        Self {
            samples,
            parameters: HashMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Rendered report
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    pub report_id: ReportId,
    pub format: OutputFormat,
    pub content: Vec<u8>,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedReport {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// Renders a report into bytes of its output format
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, report: &Report, data: &ReportData) -> InfrastructureResult<Vec<u8>>;
}

/// Delivers a rendered report to its recipients
#[async_trait]
pub trait ReportNotifier: Send + Sync {
    async fn notify(
        &self,
        report: &Report,
        output: &GeneratedReport,
        recipients: &[String],
    ) -> InfrastructureResult<()>;
}

pub struct ReportService {
    repository: Arc<dyn ReportRepository>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    pub fn new(
        repository: Arc<dyn ReportRepository>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            events,
            clock,
        }
    }

    pub async fn create(&self, command: CreateReportCommand) -> ServiceResult<Report> {
        let (report_type, owner_id) = command.validate()?;
        let now = self.clock.now();

        let report = Report::new(command.name, command.description, report_type, owner_id, now);
        self.repository.save(&report).await?;

        let created = DomainEvent::new(
            EventType::ReportCreated,
            report.id.as_str(),
            report.version,
            json!({ "name": report.name, "type": report_type, "ownerId": report.owner_id }),
            now,
        );
        publish_events(self.events.as_ref(), vec![created]).await;

        info!(report_id = %report.id, report_type = %report_type, "Report created");
        Ok(report)
    }

    pub async fn get(&self, id: &ReportId) -> ServiceResult<Report> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn list_by_owner(&self, owner_id: &UserId) -> ServiceResult<Vec<Report>> {
        Ok(self.repository.find_by_owner(owner_id).await?)
    }

    pub async fn list_by_status(&self, status: ReportStatus) -> ServiceResult<Vec<Report>> {
        Ok(self.repository.find_by_status(status).await?)
    }

    /// Reports whose scheduled run is at or before `before`
    pub async fn due_reports(&self, before: DateTime<Utc>) -> ServiceResult<Vec<Report>> {
        Ok(self.repository.find_scheduled(before).await?)
    }

    pub async fn set_template(&self, id: &ReportId, template: ReportTemplate) -> ServiceResult<Report> {
        self.execute(id, |r, now| {
            r.set_template(template, now);
            Ok(())
        })
        .await
    }

    pub async fn set_schedule(
        &self,
        id: &ReportId,
        schedule: Option<ReportSchedule>,
    ) -> ServiceResult<Report> {
        self.execute(id, |r, now| r.set_schedule(schedule, now)).await
    }

    pub async fn set_output_format(&self, id: &ReportId, format: OutputFormat) -> ServiceResult<Report> {
        self.execute(id, |r, now| {
            r.set_output_format(format, now);
            Ok(())
        })
        .await
    }

    pub async fn add_recipient(&self, id: &ReportId, email: impl Into<String>) -> ServiceResult<Report> {
        let email = email.into();
        self.execute(id, |r, now| r.add_recipient(email, now)).await
    }

    pub async fn remove_recipient(&self, id: &ReportId, email: &str) -> ServiceResult<Report> {
        self.execute(id, |r, now| r.remove_recipient(email, now)).await
    }

    pub async fn set_status(&self, id: &ReportId, status: ReportStatus) -> ServiceResult<Report> {
        self.execute(id, |r, now| {
            r.set_status(status, now);
            Ok(())
        })
        .await
    }

    pub async fn mark_generated(&self, id: &ReportId) -> ServiceResult<Report> {
        self.execute(id, |r, now| {
            r.mark_as_generated(now);
            Ok(())
        })
        .await
    }

    pub async fn delete(&self, id: &ReportId) -> ServiceResult<()> {
        self.repository.delete(id).await?;
        info!(report_id = %id, "Report deleted");
        Ok(())
    }

    /// Render a report and record the outcome
    ///
    /// The report passes through GENERATING. A generator failure leaves it in
    /// ERROR and is returned. On success the report is marked generated and,
    /// when a notifier is given and the report has recipients, delivered.
    /// Delivery failures are logged and do not fail the generation.
    pub async fn generate(
        &self,
        id: &ReportId,
        generator: &dyn ReportGenerator,
        data: &ReportData,
        notifier: Option<&dyn ReportNotifier>,
    ) -> ServiceResult<GeneratedReport> {
        let mut report = self
            .execute(id, |r, now| {
                r.set_status(ReportStatus::Generating, now);
                Ok(())
            })
            .await?;

        let content = match generator.generate(&report, data).await {
            Ok(content) => content,
            Err(e) => {
                error!(report_id = %id, error = %e, "Report generation failed");
                let loaded = report.version;
                report.set_status(ReportStatus::Error, self.clock.now());
                self.commit(&mut report, loaded).await?;
                return Err(e.into());
            }
        };

        let now = self.clock.now();
        let loaded = report.version;
        report.mark_as_generated(now);
        self.commit(&mut report, loaded).await?;

        let output = GeneratedReport {
            report_id: report.id.clone(),
            format: report.output_format,
            content,
            generated_at: now,
        };
        info!(
            report_id = %id,
            format = %output.format,
            bytes = output.content.len(),
            "Report generated"
        );

        if let Some(notifier) = notifier {
            if !report.recipients.is_empty() {
                if let Err(e) = notifier.notify(&report, &output, &report.recipients).await {
                    warn!(report_id = %id, error = %e, "Report delivery failed");
                }
            }
        }

        Ok(output)
    }

    async fn execute<F>(&self, id: &ReportId, mutation: F) -> ServiceResult<Report>
    where
        F: FnOnce(&mut Report, DateTime<Utc>) -> DomainResult<()> + Send,
    {
        let mut report = self.repository.find_by_id(id).await?;
        let loaded = report.version;

        mutation(&mut report, self.clock.now())?;
        self.commit(&mut report, loaded).await?;
        Ok(report)
    }

    async fn commit(&self, report: &mut Report, loaded: u64) -> ServiceResult<()> {
        if report.version == loaded {
            return Ok(());
        }
        self.repository.update(report, loaded).await?;
        publish_events(self.events.as_ref(), report.take_pending_events()).await;
        Ok(())
    }
}
