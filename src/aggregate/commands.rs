// Copyright (c) 2025 - Cowboy AI, Inc.
//! Creation commands
//!
//! Commands carry caller input as received (wire strings included) and are
//! checked by `validate()` before any aggregate is built. Validation returns
//! the parsed closed types so callers never parse twice.
//!
//! # Rules
//!
//! - name: required, at most 255 characters (`INVALID_NAME`)
//! - description: at most 1000 characters (`INVALID_DESCRIPTION`)
//! - owner: required (`INVALID_OWNER`)
//! - type / category: a known wire value (`INVALID_TYPE` / `INVALID_CATEGORY`)
//! - unit: at most 50 characters (`INVALID_UNIT`)

use serde::{Deserialize, Serialize};

use crate::domain::invariants::{validate_description, validate_name, validate_owner, validate_unit};
use crate::domain::{DomainResult, MetricCategory, MetricType, ReportType, UserId};

/// Command to create a dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDashboardCommand {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner_id: String,
}

impl CreateDashboardCommand {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            owner_id: owner_id.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<UserId> {
        validate_name("dashboard", &self.name)?;
        validate_description("dashboard", &self.description)?;
        validate_owner(&self.owner_id)?;
        Ok(UserId::from(self.owner_id.as_str()))
    }
}

/// Command to create a metric
///
/// A non-empty `unit` is applied right after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMetricCommand {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub metric_type: String,
    pub category: String,
    #[serde(default)]
    pub unit: String,
}

impl CreateMetricCommand {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        metric_type: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            metric_type: metric_type.into(),
            category: category.into(),
            unit: String::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn validate(&self) -> DomainResult<(MetricType, MetricCategory)> {
        validate_name("metric", &self.name)?;
        validate_description("metric", &self.description)?;
        let metric_type = self.metric_type.parse::<MetricType>()?;
        let category = self.category.parse::<MetricCategory>()?;
        validate_unit(&self.unit)?;
        Ok((metric_type, category))
    }
}

/// Command to create a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportCommand {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub report_type: String,
    pub owner_id: String,
}

impl CreateReportCommand {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        report_type: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            report_type: report_type.into(),
            owner_id: owner_id.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<(ReportType, UserId)> {
        validate_name("report", &self.name)?;
        validate_description("report", &self.description)?;
        let report_type = self.report_type.parse::<ReportType>()?;
        validate_owner(&self.owner_id)?;
        Ok((report_type, UserId::from(self.owner_id.as_str())))
    }
}
