// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Domain Invariants
//!
//! Business rules shared by the aggregates and the create commands. Every
//! function here is pure: it inspects its arguments and returns either `Ok(())`
//! or a validation error carrying a stable machine-readable code.
//!
//! # Error Classes
//!
//! - **Validation**: caller-correctable, identified by an [`ErrorCode`]
//! - **Not found**: a single sentinel, kept apart so transport layers can map it
//!   to their own "missing" status
//!
//! Infrastructure failures never appear here; they live in
//! [`crate::errors::InfrastructureError`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::dashboard::{DashboardLayout, WidgetPosition, WidgetSize};
use super::metric::MetricCalculation;
use super::report::{ReportSchedule, ScheduleType};

/// Result of a domain operation
pub type DomainResult<T> = Result<T, DomainError>;

/// Stable codes for validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidWidgetPosition,
    DuplicateWidget,
    InvalidLayout,
    InvalidRefreshInterval,
    InvalidAggregation,
    InvalidDimension,
    DuplicateDimension,
    InvalidCalculation,
    InvalidFormula,
    InvalidCondition,
    InvalidHourlyInterval,
    InvalidDailySchedule,
    InvalidWeeklySchedule,
    InvalidOutputFormat,
    InvalidEmail,
    DuplicateRecipient,
    InvalidName,
    InvalidDescription,
    InvalidOwner,
    InvalidType,
    InvalidCategory,
    InvalidUnit,
    InvalidStatus,
    InvalidTimeRange,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidWidgetPosition => "INVALID_WIDGET_POSITION",
            ErrorCode::DuplicateWidget => "DUPLICATE_WIDGET",
            ErrorCode::InvalidLayout => "INVALID_LAYOUT",
            ErrorCode::InvalidRefreshInterval => "INVALID_REFRESH_INTERVAL",
            ErrorCode::InvalidAggregation => "INVALID_AGGREGATION",
            ErrorCode::InvalidDimension => "INVALID_DIMENSION",
            ErrorCode::DuplicateDimension => "DUPLICATE_DIMENSION",
            ErrorCode::InvalidCalculation => "INVALID_CALCULATION",
            ErrorCode::InvalidFormula => "INVALID_FORMULA",
            ErrorCode::InvalidCondition => "INVALID_CONDITION",
            ErrorCode::InvalidHourlyInterval => "INVALID_HOURLY_INTERVAL",
            ErrorCode::InvalidDailySchedule => "INVALID_DAILY_SCHEDULE",
            ErrorCode::InvalidWeeklySchedule => "INVALID_WEEKLY_SCHEDULE",
            ErrorCode::InvalidOutputFormat => "INVALID_OUTPUT_FORMAT",
            ErrorCode::InvalidEmail => "INVALID_EMAIL",
            ErrorCode::DuplicateRecipient => "DUPLICATE_RECIPIENT",
            ErrorCode::InvalidName => "INVALID_NAME",
            ErrorCode::InvalidDescription => "INVALID_DESCRIPTION",
            ErrorCode::InvalidOwner => "INVALID_OWNER",
            ErrorCode::InvalidType => "INVALID_TYPE",
            ErrorCode::InvalidCategory => "INVALID_CATEGORY",
            ErrorCode::InvalidUnit => "INVALID_UNIT",
            ErrorCode::InvalidStatus => "INVALID_STATUS",
            ErrorCode::InvalidTimeRange => "INVALID_TIME_RANGE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain error raised by aggregates, value objects and commands
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Input violated a business rule
    #[error("{code}: {message}")]
    Validation { code: ErrorCode, message: String },

    /// The addressed entity does not exist
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
}

impl DomainError {
    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        DomainError::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        DomainError::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Validation code, `None` for not-found
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            DomainError::Validation { code, .. } => Some(*code),
            DomainError::NotFound { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }
}

/// Refresh cadence accepted by dashboards, in seconds
pub const MIN_REFRESH_INTERVAL_SECS: u32 = 30;
pub const MAX_REFRESH_INTERVAL_SECS: u32 = 3600;

/// Shortest accepted calculation formula
pub const MIN_FORMULA_LEN: usize = 3;

/// Recipient addresses must be strictly shorter than this
pub const MAX_EMAIL_LEN: usize = 255;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_UNIT_LEN: usize = 50;

/// Widget must sit fully inside the `columns × rows` grid
///
/// # Rules
/// - `x ≥ 0` and `y ≥ 0`
/// - `x + width ≤ columns`
/// - `y + height ≤ rows`
pub fn validate_widget_bounds(
    layout: &DashboardLayout,
    position: &WidgetPosition,
    size: &WidgetSize,
) -> DomainResult<()> {
    let right = i64::from(position.x) + i64::from(size.width);
    let bottom = i64::from(position.y) + i64::from(size.height);

    if position.x < 0
        || position.y < 0
        || right > i64::from(layout.columns)
        || bottom > i64::from(layout.rows)
    {
        return Err(DomainError::validation(
            ErrorCode::InvalidWidgetPosition,
            format!(
                "widget at ({}, {}) sized {}x{} lies outside the {}x{} grid",
                position.x, position.y, size.width, size.height, layout.columns, layout.rows
            ),
        ));
    }
    Ok(())
}

pub fn validate_layout(layout: &DashboardLayout) -> DomainResult<()> {
    if layout.columns <= 0 || layout.rows <= 0 {
        return Err(DomainError::validation(
            ErrorCode::InvalidLayout,
            "layout dimensions must be positive",
        ));
    }
    Ok(())
}

/// Inclusive bounds: 30 and 3600 are both accepted
pub fn validate_refresh_interval(seconds: u32) -> DomainResult<()> {
    if !(MIN_REFRESH_INTERVAL_SECS..=MAX_REFRESH_INTERVAL_SECS).contains(&seconds) {
        return Err(DomainError::validation(
            ErrorCode::InvalidRefreshInterval,
            format!(
                "refresh interval must be between {} and {} seconds, got {}",
                MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS, seconds
            ),
        ));
    }
    Ok(())
}

/// Calculation formula and conditions
///
/// # Rules
/// - Formula must not be empty (`INVALID_CALCULATION`)
/// - Formula must be at least three characters (`INVALID_FORMULA`)
/// - Every condition needs a field and an operator (`INVALID_CONDITION`)
pub fn validate_calculation(calculation: &MetricCalculation) -> DomainResult<()> {
    if calculation.formula.is_empty() {
        return Err(DomainError::validation(
            ErrorCode::InvalidCalculation,
            "calculation formula cannot be empty",
        ));
    }

    if calculation.formula.chars().count() < MIN_FORMULA_LEN {
        return Err(DomainError::validation(
            ErrorCode::InvalidFormula,
            "formula is too short",
        ));
    }

    for condition in &calculation.conditions {
        if condition.field.is_empty() || condition.operator.is_none() {
            return Err(DomainError::validation(
                ErrorCode::InvalidCondition,
                "condition must have field and operator",
            ));
        }
    }

    Ok(())
}

/// Per-type schedule requirements
///
/// # Rules
/// - HOURLY: interval within `[1, 24]`
/// - DAILY: a time of day
/// - WEEKLY: at least one day
/// - ONCE, MONTHLY: no extra requirement
pub fn validate_schedule(schedule: &ReportSchedule) -> DomainResult<()> {
    match schedule.schedule_type {
        ScheduleType::Hourly => {
            if !(1..=24).contains(&schedule.interval) {
                return Err(DomainError::validation(
                    ErrorCode::InvalidHourlyInterval,
                    "hourly interval must be between 1 and 24 hours",
                ));
            }
        }
        ScheduleType::Daily => {
            if schedule.time.is_none() {
                return Err(DomainError::validation(
                    ErrorCode::InvalidDailySchedule,
                    "daily schedule must have a time",
                ));
            }
        }
        ScheduleType::Weekly => {
            if schedule.days.is_empty() {
                return Err(DomainError::validation(
                    ErrorCode::InvalidWeeklySchedule,
                    "weekly schedule must have at least one day",
                ));
            }
        }
        ScheduleType::Once | ScheduleType::Monthly => {}
    }
    Ok(())
}

/// Length-only check, no structural address validation
pub fn validate_email(email: &str) -> DomainResult<()> {
    if email.is_empty() || email.len() >= MAX_EMAIL_LEN {
        return Err(DomainError::validation(
            ErrorCode::InvalidEmail,
            "invalid email address",
        ));
    }
    Ok(())
}

pub fn validate_name(subject: &str, name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation(
            ErrorCode::InvalidName,
            format!("{subject} name is required"),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(
            ErrorCode::InvalidName,
            format!("{subject} name must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_description(subject: &str, description: &str) -> DomainResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DomainError::validation(
            ErrorCode::InvalidDescription,
            format!("{subject} description must be at most {MAX_DESCRIPTION_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_owner(owner: &str) -> DomainResult<()> {
    if owner.trim().is_empty() {
        return Err(DomainError::validation(
            ErrorCode::InvalidOwner,
            "owner id is required",
        ));
    }
    Ok(())
}

pub fn validate_unit(unit: &str) -> DomainResult<()> {
    if unit.chars().count() > MAX_UNIT_LEN {
        return Err(DomainError::validation(
            ErrorCode::InvalidUnit,
            format!("unit must be at most {MAX_UNIT_LEN} characters"),
        ));
    }
    Ok(())
}
