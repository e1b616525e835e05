// Copyright (c) 2025 - Cowboy AI, Inc.
//! Report Aggregate
//!
//! A report is a template rendered on a schedule in one output format and
//! sent to a list of recipients.
//!
//! # Next-run rule
//!
//! | schedule | `next_run_at` after set / generate |
//! |----------|------------------------------------|
//! | HOURLY   | now + interval hours               |
//! | DAILY    | now + 24 hours                     |
//! | WEEKLY   | now + 7 days                       |
//! | ONCE     | cleared                            |
//! | MONTHLY  | cleared                            |
//!
//! The DAILY time of day and WEEKLY day list are stored but do not feed the
//! computation. Removing the schedule leaves `next_run_at` as it was.

use chrono::{DateTime, Duration, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::ids::{ReportId, UserId};
use super::invariants::{validate_email, validate_schedule, DomainError, DomainResult, ErrorCode};
use crate::events::{DomainEvent, EventType};

wire_enum! {
    ReportType, ErrorCode::InvalidType, "report type" {
        Performance => "PERFORMANCE",
        Compliance => "COMPLIANCE",
        Business => "BUSINESS",
        Custom => "CUSTOM",
    }
}

wire_enum! {
    /// Rendering target handed to the report generator
    OutputFormat, ErrorCode::InvalidOutputFormat, "output format" {
        Pdf => "PDF",
        Excel => "EXCEL",
        Csv => "CSV",
        Json => "JSON",
        Html => "HTML",
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Pdf
    }
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            OutputFormat::Csv => "text/csv",
            OutputFormat::Json => "application/json",
            OutputFormat::Html => "text/html",
        }
    }
}

wire_enum! {
    ReportStatus, ErrorCode::InvalidStatus, "report status" {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
        Generating => "GENERATING",
        Error => "ERROR",
    }
}

wire_enum! {
    ScheduleType, ErrorCode::InvalidType, "schedule type" {
        Once => "ONCE",
        Hourly => "HOURLY",
        Daily => "DAILY",
        Weekly => "WEEKLY",
        Monthly => "MONTHLY",
    }
}

/// When a report should be generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSchedule {
    #[serde(rename = "type")]
    pub schedule_type: ScheduleType,
    /// Hours between runs, HOURLY only
    #[serde(default)]
    pub interval: u32,
    #[serde(default)]
    pub days: Vec<Weekday>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl ReportSchedule {
    pub fn new(schedule_type: ScheduleType) -> Self {
        Self {
            schedule_type,
            interval: 0,
            days: Vec::new(),
            time: None,
            timezone: default_timezone(),
        }
    }

    pub fn hourly(interval: u32) -> Self {
        Self {
            interval,
            ..Self::new(ScheduleType::Hourly)
        }
    }

    pub fn daily(time: NaiveTime) -> Self {
        Self {
            time: Some(time),
            ..Self::new(ScheduleType::Daily)
        }
    }

    pub fn weekly(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            days: days.into_iter().collect(),
            ..Self::new(ScheduleType::Weekly)
        }
    }

    /// Next run relative to `now`, `None` when the schedule has no rule
    pub fn next_run_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.schedule_type {
            ScheduleType::Hourly => Some(now + Duration::hours(i64::from(self.interval))),
            ScheduleType::Daily => Some(now + Duration::hours(24)),
            ScheduleType::Weekly => Some(now + Duration::days(7)),
            ScheduleType::Once | ScheduleType::Monthly => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportMargins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLayout {
    /// `portrait` or `landscape`
    pub orientation: String,
    pub page_size: String,
    #[serde(default)]
    pub margins: ReportMargins,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            orientation: "portrait".to_string(),
            page_size: "A4".to_string(),
            margins: ReportMargins::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub id: String,
    /// `text`, `chart`, `table` or `image`
    #[serde(rename = "type")]
    pub section_type: String,
    pub title: String,
    #[serde(default)]
    pub content: HashMap<String, Value>,
    pub order: i32,
    pub visible: bool,
}

impl ReportSection {
    pub fn new(id: impl Into<String>, section_type: impl Into<String>, title: impl Into<String>, order: i32) -> Self {
        Self {
            id: id.into(),
            section_type: section_type.into(),
            title: title.into(),
            content: HashMap::new(),
            order,
            visible: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub layout: ReportLayout,
    #[serde(default)]
    pub sections: Vec<ReportSection>,
    #[serde(default)]
    pub styles: HashMap<String, Value>,
}

impl ReportTemplate {
    /// Visible sections in render order
    pub fn visible_sections(&self) -> Vec<&ReportSection> {
        let mut sections: Vec<&ReportSection> =
            self.sections.iter().filter(|s| s.visible).collect();
        sections.sort_by_key(|s| s.order);
        sections
    }
}

/// Report aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    #[serde(default)]
    pub template: ReportTemplate,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ReportSchedule>,
    pub output_format: OutputFormat,
    pub recipients: Vec<String>,
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_generated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<DateTime<Utc>>,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,

    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Report {
    /// New ACTIVE report rendering to PDF, unscheduled and without recipients
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        report_type: ReportType,
        owner_id: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self::with_id(ReportId::new(), name, description, report_type, owner_id, now)
    }

    pub fn with_id(
        id: ReportId,
        name: impl Into<String>,
        description: impl Into<String>,
        report_type: ReportType,
        owner_id: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            report_type,
            template: ReportTemplate::default(),
            parameters: HashMap::new(),
            schedule: None,
            output_format: OutputFormat::default(),
            recipients: Vec::new(),
            status: ReportStatus::Active,
            last_generated_at: None,
            next_run_at: None,
            owner_id,
            created_at: now,
            updated_at: now,
            version: 1,
            events: Vec::new(),
        }
    }

    pub fn set_template(&mut self, template: ReportTemplate, now: DateTime<Utc>) {
        let data = json!({ "templateId": template.id });
        self.template = template;
        self.raise(EventType::TemplateUpdated, data, now);
    }

    /// Install or clear the schedule
    ///
    /// A new schedule is validated and `next_run_at` recomputed from `now`.
    /// Clearing (`None`) keeps the previous `next_run_at`.
    pub fn set_schedule(
        &mut self,
        schedule: Option<ReportSchedule>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if let Some(schedule) = &schedule {
            validate_schedule(schedule)?;
            self.next_run_at = schedule.next_run_after(now);
        }

        let data = json!({ "schedule": schedule });
        self.schedule = schedule;
        self.raise(EventType::ScheduleUpdated, data, now);
        Ok(())
    }

    pub fn set_output_format(&mut self, format: OutputFormat, now: DateTime<Utc>) {
        self.output_format = format;
        self.raise(
            EventType::OutputFormatChanged,
            json!({ "outputFormat": format }),
            now,
        );
    }

    /// Append a recipient; addresses are only length-checked
    pub fn add_recipient(&mut self, email: impl Into<String>, now: DateTime<Utc>) -> DomainResult<()> {
        let email = email.into();
        validate_email(&email)?;

        if self.recipients.contains(&email) {
            return Err(DomainError::validation(
                ErrorCode::DuplicateRecipient,
                format!("recipient {email} already exists"),
            ));
        }

        let data = json!({ "email": email });
        self.recipients.push(email);
        self.raise(EventType::RecipientAdded, data, now);
        Ok(())
    }

    pub fn remove_recipient(&mut self, email: &str, now: DateTime<Utc>) -> DomainResult<()> {
        let index = self
            .recipients
            .iter()
            .position(|r| r == email)
            .ok_or_else(|| DomainError::not_found("recipient", email))?;

        self.recipients.remove(index);
        self.raise(EventType::RecipientRemoved, json!({ "email": email }), now);
        Ok(())
    }

    /// Unconditional status change
    pub fn set_status(&mut self, status: ReportStatus, now: DateTime<Utc>) {
        self.status = status;
        self.raise(EventType::StatusChanged, json!({ "status": status }), now);
    }

    /// Record a successful generation at `now`
    pub fn mark_as_generated(&mut self, now: DateTime<Utc>) {
        self.last_generated_at = Some(now);
        self.status = ReportStatus::Active;
        if let Some(schedule) = &self.schedule {
            self.next_run_at = schedule.next_run_after(now);
        }
        self.raise(EventType::ReportGenerated, json!({ "generatedAt": now }), now);
    }

    /// ACTIVE, scheduled and past its next run
    pub fn is_due(&self, at: DateTime<Utc>) -> bool {
        self.status == ReportStatus::Active
            && self.schedule.is_some()
            && self.next_run_at.is_some_and(|next| next <= at)
    }

    pub fn pending_events(&self) -> &[DomainEvent] {
        &self.events
    }

    pub fn take_pending_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn raise(&mut self, event_type: EventType, data: Value, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
        self.events.push(DomainEvent::new(
            event_type,
            self.id.as_str(),
            self.version,
            data,
            now,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 19, 12, 0, 0).unwrap()
    }

    fn report() -> Report {
        Report::new(
            "Weekly KPIs",
            "Headline numbers",
            ReportType::Business,
            UserId::from("user-1"),
            now(),
        )
    }

    #[test]
    fn test_new_report_defaults() {
        let report = report();

        assert_eq!(report.status, ReportStatus::Active);
        assert_eq!(report.output_format, OutputFormat::Pdf);
        assert!(report.recipients.is_empty());
        assert!(report.schedule.is_none());
        assert_eq!(report.version, 1);
        assert!(report.pending_events().is_empty());
    }

    #[test]
    fn test_hourly_schedule_sets_next_run() {
        let mut report = report();
        report.set_schedule(Some(ReportSchedule::hourly(6)), now()).unwrap();

        assert_eq!(report.next_run_at, Some(now() + Duration::hours(6)));
        assert_eq!(report.version, 2);
        assert_eq!(
            report.pending_events()[0].event_type,
            EventType::ScheduleUpdated
        );
    }

    #[test]
    fn test_daily_and_weekly_ignore_stored_fields() {
        let mut report = report();

        let seven_am = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        report.set_schedule(Some(ReportSchedule::daily(seven_am)), now()).unwrap();
        assert_eq!(report.next_run_at, Some(now() + Duration::hours(24)));

        report
            .set_schedule(Some(ReportSchedule::weekly([Weekday::Fri])), now())
            .unwrap();
        assert_eq!(report.next_run_at, Some(now() + Duration::days(7)));
    }

    #[test]
    fn test_once_and_monthly_clear_next_run() {
        let mut report = report();
        report.set_schedule(Some(ReportSchedule::hourly(1)), now()).unwrap();

        report
            .set_schedule(Some(ReportSchedule::new(ScheduleType::Monthly)), now())
            .unwrap();
        assert_eq!(report.next_run_at, None);
        assert!(!report.is_due(now() + Duration::days(365)));
    }

    #[test]
    fn test_clearing_schedule_keeps_stale_next_run() {
        let mut report = report();
        report.set_schedule(Some(ReportSchedule::hourly(2)), now()).unwrap();

        report.set_schedule(None, now()).unwrap();

        assert!(report.schedule.is_none());
        assert_eq!(report.next_run_at, Some(now() + Duration::hours(2)));
        assert!(!report.is_due(now() + Duration::hours(3)));
        assert_eq!(report.version, 3);
    }

    #[test]
    fn test_invalid_schedule_changes_nothing() {
        let mut report = report();
        let before = report.clone();

        let err = report
            .set_schedule(Some(ReportSchedule::hourly(25)), now())
            .unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::InvalidHourlyInterval));
        assert_eq!(report, before);
    }

    #[test]
    fn test_mark_generated_recomputes_from_call_time() {
        let mut report = report();
        report.set_schedule(Some(ReportSchedule::hourly(6)), now()).unwrap();

        let first = now() + Duration::minutes(10);
        report.mark_as_generated(first);
        assert_eq!(report.next_run_at, Some(first + Duration::hours(6)));

        let second = now() + Duration::hours(9);
        report.mark_as_generated(second);
        assert_eq!(report.next_run_at, Some(second + Duration::hours(6)));
        assert_eq!(report.last_generated_at, Some(second));
    }

    #[test]
    fn test_mark_generated_resets_status() {
        let mut report = report();
        report.set_status(ReportStatus::Generating, now());
        report.mark_as_generated(now());

        assert_eq!(report.status, ReportStatus::Active);
        assert_eq!(report.next_run_at, None);
        let event = report.pending_events().last().unwrap();
        assert_eq!(event.event_type, EventType::ReportGenerated);
        assert_eq!(event.version, 3);
    }

    #[test]
    fn test_recipients_are_unique_and_ordered() {
        let mut report = report();
        report.add_recipient("b@x.com", now()).unwrap();
        report.add_recipient("a@x.com", now()).unwrap();

        let err = report.add_recipient("a@x.com", now()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::DuplicateRecipient));
        assert_eq!(report.recipients, vec!["b@x.com", "a@x.com"]);

        assert_eq!(
            report.add_recipient("", now()).unwrap_err().code(),
            Some(ErrorCode::InvalidEmail)
        );
    }

    #[test]
    fn test_remove_recipient() {
        let mut report = report();
        report.add_recipient("a@x.com", now()).unwrap();
        report.remove_recipient("a@x.com", now()).unwrap();
        assert!(report.recipients.is_empty());

        let before = report.clone();
        assert!(report.remove_recipient("a@x.com", now()).unwrap_err().is_not_found());
        assert_eq!(report, before);
    }

    #[test]
    fn test_output_format_and_template() {
        let mut report = report();
        report.set_output_format(OutputFormat::Csv, now());

        let template = ReportTemplate {
            id: "tpl-1".to_string(),
            name: "Standard".to_string(),
            sections: vec![
                ReportSection::new("s2", "table", "Detail", 2),
                ReportSection::new("s1", "chart", "Overview", 1),
            ],
            ..ReportTemplate::default()
        };
        report.set_template(template, now());

        let titles: Vec<&str> = report
            .template
            .visible_sections()
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Overview", "Detail"]);

        let events = report.pending_events();
        assert_eq!(events[0].field("outputFormat"), Some(&json!("CSV")));
        assert_eq!(events[1].field("templateId"), Some(&json!("tpl-1")));
        assert_eq!(
            "XML".parse::<OutputFormat>().unwrap_err().code(),
            Some(ErrorCode::InvalidOutputFormat)
        );
    }

    #[test]
    fn test_is_due() {
        let mut report = report();
        report.set_schedule(Some(ReportSchedule::hourly(1)), now()).unwrap();

        assert!(!report.is_due(now()));
        assert!(report.is_due(now() + Duration::hours(1)));

        report.set_status(ReportStatus::Inactive, now());
        assert!(!report.is_due(now() + Duration::hours(2)));
    }

    #[test]
    fn test_schedule_serialization() {
        let schedule = ReportSchedule::weekly([Weekday::Mon, Weekday::Thu]);
        let value = serde_json::to_value(&schedule).unwrap();

        assert_eq!(value["type"], "WEEKLY");
        assert_eq!(value["days"], json!(["Mon", "Thu"]));
        assert_eq!(value["timezone"], "UTC");
    }
}
