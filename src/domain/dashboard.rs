// Copyright (c) 2025 - Cowboy AI, Inc.
//! Dashboard Aggregate
//!
//! A dashboard owns a grid layout and an ordered set of widgets placed on it.
//!
//! # Invariants
//! - Every widget added or updated lies inside `layout.columns × layout.rows`
//! - Widget ids are unique within the dashboard
//! - Refresh interval stays within `[30, 3600]` seconds
//! - Each successful mutation bumps `version` by one and raises one event
//!
//! Failed mutations change nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::ids::{DashboardId, UserId, WidgetId};
use super::invariants::{
    validate_layout, validate_refresh_interval, validate_widget_bounds, DomainError,
    DomainResult, ErrorCode,
};
use crate::events::{DomainEvent, EventType};

/// Refresh cadence of a freshly created dashboard, in seconds
pub const DEFAULT_REFRESH_INTERVAL_SECS: u32 = 300;

/// Grid the widgets are placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLayout {
    pub columns: i32,
    pub rows: i32,
    pub grid_size: i32,
    pub responsive: bool,
}

impl Default for DashboardLayout {
    fn default() -> Self {
        Self {
            columns: 4,
            rows: 3,
            grid_size: 12,
            responsive: true,
        }
    }
}

/// Top-left cell of a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WidgetPosition {
    pub x: i32,
    pub y: i32,
}

/// Widget extent in grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSize {
    pub width: i32,
    pub height: i32,
}

impl Default for WidgetSize {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WidgetType {
    Chart,
    Table,
    Kpi,
    Gauge,
    Heatmap,
    Map,
    Text,
    Image,
}

impl WidgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Chart => "CHART",
            WidgetType::Table => "TABLE",
            WidgetType::Kpi => "KPI",
            WidgetType::Gauge => "GAUGE",
            WidgetType::Heatmap => "HEATMAP",
            WidgetType::Map => "MAP",
            WidgetType::Text => "TEXT",
            WidgetType::Image => "IMAGE",
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CHART" => Ok(WidgetType::Chart),
            "TABLE" => Ok(WidgetType::Table),
            "KPI" => Ok(WidgetType::Kpi),
            "GAUGE" => Ok(WidgetType::Gauge),
            "HEATMAP" => Ok(WidgetType::Heatmap),
            "MAP" => Ok(WidgetType::Map),
            "TEXT" => Ok(WidgetType::Text),
            "IMAGE" => Ok(WidgetType::Image),
            other => Err(DomainError::validation(
                ErrorCode::InvalidType,
                format!("unknown widget type: {other}"),
            )),
        }
    }
}

/// Where a widget (or metric) pulls its data from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub endpoint: String,
    pub query: String,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
}

impl DataSource {
    pub fn new(
        source_type: impl Into<String>,
        endpoint: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            source_type: source_type.into(),
            endpoint: endpoint.into(),
            query: query.into(),
            parameters: HashMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// A visual element owned by exactly one dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: WidgetId,
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub title: String,
    pub position: WidgetPosition,
    pub size: WidgetSize,
    #[serde(default)]
    pub configuration: HashMap<String, Value>,
    #[serde(default)]
    pub data_source: DataSource,
    pub refresh_interval: u32,
}

impl Widget {
    pub fn new(
        widget_type: WidgetType,
        title: impl Into<String>,
        position: WidgetPosition,
        size: WidgetSize,
    ) -> Self {
        Self {
            id: WidgetId::new(),
            widget_type,
            title: title.into(),
            position,
            size,
            configuration: HashMap::new(),
            data_source: DataSource::default(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }

    pub fn with_id(mut self, id: impl Into<WidgetId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_data_source(mut self, data_source: DataSource) -> Self {
        self.data_source = data_source;
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.configuration.insert(key.into(), value.into());
        self
    }
}

/// Dashboard aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: DashboardId,
    pub name: String,
    pub description: String,
    pub layout: DashboardLayout,
    pub widgets: Vec<Widget>,
    #[serde(default)]
    pub filters: HashMap<String, Value>,
    pub refresh_interval: u32,
    pub is_public: bool,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,

    /// Raised since the last drain, never persisted
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Dashboard {
    /// New dashboard on the default 4×3 grid, refreshing every 300s
    ///
    /// Construction raises no event; the version starts at 1.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        owner_id: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self::with_id(DashboardId::new(), name, description, owner_id, now)
    }

    pub fn with_id(
        id: DashboardId,
        name: impl Into<String>,
        description: impl Into<String>,
        owner_id: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            layout: DashboardLayout::default(),
            widgets: Vec::new(),
            filters: HashMap::new(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL_SECS,
            is_public: false,
            owner_id,
            created_at: now,
            updated_at: now,
            version: 1,
            events: Vec::new(),
        }
    }

    pub fn widget(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| &w.id == id)
    }

    /// Place a widget on the grid
    ///
    /// # Errors
    /// - `INVALID_WIDGET_POSITION` when the widget leaves the grid
    /// - `DUPLICATE_WIDGET` when the id is already on this dashboard
    pub fn add_widget(&mut self, widget: Widget, now: DateTime<Utc>) -> DomainResult<()> {
        validate_widget_bounds(&self.layout, &widget.position, &widget.size)?;

        if self.widget(&widget.id).is_some() {
            return Err(DomainError::validation(
                ErrorCode::DuplicateWidget,
                format!("widget {} already exists", widget.id),
            ));
        }

        let data = json!({ "widgetId": widget.id, "type": widget.widget_type });
        self.widgets.push(widget);
        self.raise(EventType::WidgetAdded, data, now);
        Ok(())
    }

    /// Replace a widget in place, keeping its slot in the ordering
    pub fn update_widget(&mut self, widget: Widget, now: DateTime<Utc>) -> DomainResult<()> {
        let index = self
            .widgets
            .iter()
            .position(|w| w.id == widget.id)
            .ok_or_else(|| DomainError::not_found("widget", widget.id.as_str()))?;

        validate_widget_bounds(&self.layout, &widget.position, &widget.size)?;

        let data = json!({ "widgetId": widget.id, "type": widget.widget_type });
        self.widgets[index] = widget;
        self.raise(EventType::WidgetUpdated, data, now);
        Ok(())
    }

    pub fn remove_widget(&mut self, widget_id: &WidgetId, now: DateTime<Utc>) -> DomainResult<()> {
        let index = self
            .widgets
            .iter()
            .position(|w| &w.id == widget_id)
            .ok_or_else(|| DomainError::not_found("widget", widget_id.as_str()))?;

        self.widgets.remove(index);
        self.raise(EventType::WidgetRemoved, json!({ "widgetId": widget_id }), now);
        Ok(())
    }

    /// Swap the grid
    ///
    /// Existing widgets are not re-checked against the new grid and may end
    /// up outside it.
    pub fn update_layout(&mut self, layout: DashboardLayout, now: DateTime<Utc>) -> DomainResult<()> {
        validate_layout(&layout)?;

        self.layout = layout;
        self.raise(EventType::LayoutUpdated, json!({ "layout": layout }), now);
        Ok(())
    }

    pub fn set_public(&mut self, is_public: bool, now: DateTime<Utc>) {
        self.is_public = is_public;
        self.raise(EventType::VisibilityChanged, json!({ "isPublic": is_public }), now);
    }

    pub fn set_refresh_interval(&mut self, seconds: u32, now: DateTime<Utc>) -> DomainResult<()> {
        validate_refresh_interval(seconds)?;

        self.refresh_interval = seconds;
        self.raise(
            EventType::RefreshIntervalChanged,
            json!({ "refreshInterval": seconds }),
            now,
        );
        Ok(())
    }

    /// Widgets lying outside the current grid
    pub fn out_of_bounds_widgets(&self) -> Vec<&Widget> {
        self.widgets
            .iter()
            .filter(|w| validate_widget_bounds(&self.layout, &w.position, &w.size).is_err())
            .collect()
    }

    pub fn pending_events(&self) -> &[DomainEvent] {
        &self.events
    }

    /// Drain the events raised since the last call
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
