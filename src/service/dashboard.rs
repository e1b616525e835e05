// Copyright (c) 2025 - Cowboy AI, Inc.
//! Dashboard commands and queries

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::{publish_events, Clock, ServiceResult};
use crate::aggregate::CreateDashboardCommand;
use crate::domain::{Dashboard, DashboardId, DashboardLayout, DomainResult, UserId, Widget, WidgetId};
use crate::event_bus::EventBus;
use crate::events::{DomainEvent, EventType};
use crate::repository::DashboardRepository;

pub struct DashboardService {
    repository: Arc<dyn DashboardRepository>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn Clock>,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn DashboardRepository>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            events,
            clock,
        }
    }

    pub async fn create(&self, command: CreateDashboardCommand) -> ServiceResult<Dashboard> {
        let owner_id = command.validate()?;
        let now = self.clock.now();

        let dashboard = Dashboard::new(command.name, command.description, owner_id, now);
        self.repository.save(&dashboard).await?;

        let created = DomainEvent::new(
            EventType::DashboardCreated,
            dashboard.id.as_str(),
            dashboard.version,
            json!({ "name": dashboard.name, "ownerId": dashboard.owner_id }),
            now,
        );
        publish_events(self.events.as_ref(), vec![created]).await;

        info!(dashboard_id = %dashboard.id, owner_id = %dashboard.owner_id, "Dashboard created");
        Ok(dashboard)
    }

    pub async fn get(&self, id: &DashboardId) -> ServiceResult<Dashboard> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn list_by_owner(&self, owner_id: &UserId) -> ServiceResult<Vec<Dashboard>> {
        Ok(self.repository.find_by_owner(owner_id).await?)
    }

    pub async fn list_public(&self) -> ServiceResult<Vec<Dashboard>> {
        Ok(self.repository.find_public().await?)
    }

    pub async fn add_widget(&self, id: &DashboardId, widget: Widget) -> ServiceResult<Dashboard> {
        self.execute(id, |d, now| d.add_widget(widget, now)).await
    }

    pub async fn update_widget(&self, id: &DashboardId, widget: Widget) -> ServiceResult<Dashboard> {
        self.execute(id, |d, now| d.update_widget(widget, now)).await
    }

    pub async fn remove_widget(&self, id: &DashboardId, widget_id: &WidgetId) -> ServiceResult<Dashboard> {
        self.execute(id, |d, now| d.remove_widget(widget_id, now)).await
    }

    pub async fn update_layout(
        &self,
        id: &DashboardId,
        layout: DashboardLayout,
    ) -> ServiceResult<Dashboard> {
        self.execute(id, |d, now| d.update_layout(layout, now)).await
    }

    pub async fn set_public(&self, id: &DashboardId, is_public: bool) -> ServiceResult<Dashboard> {
        self.execute(id, |d, now| {
            d.set_public(is_public, now);
            Ok(())
        })
        .await
    }

    pub async fn set_refresh_interval(&self, id: &DashboardId, seconds: u32) -> ServiceResult<Dashboard> {
        self.execute(id, |d, now| d.set_refresh_interval(seconds, now)).await
    }

    pub async fn delete(&self, id: &DashboardId) -> ServiceResult<()> {
        self.repository.delete(id).await?;
        info!(dashboard_id = %id, "Dashboard deleted");
        Ok(())
    }

    /// Load, mutate, write back against the loaded version, publish
    async fn execute<F>(&self, id: &DashboardId, mutation: F) -> ServiceResult<Dashboard>
    where
        F: FnOnce(&mut Dashboard, DateTime<Utc>) -> DomainResult<()> + Send,
    {
        let mut dashboard = self.repository.find_by_id(id).await?;
        let loaded = dashboard.version;

        mutation(&mut dashboard, self.clock.now())?;
        if dashboard.version == loaded {
            return Ok(dashboard);
        }

        self.repository.update(&dashboard, loaded).await?;
        publish_events(self.events.as_ref(), dashboard.take_pending_events()).await;
        Ok(dashboard)
    }
}
