// Copyright (c) 2025 - Cowboy AI, Inc.
//! Analytics Event Monitor
//!
//! Subscribes to every analytics domain event on NATS and logs it.
//!
//! Run with: cargo run --bin analytics-events
//!
//! Environment:
//! - `NATS_URL` - comma-separated server list (default: nats://localhost:4222)
//! - `ANALYTICS_EVENTS_ENABLED` - set to `false` to exit immediately
//! - `RUST_LOG` - tracing filter

use analytics_dashboard::{
    event_bus::{EventBus, FnEventHandler, NatsEventBus},
    subjects::SubjectBuilder,
    AnalyticsConfig, NatsClient,
};
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting analytics event monitor");

    let config = AnalyticsConfig::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded:");
    info!("  - NATS servers: {}", config.nats.servers.join(","));
    info!("  - Events enabled: {}", config.events_enabled);
    info!("  - Retention: {} days", config.retention_days);

    if !config.events_enabled {
        info!("Domain events disabled, nothing to monitor");
        return Ok(());
    }

    let client = NatsClient::new(config.nats.clone())
        .await
        .context("Failed to connect to NATS")?;
    let bus = NatsEventBus::new(client);

    let received = Arc::new(AtomicU64::new(0));
    let counter = received.clone();
    let handler = FnEventHandler::new(move |event| {
        counter.fetch_add(1, Ordering::Relaxed);
        info!(
            event_type = %event.event_type,
            aggregate = %event.event_type.aggregate_kind(),
            aggregate_id = %event.aggregate_id,
            version = event.version,
            "Domain event"
        );
        Ok(())
    });

    bus.subscribe_all(Arc::new(handler))
        .await
        .context("Failed to subscribe to analytics events")?;
    info!("Listening on {}", SubjectBuilder::build_all());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    bus.shutdown().await;
    info!(
        received = received.load(Ordering::Relaxed),
        "Analytics event monitor stopped"
    );
    Ok(())
}
