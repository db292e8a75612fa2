//! Wiring from configuration to runtime components

use anyhow::{Context, Result};
use crosswalk_config::{CrosswalkConfig, RoutingConfig};
use crosswalk_core::{EntityRegistry, HttpDispatcher, Router, SourceSystem};
use crosswalk_pipeline::EventPipeline;
use crosswalk_sqlite::{SqliteConfig, SqliteCorrelationStore, SqlitePool};
use std::sync::Arc;
use tracing::debug;

/// Built-in bindings plus any configured path overrides.
pub fn build_registry(routing: &RoutingConfig) -> EntityRegistry {
    routing
        .entities
        .iter()
        .fold(EntityRegistry::with_defaults(), |registry, route| {
            registry.with_resource_path(&route.name, route.path.as_str())
        })
}

pub fn build_router(config: &CrosswalkConfig) -> Result<Router> {
    let authoritative: SourceSystem = config
        .routing
        .authoritative_source
        .parse()
        .context("Invalid routing.authoritative_source")?;

    let registry = build_registry(&config.routing);
    debug!(entities = ?registry.entity_names(), "Entity registry built");

    Ok(
        Router::new(Arc::new(registry), config.destination.base_url.as_str())
            .with_authoritative_source(authoritative),
    )
}

/// Open (and migrate) the correlation database.
pub fn open_store(config: &CrosswalkConfig) -> Result<SqliteCorrelationStore> {
    let path = &config.storage.database_path;
    let pool = SqlitePool::new(
        SqliteConfig::new(path).with_busy_timeout(config.storage.busy_timeout_ms),
    )
    .with_context(|| format!("Failed to open correlation database at {}", path.display()))?;
    Ok(SqliteCorrelationStore::new(pool))
}

/// Full pipeline: router, HTTP dispatcher and SQLite store.
pub fn build_pipeline(config: &CrosswalkConfig) -> Result<EventPipeline> {
    let router = build_router(config)?;
    let dispatcher = HttpDispatcher::default().with_timeout(config.destination.timeout());
    let store = open_store(config)?;

    Ok(EventPipeline::new(
        Arc::new(router),
        Arc::new(dispatcher),
        Arc::new(store),
    ))
}
