// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod jobs;
pub mod metrics;
pub mod render;

use std::sync::Arc;

use axum::Router;

pub use crate::api::{create_router, AppState};
pub use crate::jobs::aggregate::Aggregator;

/// Production wiring: config from disk/env, every adapter, shared aggregator.
/// Returns the aggregator too so the caller can schedule the first pass.
pub fn build_app() -> anyhow::Result<(Router, Arc<Aggregator>)> {
    let feed = config::load_feed_config_default()?;
    let ai = config::AiSearchConfig::from_env();
    tracing::info!(
        greenhouse = feed.greenhouse.companies.len(),
        lever = feed.lever.companies.len(),
        ai_search = ai.has_key(),
        "feed config loaded"
    );
    let adapters = jobs::providers::default_adapters(&feed, &ai)?;
    let aggregator = Arc::new(Aggregator::new(adapters, feed.http.adapter_deadline()));
    let router = create_router(AppState {
        aggregator: aggregator.clone(),
    });
    Ok((router, aggregator))
}

/// Router only; no pass is started.
pub fn app() -> anyhow::Result<Router> {
    build_app().map(|(router, _)| router)
}
