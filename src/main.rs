//! Remote design-job feed: binary entrypoint.
//! Boots the Axum server, wires `/metrics`, and starts the first aggregation pass.

use design_jobs_feed::{build_app, metrics::Metrics};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON with `LOG_FORMAT=json`.
/// `try_init` leaves an already-installed subscriber (the runtime's) alone.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("design_jobs_feed=info,warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let (router, aggregator) = build_app()?;

    let router = match Metrics::init(aggregator.deadline().as_millis() as u64) {
        Ok(m) => router.merge(m.router()),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            router
        }
    };

    // First pass in the background; the page shows progress as adapters land.
    aggregator.spawn_refresh();

    Ok(router.into())
}
