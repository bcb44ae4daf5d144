// src/metrics.rs
//! Prometheus exposition for the feed: adapter fetches, merge outcomes and
//! refresh passes.

use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

fn describe_all() {
    describe_counter!("jobs_adapter_fetch_total", "Adapter fetches attempted.");
    describe_counter!("jobs_adapter_errors_total", "Adapter fetches that failed.");
    describe_histogram!("jobs_adapter_fetch_ms", "Adapter fetch time in milliseconds.");
    describe_histogram!(
        "jobs_roster_fan_out_ms",
        "Time to query every board on a company roster, in milliseconds."
    );
    describe_histogram!("jobs_feed_parse_ms", "RSS feed parse time in milliseconds.");
    describe_counter!("jobs_merged_total", "Records added to the feed.");
    describe_counter!("jobs_dedup_total", "Records dropped as company+title duplicates.");
    describe_counter!(
        "jobs_refresh_skipped_total",
        "Refresh triggers ignored because a pass was running."
    );
    describe_gauge!("jobs_feed_size", "Records in the published feed.");
    describe_gauge!("jobs_refresh_last_run_ts", "Unix ts when a refresh pass finished.");
    describe_gauge!("jobs_adapter_deadline_ms", "Per-adapter deadline inside a pass.");
}

/// One-time registration so the series carry HELP text on /metrics.
pub fn describe_feed_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(describe_all);
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and publish the configured adapter
    /// deadline as a static gauge.
    pub fn init(adapter_deadline_ms: u64) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        // Descriptions issued before the recorder existed went nowhere.
        describe_all();
        gauge!("jobs_adapter_deadline_ms").set(adapter_deadline_ms as f64);

        Ok(Self { handle })
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
