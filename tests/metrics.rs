// tests/metrics.rs
//
// One refresh pass over stub adapters, then scrape /metrics.
// A recorder can be installed once per process, so everything runs in one test.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use design_jobs_feed::jobs::aggregate::Aggregator;
use design_jobs_feed::jobs::{JobRecord, SourceAdapter};
use design_jobs_feed::metrics::Metrics;

struct Fixed(Vec<JobRecord>);

#[async_trait]
impl SourceAdapter for Fixed {
    fn name(&self) -> &'static str {
        "Fixed"
    }
    fn slug(&self) -> &'static str {
        "fixed"
    }
    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        Ok(self.0.clone())
    }
}

struct Down;

#[async_trait]
impl SourceAdapter for Down {
    fn name(&self) -> &'static str {
        "Down"
    }
    fn slug(&self) -> &'static str {
        "down"
    }
    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        Err(anyhow!("dns failure"))
    }
}

fn job(id: &str, company: &str) -> JobRecord {
    JobRecord {
        id: id.into(),
        title: "Product Designer".into(),
        company: company.into(),
        url: String::new(),
        location: "Remote".into(),
        date: "2024-01-10".into(),
        salary: String::new(),
        kind: String::new(),
        desc: String::new(),
        source: "Fixed".into(),
    }
}

#[tokio::test]
async fn metrics_endpoint_contains_refresh_series() {
    let metrics = Metrics::init(45_000).expect("install recorder");

    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(Fixed(vec![job("f-1", "Figma"), job("f-2", "figma"), job("f-3", "Linear")])),
        Arc::new(Down),
    ];
    let agg = Aggregator::new(adapters, Duration::from_secs(2));
    agg.refresh().await;

    let resp = metrics
        .router()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "jobs_adapter_fetch_total",
        "jobs_adapter_errors_total",
        "jobs_adapter_fetch_ms",
        "jobs_merged_total 2",
        "jobs_dedup_total 1",
        "jobs_feed_size 2",
        "jobs_refresh_last_run_ts",
        "jobs_adapter_deadline_ms 45000",
        "# HELP jobs_adapter_fetch_total Adapter fetches attempted.",
        "# HELP jobs_dedup_total Records dropped as company+title duplicates.",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}
