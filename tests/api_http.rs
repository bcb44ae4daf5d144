// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/{slug}   (ok, degraded → 200, other failure → 500, unknown → 404, Cache-Control)
// - GET /api/jobs     (filters + statuses)
// - POST /api/refresh (202, then 200 while in flight)
// - GET /             (HTML page)

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use design_jobs_feed::api::{create_router, AppState};
use design_jobs_feed::jobs::aggregate::Aggregator;
use design_jobs_feed::jobs::{CachePolicy, Degraded, JobRecord, SourceAdapter};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

enum Behaviour {
    Jobs(Vec<JobRecord>),
    Degraded,
    Broken,
}

struct Stub {
    name: &'static str,
    slug: &'static str,
    policy: CachePolicy,
    delay: Duration,
    behaviour: Behaviour,
}

#[async_trait]
impl SourceAdapter for Stub {
    fn name(&self) -> &'static str {
        self.name
    }

    fn slug(&self) -> &'static str {
        self.slug
    }

    fn cache_policy(&self) -> CachePolicy {
        self.policy
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        tokio::time::sleep(self.delay).await;
        match &self.behaviour {
            Behaviour::Jobs(jobs) => Ok(jobs.clone()),
            Behaviour::Degraded => Err(Degraded::UpstreamStatus {
                source: self.name,
                status: 503,
            }
            .into()),
            Behaviour::Broken => Err(anyhow!("unexpected end of body")),
        }
    }
}

fn rec(source: &str, id: &str, company: &str, title: &str, date: &str) -> JobRecord {
    JobRecord {
        id: id.into(),
        title: title.into(),
        company: company.into(),
        url: format!("https://example.com/{id}"),
        location: "Remote".into(),
        date: date.into(),
        salary: String::new(),
        kind: String::new(),
        desc: String::new(),
        source: source.into(),
    }
}

fn aggregator(slow_ms: u64) -> Arc<Aggregator> {
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(Stub {
            name: "Greenhouse",
            slug: "greenhouse",
            policy: CachePolicy::LIVE,
            delay: Duration::ZERO,
            behaviour: Behaviour::Jobs(vec![
                rec("Greenhouse", "gh-1", "Figma", "Product Designer", "2024-01-10T00:00:00Z"),
                rec("Greenhouse", "gh-2", "Linear", "UX Designer", "2024-01-12T00:00:00Z"),
            ]),
        }),
        Arc::new(Stub {
            name: "Lever",
            slug: "lever",
            policy: CachePolicy::LIVE,
            delay: Duration::ZERO,
            behaviour: Behaviour::Degraded,
        }),
        Arc::new(Stub {
            name: "Remotive",
            slug: "remotive",
            policy: CachePolicy::LIVE,
            delay: Duration::ZERO,
            behaviour: Behaviour::Broken,
        }),
        Arc::new(Stub {
            name: "HN Hiring",
            slug: "hn",
            policy: CachePolicy::MONTHLY,
            delay: Duration::from_millis(slow_ms),
            behaviour: Behaviour::Jobs(vec![rec(
                "HN Hiring",
                "hn-1",
                "Acme",
                "Design Lead",
                "2024-01-01T00:00:00Z",
            )]),
        }),
    ];
    Arc::new(Aggregator::new(adapters, Duration::from_secs(5)))
}

/// Build the same Router the binary uses, over stub adapters.
fn test_router(agg: Arc<Aggregator>) -> Router {
    create_router(AppState { aggregator: agg })
}

async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, headers, String::from_utf8(bytes).expect("utf8"))
}

async fn post(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("build POST");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    (status, serde_json::from_slice(&bytes).expect("json"))
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let (status, _, body) = get(test_router(aggregator(0)), "/health").await;
    assert_eq!(status, StatusCode::OK, "health should be 200");
    assert_eq!(body.trim(), "OK", "health body should be 'OK'");
}

#[tokio::test]
async fn adapter_endpoint_returns_jobs_with_live_cache_header() {
    let (status, headers, body) = get(test_router(aggregator(0)), "/api/greenhouse").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
        Some("s-maxage=3600, stale-while-revalidate=7200")
    );
    let v: Json = serde_json::from_str(&body).expect("json");
    assert_eq!(v["jobs"].as_array().map(Vec::len), Some(2));
    assert!(v.get("error").is_none());
    assert_eq!(v["jobs"][0]["source"], "Greenhouse");
}

#[tokio::test]
async fn monthly_source_uses_long_cache_header() {
    let (status, headers, _) = get(test_router(aggregator(0)), "/api/hn").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
        Some("s-maxage=21600, stale-while-revalidate=86400")
    );
}

#[tokio::test]
async fn upstream_status_failure_is_reported_in_body_with_200() {
    let (status, _, body) = get(test_router(aggregator(0)), "/api/lever").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_str(&body).expect("json");
    assert_eq!(v["jobs"], serde_json::json!([]));
    assert!(v["error"].as_str().unwrap_or_default().contains("503"));
}

#[tokio::test]
async fn unexpected_failure_is_500_with_same_shape() {
    let (status, _, body) = get(test_router(aggregator(0)), "/api/remotive").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let v: Json = serde_json::from_str(&body).expect("json");
    assert_eq!(v["jobs"], serde_json::json!([]));
    assert_eq!(v["error"], "unexpected end of body");
}

#[tokio::test]
async fn unknown_source_is_404() {
    let (status, _, body) = get(test_router(aggregator(0)), "/api/monster").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let v: Json = serde_json::from_str(&body).expect("json");
    assert_eq!(v["jobs"], serde_json::json!([]));
    assert!(v["error"].as_str().unwrap_or_default().contains("monster"));
}

#[tokio::test]
async fn feed_endpoint_filters_after_refresh() {
    let agg = aggregator(0);
    agg.refresh().await;

    let (status, _, body) = get(test_router(agg.clone()), "/api/jobs").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_str(&body).expect("json");
    assert_eq!(v["total"], 3);
    assert_eq!(v["shown"], 3);
    assert_eq!(v["loading"], false);
    assert_eq!(v["jobs"][0]["id"], "gh-2");
    let statuses = v["statuses"].as_array().expect("statuses");
    assert_eq!(statuses.len(), 4);
    assert_eq!(statuses[0]["state"], "done");
    assert_eq!(statuses[0]["count"], 2);
    assert_eq!(statuses[1]["state"], "failed");

    let (_, _, body) = get(test_router(agg.clone()), "/api/jobs?q=figma").await;
    let v: Json = serde_json::from_str(&body).expect("json");
    assert_eq!(v["shown"], 1);
    assert_eq!(v["total"], 3);
    assert_eq!(v["jobs"][0]["company"], "Figma");

    let (_, _, body) = get(test_router(agg), "/api/jobs?source=HN%20Hiring").await;
    let v: Json = serde_json::from_str(&body).expect("json");
    assert_eq!(v["shown"], 1);
    assert_eq!(v["jobs"][0]["id"], "hn-1");
}

#[tokio::test]
async fn refresh_is_accepted_once_while_in_flight() {
    let agg = aggregator(300);

    let (status, v) = post(test_router(agg.clone()), "/api/refresh").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(v["started"], true);

    let (status, v) = post(test_router(agg.clone()), "/api/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["started"], false);

    for _ in 0..100 {
        if !agg.is_refreshing() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(agg.snapshot().jobs.len(), 3);
}

#[tokio::test]
async fn index_renders_filtered_html() {
    let agg = aggregator(0);
    agg.refresh().await;

    let (status, headers, body) = get(test_router(agg), "/?q=linear&source=all").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .starts_with("text/html"));
    assert!(body.contains("UX Designer"));
    assert!(!body.contains("Product Designer"));
    assert!(body.contains("Showing 1 of 3"));
    assert!(body.contains("Sources: Greenhouse, Lever, Remotive, HN Hiring"));
}
