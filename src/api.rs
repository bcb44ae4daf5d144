use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::jobs::aggregate::{run_adapter, to_response, Aggregator, SourceStatus};
use crate::jobs::types::{is_degraded, JobRecord, JobsResponse};
use crate::jobs::view::ViewFilter;
use crate::render;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(|| async { "OK" }))
        .route("/api/jobs", get(feed))
        .route("/api/refresh", post(refresh))
        .route("/api/{slug}", get(adapter_endpoint))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// One adapter, live. Upstream trouble is reported in-body with 200; anything
/// else that went wrong answers 500 with the same shape.
async fn adapter_endpoint(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let Some(adapter) = state.aggregator.adapter(&slug) else {
        return (
            StatusCode::NOT_FOUND,
            Json(JobsResponse::failed(format!("unknown source: {slug}"))),
        )
            .into_response();
    };
    let res = run_adapter(adapter.as_ref()).await;
    let status = match &res {
        Err(e) if !is_degraded(e) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    let mut resp = (status, Json(to_response(res))).into_response();
    if let Ok(v) = HeaderValue::from_str(&adapter.cache_policy().header_value()) {
        resp.headers_mut().insert(header::CACHE_CONTROL, v);
    }
    resp
}

#[derive(Serialize)]
struct FeedResp<'a> {
    jobs: Vec<&'a JobRecord>,
    total: usize,
    shown: usize,
    loading: bool,
    updated_at: Option<DateTime<Utc>>,
    statuses: &'a [SourceStatus],
}

async fn feed(State(state): State<AppState>, Query(filter): Query<ViewFilter>) -> Response {
    let snap = state.aggregator.snapshot();
    let jobs = filter.apply(&snap.jobs);
    Json(FeedResp {
        total: snap.jobs.len(),
        shown: jobs.len(),
        jobs,
        loading: snap.loading,
        updated_at: snap.updated_at,
        statuses: &snap.statuses,
    })
    .into_response()
}

#[derive(Serialize)]
struct RefreshResp {
    started: bool,
}

async fn refresh(State(state): State<AppState>) -> (StatusCode, Json<RefreshResp>) {
    if state.aggregator.spawn_refresh() {
        (StatusCode::ACCEPTED, Json(RefreshResp { started: true }))
    } else {
        (StatusCode::OK, Json(RefreshResp { started: false }))
    }
}

async fn index(State(state): State<AppState>, Query(filter): Query<ViewFilter>) -> Html<String> {
    let snap = state.aggregator.snapshot();
    Html(render::page(&snap, &filter, Utc::now()))
}
