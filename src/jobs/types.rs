// src/jobs/types.rs
use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Normalized job listing shared by every adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobRecord {
    pub id: String,      // source prefix + upstream id, e.g. "gh-4012"
    pub title: String,
    pub company: String,
    pub url: String,
    pub location: String, // "Remote" when upstream omits it
    pub date: String,     // RFC 3339
    #[serde(default)]
    pub salary: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub desc: String, // plain text, <= 600 chars
    pub source: String,
}

/// Body returned by every per-adapter endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobsResponse {
    pub jobs: Vec<JobRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobsResponse {
    pub fn ok(jobs: Vec<JobRecord>) -> Self {
        Self { jobs, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            jobs: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// `Cache-Control` directive attached to adapter responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub s_maxage: u64,
    /// `None` renders a bare `stale-while-revalidate`.
    pub stale_while_revalidate: Option<u64>,
}

impl CachePolicy {
    /// Live boards: 1h fresh, 2h stale.
    pub const LIVE: CachePolicy = CachePolicy {
        s_maxage: 3_600,
        stale_while_revalidate: Some(7_200),
    };

    /// Monthly threads: 6h fresh, 24h stale.
    pub const MONTHLY: CachePolicy = CachePolicy {
        s_maxage: 21_600,
        stale_while_revalidate: Some(86_400),
    };

    pub fn header_value(&self) -> String {
        match self.stale_while_revalidate {
            Some(swr) => format!("s-maxage={}, stale-while-revalidate={}", self.s_maxage, swr),
            None => format!("s-maxage={}, stale-while-revalidate", self.s_maxage),
        }
    }
}

/// One external job source.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Human-readable label, used for badges and the source filter.
    fn name(&self) -> &'static str;
    /// URL segment under `/api/`.
    fn slug(&self) -> &'static str;
    fn cache_policy(&self) -> CachePolicy {
        CachePolicy::LIVE
    }
    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>>;
}

/// Failures that are reported in-body with HTTP 200 instead of a 500.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degraded {
    UpstreamStatus { source: &'static str, status: u16 },
    Unconfigured(&'static str),
}

impl fmt::Display for Degraded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degraded::UpstreamStatus { source, status } => {
                write!(f, "{source} upstream returned HTTP {status}")
            }
            Degraded::Unconfigured(what) => f.write_str(what),
        }
    }
}

impl std::error::Error for Degraded {}

/// True when the error chain carries a [`Degraded`] marker.
pub fn is_degraded(err: &anyhow::Error) -> bool {
    err.chain().any(|e| e.downcast_ref::<Degraded>().is_some())
}
