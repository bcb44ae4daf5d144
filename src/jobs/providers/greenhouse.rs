// src/jobs/providers/greenhouse.rs
//! Greenhouse public job-board API, one request per company board.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use metrics::histogram;
use serde::Deserialize;

use crate::config::Roster;
use crate::jobs::classify::Classifier;
use crate::jobs::normalize::{capitalize, excerpt, normalize_date};
use crate::jobs::providers::get_json;
use crate::jobs::types::{JobRecord, SourceAdapter};

const SOURCE: &str = "Greenhouse";
const DEFAULT_BASE_URL: &str = "https://boards-api.greenhouse.io";

#[derive(Debug, Deserialize)]
struct Board {
    /// Decoded per posting so one malformed entry does not sink the board.
    #[serde(default)]
    jobs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GhJob {
    id: u64,
    title: Option<String>,
    absolute_url: Option<String>,
    location: Option<GhLocation>,
    updated_at: Option<String>,
    /// HTML-escaped body, present with `content=true`.
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhLocation {
    name: Option<String>,
}

pub struct GreenhouseAdapter {
    client: reqwest::Client,
    roster: Arc<Roster>,
    classifier: Classifier,
    concurrency: usize,
    base_url: String,
}

impl GreenhouseAdapter {
    pub fn new(
        client: reqwest::Client,
        roster: Arc<Roster>,
        classifier: Classifier,
        concurrency: usize,
    ) -> Self {
        Self {
            client,
            roster,
            classifier,
            concurrency: concurrency.max(1),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// One board; `None` when the board is missing, slow, or malformed.
    async fn fetch_board(&self, company: &str) -> Option<Vec<JobRecord>> {
        let url = format!("{}/v1/boards/{}/jobs?content=true", self.base_url, company);
        let board: Board = match get_json(&self.client, &url, SOURCE).await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!(source = SOURCE, company, error = %e, "board skipped");
                return None;
            }
        };
        let now = chrono::Utc::now();
        let display = capitalize(company);
        let jobs = board
            .jobs
            .into_iter()
            .filter_map(|v| serde_json::from_value::<GhJob>(v).ok())
            .filter_map(|j| self.to_record(j, &display, now))
            .collect();
        Some(jobs)
    }

    fn to_record(
        &self,
        j: GhJob,
        company: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Option<JobRecord> {
        let title = j.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() || !self.classifier.is_design(title) {
            return None;
        }
        let location = j
            .location
            .and_then(|l| l.name)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Remote".to_string());
        // Greenhouse escapes the body; decode before scanning for remote terms.
        let body = j
            .content
            .as_deref()
            .map(|c| html_escape::decode_html_entities(c).to_string());
        if !self.classifier.is_remote(&location, body.as_deref()) {
            return None;
        }
        Some(JobRecord {
            id: format!("gh-{}", j.id),
            title: title.to_string(),
            company: company.to_string(),
            url: j.absolute_url.unwrap_or_default(),
            location,
            date: normalize_date(j.updated_at.as_deref(), now),
            salary: String::new(),
            kind: "Full-time".to_string(),
            desc: body.as_deref().map(excerpt).unwrap_or_default(),
            source: SOURCE.to_string(),
        })
    }
}

#[async_trait]
impl SourceAdapter for GreenhouseAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn slug(&self) -> &'static str {
        "greenhouse"
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        let t0 = Instant::now();
        let this = self;
        let boards: Vec<Option<Vec<JobRecord>>> = stream::iter(self.roster.companies.clone())
            .map(move |company| async move { this.fetch_board(&company).await })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let answered = boards.iter().filter(|b| b.is_some()).count();
        let jobs: Vec<JobRecord> = boards.into_iter().flatten().flatten().collect();

        histogram!("jobs_roster_fan_out_ms", "source" => SOURCE)
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        tracing::debug!(
            source = SOURCE,
            boards = self.roster.companies.len(),
            answered,
            jobs = jobs.len(),
            "roster fan-out done"
        );
        Ok(jobs)
    }
}
