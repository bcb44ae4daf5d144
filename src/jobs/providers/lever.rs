// src/jobs/providers/lever.rs
//! Lever public postings API, one request per company board.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use metrics::histogram;
use serde::Deserialize;

use crate::config::Roster;
use crate::jobs::classify::Classifier;
use crate::jobs::normalize::{capitalize, excerpt, normalize_date_value, salary_range};
use crate::jobs::providers::get_json;
use crate::jobs::types::{JobRecord, SourceAdapter};

const SOURCE: &str = "Lever";
const DEFAULT_BASE_URL: &str = "https://api.lever.co";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Posting {
    id: Option<String>,
    text: Option<String>,
    hosted_url: Option<String>,
    #[serde(default)]
    categories: Categories,
    workplace_type: Option<String>,
    created_at: Option<serde_json::Value>,
    description_plain: Option<String>,
    salary_range: Option<SalaryRange>,
}

#[derive(Debug, Default, Deserialize)]
struct Categories {
    location: Option<String>,
    commitment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SalaryRange {
    min: Option<serde_json::Value>,
    max: Option<serde_json::Value>,
}

pub struct LeverAdapter {
    client: reqwest::Client,
    roster: Arc<Roster>,
    classifier: Classifier,
    concurrency: usize,
    base_url: String,
}

impl LeverAdapter {
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

    async fn fetch_board(&self, company: &str) -> Option<Vec<JobRecord>> {
        let url = format!("{}/v0/postings/{}?mode=json", self.base_url, company);
        // Unknown boards answer with an object instead of an array.
        let raw: serde_json::Value = match get_json(&self.client, &url, SOURCE).await {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(source = SOURCE, company, error = %e, "board skipped");
                return None;
            }
        };
        let serde_json::Value::Array(items) = raw else {
            tracing::debug!(source = SOURCE, company, "board body is not a list");
            return None;
        };
        let now = chrono::Utc::now();
        let display = capitalize(company);
        let jobs = items
            .into_iter()
            .filter_map(|v| serde_json::from_value::<Posting>(v).ok())
            .filter_map(|p| self.to_record(p, &display, now))
            .collect();
        Some(jobs)
    }

    fn to_record(
        &self,
        p: Posting,
        company: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Option<JobRecord> {
        let id = p.id?;
        let title = p.text.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() || !self.classifier.is_design(title) {
            return None;
        }
        let workplace = p.workplace_type.as_deref().unwrap_or_default();
        let location = p
            .categories
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| "Remote".to_string());
        let remote = match workplace.to_ascii_lowercase().as_str() {
            "remote" => self.classifier.region_ok(&location),
            "onsite" | "on-site" => false,
            _ => self
                .classifier
                .is_remote(&location, p.description_plain.as_deref()),
        };
        if !remote {
            return None;
        }
        let salary = p
            .salary_range
            .as_ref()
            .map(|s| salary_range(s.min.as_ref(), s.max.as_ref()))
            .unwrap_or_default();
        let kind = p
            .categories
            .commitment
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "Full-time".to_string());
        Some(JobRecord {
            id: format!("lv-{id}"),
            title: title.to_string(),
            company: company.to_string(),
            url: p.hosted_url.unwrap_or_default(),
            location,
            date: normalize_date_value(p.created_at.as_ref(), now),
            salary,
            kind: kind.trim().to_string(),
            desc: p.description_plain.as_deref().map(excerpt).unwrap_or_default(),
            source: SOURCE.to_string(),
        })
    }
}

#[async_trait]
impl SourceAdapter for LeverAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn slug(&self) -> &'static str {
        "lever"
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        let t0 = Instant::now();
        let this = self;
        let boards: Vec<Option<Vec<JobRecord>>> = stream::iter(self.roster.companies.clone())
            .map(move |company| async move { this.fetch_board(&company).await })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let jobs: Vec<JobRecord> = boards.into_iter().flatten().flatten().collect();
        histogram!("jobs_roster_fan_out_ms", "source" => SOURCE)
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(jobs)
    }
}
