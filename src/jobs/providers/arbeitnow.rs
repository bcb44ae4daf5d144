// src/jobs/providers/arbeitnow.rs
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::jobs::classify::Classifier;
use crate::jobs::normalize::{excerpt, normalize_date_value, value_to_string};
use crate::jobs::providers::get_json;
use crate::jobs::types::{JobRecord, SourceAdapter};

const SOURCE: &str = "Arbeitnow";
const DEFAULT_BASE_URL: &str = "https://arbeitnow.com";

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ArbeitnowJob {
    slug: Option<String>,
    company_name: Option<String>,
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    remote: bool,
    url: Option<String>,
    job_types: Option<serde_json::Value>,
    location: Option<String>,
    created_at: Option<serde_json::Value>,
}

/// Company-agnostic job board; only `remote == true` listings are kept.
pub struct ArbeitnowAdapter {
    client: reqwest::Client,
    classifier: Classifier,
    base_url: String,
}

impl ArbeitnowAdapter {
    pub fn new(client: reqwest::Client, classifier: Classifier) -> Self {
        Self {
            client,
            classifier,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn to_record(&self, j: ArbeitnowJob, now: chrono::DateTime<chrono::Utc>) -> Option<JobRecord> {
        if !j.remote {
            return None;
        }
        let slug = j.slug.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let title = j.title.as_deref().map(str::trim).unwrap_or_default();
        let company = j.company_name.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() || company.is_empty() || !self.classifier.is_design(title) {
            return None;
        }
        let location = j
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| format!("{l} (Remote)"))
            .unwrap_or_else(|| "Remote".to_string());
        if !self.classifier.region_ok(&location) {
            return None;
        }
        Some(JobRecord {
            id: format!("an-{slug}"),
            title: title.to_string(),
            company: company.to_string(),
            url: j.url.unwrap_or_default(),
            location,
            date: normalize_date_value(j.created_at.as_ref(), now),
            salary: String::new(),
            kind: value_to_string(j.job_types.as_ref()),
            desc: j.description.as_deref().map(excerpt).unwrap_or_default(),
            source: SOURCE.to_string(),
        })
    }
}

#[async_trait]
impl SourceAdapter for ArbeitnowAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn slug(&self) -> &'static str {
        "arbeitnow"
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        let url = format!("{}/api/job-board-api?remote=true", self.base_url);
        let page: Page = get_json(&self.client, &url, SOURCE).await?;
        let now = chrono::Utc::now();
        Ok(page
            .data
            .into_iter()
            .filter_map(|v| serde_json::from_value::<ArbeitnowJob>(v).ok())
            .filter_map(|j| self.to_record(j, now))
            .collect())
    }
}
