// src/jobs/providers/remotive.rs
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::jobs::classify::Classifier;
use crate::jobs::normalize::{capitalize, excerpt, normalize_date, value_to_string};
use crate::jobs::providers::get_json;
use crate::jobs::types::{JobRecord, SourceAdapter};

const SOURCE: &str = "Remotive";
const DEFAULT_BASE_URL: &str = "https://remotive.com";

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    jobs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RemotiveJob {
    id: serde_json::Value,
    url: Option<String>,
    title: Option<String>,
    company_name: Option<String>,
    job_type: Option<String>,
    publication_date: Option<String>,
    candidate_required_location: Option<String>,
    salary: Option<String>,
    description: Option<String>,
}

/// Generic remote-job list, design category.
pub struct RemotiveAdapter {
    client: reqwest::Client,
    classifier: Classifier,
    base_url: String,
}

impl RemotiveAdapter {
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

    fn to_record(&self, j: RemotiveJob, now: chrono::DateTime<chrono::Utc>) -> Option<JobRecord> {
        let title = j.title.as_deref().map(str::trim).unwrap_or_default();
        let company = j.company_name.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() || company.is_empty() || !self.classifier.is_design(title) {
            return None;
        }
        let location = j
            .candidate_required_location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or("Remote");
        if !self.classifier.region_ok(location) {
            return None;
        }
        // "full_time" → "Full time"
        let kind = j
            .job_type
            .as_deref()
            .map(|t| capitalize(&t.replace('_', " ")))
            .unwrap_or_default();
        Some(JobRecord {
            id: format!("rm-{}", value_to_string(Some(&j.id))),
            title: title.to_string(),
            company: company.to_string(),
            url: j.url.unwrap_or_default(),
            location: location.to_string(),
            date: normalize_date(j.publication_date.as_deref(), now),
            salary: j.salary.map(|s| s.trim().to_string()).unwrap_or_default(),
            kind,
            desc: j.description.as_deref().map(excerpt).unwrap_or_default(),
            source: SOURCE.to_string(),
        })
    }
}

#[async_trait]
impl SourceAdapter for RemotiveAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn slug(&self) -> &'static str {
        "remotive"
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        let url = format!(
            "{}/api/remote-jobs?category=design&limit=100",
            self.base_url
        );
        let listing: Listing = get_json(&self.client, &url, SOURCE).await?;
        let now = chrono::Utc::now();
        Ok(listing
            .jobs
            .into_iter()
            .filter_map(|v| serde_json::from_value::<RemotiveJob>(v).ok())
            .filter_map(|j| self.to_record(j, now))
            .collect())
    }
}
