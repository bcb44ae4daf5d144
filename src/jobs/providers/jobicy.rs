// src/jobs/providers/jobicy.rs
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::jobs::classify::Classifier;
use crate::jobs::normalize::{excerpt, normalize_date, salary_range, value_to_string};
use crate::jobs::providers::get_json;
use crate::jobs::types::{JobRecord, SourceAdapter};

const SOURCE: &str = "Jobicy";
const DEFAULT_BASE_URL: &str = "https://jobicy.com";

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    jobs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobicyJob {
    id: serde_json::Value,
    url: Option<String>,
    job_title: Option<String>,
    company_name: Option<String>,
    job_geo: Option<String>,
    job_type: Option<serde_json::Value>,
    job_excerpt: Option<String>,
    pub_date: Option<String>,
    annual_salary_min: Option<serde_json::Value>,
    annual_salary_max: Option<serde_json::Value>,
}

/// Remote jobs API filtered to the design industry upstream.
pub struct JobicyAdapter {
    client: reqwest::Client,
    classifier: Classifier,
    base_url: String,
}

impl JobicyAdapter {
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

    fn to_record(&self, j: JobicyJob, now: chrono::DateTime<chrono::Utc>) -> Option<JobRecord> {
        let title = j.job_title.as_deref().map(str::trim).unwrap_or_default();
        let company = j.company_name.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() || company.is_empty() || !self.classifier.is_design(title) {
            return None;
        }
        let location = j
            .job_geo
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or("Remote");
        if !self.classifier.region_ok(location) {
            return None;
        }
        let kind = match value_to_string(j.job_type.as_ref()) {
            k if k.is_empty() => "Remote".to_string(),
            k => k,
        };
        Some(JobRecord {
            id: format!("jc-{}", value_to_string(Some(&j.id))),
            title: title.to_string(),
            company: company.to_string(),
            url: j.url.unwrap_or_default(),
            location: location.to_string(),
            date: normalize_date(j.pub_date.as_deref(), now),
            salary: salary_range(j.annual_salary_min.as_ref(), j.annual_salary_max.as_ref()),
            kind,
            desc: j.job_excerpt.as_deref().map(excerpt).unwrap_or_default(),
            source: SOURCE.to_string(),
        })
    }
}

#[async_trait]
impl SourceAdapter for JobicyAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn slug(&self) -> &'static str {
        "jobicy"
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        let url = format!(
            "{}/api/v2/remote-jobs?count=50&industry=design",
            self.base_url
        );
        let listing: Listing = get_json(&self.client, &url, SOURCE).await?;
        let now = chrono::Utc::now();
        Ok(listing
            .jobs
            .into_iter()
            .filter_map(|v| serde_json::from_value::<JobicyJob>(v).ok())
            .filter_map(|j| self.to_record(j, now))
            .collect())
    }
}
