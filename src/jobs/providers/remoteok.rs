// src/jobs/providers/remoteok.rs
use anyhow::Result;
use async_trait::async_trait;

use crate::jobs::classify::Classifier;
use crate::jobs::normalize::{excerpt, normalize_date_value, salary_range, value_to_string};
use crate::jobs::providers::get_json;
use crate::jobs::types::{JobRecord, SourceAdapter};

const SOURCE: &str = "RemoteOK";
const DEFAULT_BASE_URL: &str = "https://remoteok.com";

/// Tag-filtered listing. The first array element is a legal notice without
/// `id`/`position` and is dropped with every other incomplete entry.
pub struct RemoteOkAdapter {
    client: reqwest::Client,
    classifier: Classifier,
    base_url: String,
}

impl RemoteOkAdapter {
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

    fn to_record(&self, v: &serde_json::Value, now: chrono::DateTime<chrono::Utc>) -> Option<JobRecord> {
        let id = value_to_string(v.get("id"));
        let title = value_to_string(v.get("position"));
        let company = value_to_string(v.get("company"));
        if id.is_empty() || title.is_empty() || company.is_empty() {
            return None;
        }
        if !self.classifier.is_design(&title) {
            return None;
        }
        let location = match value_to_string(v.get("location")) {
            l if l.is_empty() => "Remote".to_string(),
            l => l,
        };
        if !self.classifier.region_ok(&location) {
            return None;
        }
        let url = match value_to_string(v.get("apply_url")) {
            u if u.is_empty() => value_to_string(v.get("url")),
            u => u,
        };
        // `epoch` is more reliable than `date` on older entries
        let date = match v.get("date") {
            Some(d) if d.is_string() => normalize_date_value(Some(d), now),
            _ => normalize_date_value(v.get("epoch"), now),
        };
        Some(JobRecord {
            id: format!("rok-{id}"),
            title,
            company,
            url,
            location,
            date,
            salary: salary_range(v.get("salary_min"), v.get("salary_max")),
            kind: "Full-time".to_string(),
            desc: excerpt(&value_to_string(v.get("description"))),
            source: SOURCE.to_string(),
        })
    }
}

#[async_trait]
impl SourceAdapter for RemoteOkAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn slug(&self) -> &'static str {
        "remoteok"
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        let url = format!("{}/api?tag=design", self.base_url);
        let raw: serde_json::Value = get_json(&self.client, &url, SOURCE).await?;
        let now = chrono::Utc::now();
        let jobs = match raw {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| self.to_record(v, now))
                .collect(),
            _ => Vec::new(),
        };
        Ok(jobs)
    }
}
