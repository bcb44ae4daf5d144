// src/jobs/providers/wwr.rs
//! We Work Remotely design category, served only as an RSS feed.

use anyhow::Result;
use async_trait::async_trait;
use metrics::histogram;
use sha2::{Digest, Sha256};

use crate::jobs::classify::Classifier;
use crate::jobs::extract::{feed_items, FeedItem};
use crate::jobs::normalize::{excerpt, normalize_date, strip_html};
use crate::jobs::providers::get_text;
use crate::jobs::types::{JobRecord, SourceAdapter};

const SOURCE: &str = "WWR";
const DEFAULT_FEED_URL: &str = "https://weworkremotely.com/categories/remote-design-jobs.rss";

pub struct WwrAdapter {
    client: reqwest::Client,
    classifier: Classifier,
    feed_url: String,
}

impl WwrAdapter {
    pub fn new(client: reqwest::Client, classifier: Classifier) -> Self {
        Self {
            client,
            classifier,
            feed_url: DEFAULT_FEED_URL.to_string(),
        }
    }

    pub fn with_feed_url(mut self, feed_url: impl Into<String>) -> Self {
        self.feed_url = feed_url.into();
        self
    }

    /// Feed text → records. Never fails; unrecognized markup yields nothing.
    pub fn parse_feed(&self, xml: &str) -> Vec<JobRecord> {
        let t0 = std::time::Instant::now();
        let now = chrono::Utc::now();
        let out: Vec<JobRecord> = feed_items(xml)
            .into_iter()
            .filter_map(|it| self.to_record(it, now))
            .collect();
        histogram!("jobs_feed_parse_ms", "source" => SOURCE)
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        out
    }

    fn to_record(&self, it: FeedItem, now: chrono::DateTime<chrono::Utc>) -> Option<JobRecord> {
        let raw_title = strip_html(&it.title);
        // The channel itself and promo items carry the site name.
        if raw_title.is_empty() || raw_title.to_lowercase().contains("weworkremotely") {
            return None;
        }
        let (company, title) = split_company_title(&strip_html(&it.company), &raw_title);
        if company.is_empty() || title.is_empty() {
            return None;
        }
        let region = strip_html(&it.region);
        if !self.classifier.region_ok(&region) {
            return None;
        }
        let location = if region.is_empty() {
            "Remote".to_string()
        } else {
            region
        };
        Some(JobRecord {
            id: format!("wwr-{}", short_id(if it.link.is_empty() { &raw_title } else { &it.link })),
            title,
            company,
            url: it.link,
            location,
            date: normalize_date(Some(it.pub_date.as_str()), now),
            salary: String::new(),
            kind: String::new(),
            desc: excerpt(&it.description),
            source: SOURCE.to_string(),
        })
    }
}

/// Items without a `<company>` tag are titled "Company: Role".
fn split_company_title(company: &str, title: &str) -> (String, String) {
    if !company.is_empty() {
        let prefix = format!("{company}:");
        let role = title.strip_prefix(&prefix).unwrap_or(title).trim();
        return (company.to_string(), role.to_string());
    }
    match title.split_once(':') {
        Some((c, r)) if !c.trim().is_empty() && !r.trim().is_empty() => {
            (c.trim().to_string(), r.trim().to_string())
        }
        _ => (String::new(), title.to_string()),
    }
}

fn short_id(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    digest.iter().take(6).map(|b| format!("{b:02x}")).collect()
}

#[async_trait]
impl SourceAdapter for WwrAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn slug(&self) -> &'static str {
        "wwr"
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        let xml = get_text(&self.client, &self.feed_url, SOURCE).await?;
        Ok(self.parse_feed(&xml))
    }
}
