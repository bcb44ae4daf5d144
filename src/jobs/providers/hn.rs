// src/jobs/providers/hn.rs
//! Monthly "Ask HN: Who is hiring?" thread, mined through the Algolia HN API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::config::HnConfig;
use crate::jobs::classify::Classifier;
use crate::jobs::normalize::{
    html_to_lines, normalize_date, strip_html, title_case, truncate_chars, DESC_MAX_CHARS,
};
use crate::jobs::providers::get_json;
use crate::jobs::types::{CachePolicy, JobRecord, SourceAdapter};

const SOURCE: &str = "HN Hiring";
const DEFAULT_BASE_URL: &str = "https://hn.algolia.com";
const ITEM_URL: &str = "https://news.ycombinator.com/item?id=";
const COMPANY_MAX_CHARS: usize = 60;
const TITLE_MAX_CHARS: usize = 60;

static RE_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href="([^"]+)""#).unwrap());
static RE_ROLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:ux|ui|product|visual|interaction|web)[\s\-]*(?:designer|design\s*lead|researcher)[^\n,|.;()]*")
        .unwrap()
});

#[derive(Debug, Deserialize)]
struct SearchPage<T> {
    #[serde(default = "Vec::new")]
    hits: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StoryHit {
    #[serde(rename = "objectID")]
    object_id: String,
    title: Option<String>,
    #[serde(default)]
    created_at_i: i64,
}

#[derive(Debug, Deserialize)]
pub struct CommentHit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub comment_text: Option<String>,
    pub created_at: Option<String>,
}

pub struct HnHiringAdapter {
    client: reqwest::Client,
    classifier: Classifier,
    cfg: HnConfig,
    base_url: String,
}

impl HnHiringAdapter {
    pub fn new(client: reqwest::Client, classifier: Classifier, cfg: HnConfig) -> Self {
        Self {
            client,
            classifier,
            cfg,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// objectID of the newest thread titled like "Ask HN: Who is hiring?".
    async fn latest_thread(&self) -> Result<Option<String>> {
        let url = format!(
            "{}/api/v1/search_by_date?query=Ask+HN+Who+is+hiring&tags=ask_hn&hitsPerPage=20",
            self.base_url
        );
        let page: SearchPage<StoryHit> = get_json(&self.client, &url, SOURCE)
            .await
            .context("hn thread search")?;
        Ok(page
            .hits
            .into_iter()
            .filter(|h| is_hiring_thread(h.title.as_deref().unwrap_or_default()))
            .max_by_key(|h| h.created_at_i)
            .map(|h| h.object_id))
    }

    /// Qualifying comments → records, capped at `max_jobs`.
    pub fn mine_comments(&self, comments: Vec<CommentHit>) -> Vec<JobRecord> {
        let now = chrono::Utc::now();
        comments
            .into_iter()
            .filter_map(|c| self.to_record(c, now))
            .take(self.cfg.max_jobs)
            .collect()
    }

    fn to_record(&self, c: CommentHit, now: chrono::DateTime<chrono::Utc>) -> Option<JobRecord> {
        let html = c.comment_text.as_deref().unwrap_or_default();
        let plain = strip_html(html);
        if !self.classifier.is_design(&plain) || !self.classifier.mentions_remote(&plain) {
            return None;
        }
        let lines = html_to_lines(html);
        Some(JobRecord {
            id: format!("hn-{}", c.object_id),
            title: role_title(&lines),
            company: company_name(&lines),
            url: first_link(html).unwrap_or_else(|| format!("{ITEM_URL}{}", c.object_id)),
            location: "Remote".to_string(),
            date: normalize_date(c.created_at.as_deref(), now),
            salary: String::new(),
            kind: "Remote".to_string(),
            desc: truncate_chars(&plain, DESC_MAX_CHARS),
            source: SOURCE.to_string(),
        })
    }
}

fn is_hiring_thread(title: &str) -> bool {
    let t = title.to_lowercase();
    t.contains("who is hiring") && t.contains("ask hn")
}

/// Posts conventionally open with "Company | Role | Location | ...".
fn company_name(lines: &str) -> String {
    let first = lines
        .lines()
        .next()
        .and_then(|l| l.split('|').next())
        .map(str::trim)
        .unwrap_or_default();
    match truncate_chars(first, COMPANY_MAX_CHARS) {
        c if c.is_empty() => "Unknown".to_string(),
        c => c,
    }
}

fn first_link(html: &str) -> Option<String> {
    RE_HREF
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| html_escape::decode_html_entities(m.as_str()).to_string())
        .filter(|u| u.starts_with("http"))
}

fn role_title(lines: &str) -> String {
    let lower = lines.to_lowercase();
    RE_ROLE
        .find(&lower)
        .map(|m| truncate_chars(m.as_str().trim(), TITLE_MAX_CHARS).trim().to_string())
        .filter(|t| !t.is_empty())
        .map(|t| title_case(&t))
        .unwrap_or_else(|| "Design Role".to_string())
}

#[async_trait]
impl SourceAdapter for HnHiringAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn slug(&self) -> &'static str {
        "hn"
    }

    fn cache_policy(&self) -> CachePolicy {
        CachePolicy::MONTHLY
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        let Some(thread_id) = self.latest_thread().await? else {
            tracing::info!(source = SOURCE, "no hiring thread found");
            return Ok(Vec::new());
        };
        let url = format!(
            "{}/api/v1/search?tags=comment,story_{}&hitsPerPage={}",
            self.base_url, thread_id, self.cfg.hits_per_page
        );
        let page: SearchPage<CommentHit> = get_json(&self.client, &url, SOURCE)
            .await
            .context("hn comments")?;
        Ok(self.mine_comments(page.hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_page_without_hits_is_empty() {
        let page: SearchPage<StoryHit> = serde_json::from_str(r#"{"nbHits":0}"#).unwrap();
        assert!(page.hits.is_empty());
        let page: SearchPage<CommentHit> =
            serde_json::from_str(r#"{"hits":[{"objectID":"7","comment_text":null}]}"#).unwrap();
        assert_eq!(page.hits[0].object_id, "7");
    }

    #[test]
    fn hiring_thread_title_match() {
        assert!(is_hiring_thread("Ask HN: Who is hiring? (January 2024)"));
        assert!(!is_hiring_thread("Ask HN: Who wants to be hired? (January 2024)"));
        assert!(!is_hiring_thread("Who is hiring in Berlin"));
    }

    #[test]
    fn company_from_first_segment() {
        assert_eq!(company_name("Acme Corp | Senior Product Designer | REMOTE\nMore"), "Acme Corp");
        assert_eq!(company_name(""), "Unknown");
        let long = "x".repeat(100);
        assert_eq!(company_name(&long).len(), COMPANY_MAX_CHARS);
    }

    #[test]
    fn link_is_decoded() {
        let html = r#"Apply at <a href="https:&#x2F;&#x2F;acme.com&#x2F;jobs" rel="nofollow">acme.com</a>"#;
        assert_eq!(first_link(html).as_deref(), Some("https://acme.com/jobs"));
        assert_eq!(first_link("no links here"), None);
    }

    #[test]
    fn role_is_title_cased() {
        assert_eq!(
            role_title("Acme | Senior Product Designer | Remote (US)"),
            "Product Designer"
        );
        assert_eq!(role_title("Acme | UX Researcher, Remote"), "Ux Researcher");
        assert_eq!(role_title("Acme | Staff Engineer | Remote"), "Design Role");
    }
}
