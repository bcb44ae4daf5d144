// src/jobs/providers/ai_search.rs
//! AI-assisted web search: asks a completion model with the web-search tool for
//! current postings and mines the first JSON array out of its reply.
//! Best-effort by construction: prose, malformed arrays, or nothing at all
//! all end up as an empty list.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::AiSearchConfig;
use crate::jobs::extract::first_object_array;
use crate::jobs::normalize::{normalize_date_value, value_to_string};
use crate::jobs::types::{Degraded, JobRecord, SourceAdapter};

const SOURCE: &str = "AI Search";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const WEB_SEARCH_BETA: &str = "web-search-2025-03-05";

const PROMPT: &str = "Search for remote UX designer or product designer job openings posted this week \
at tech companies in USA or Europe. Return ONLY a raw JSON array with no markdown backticks, no \
explanation. Each object must have exactly these fields: title, company, url, location, salary, date. \
Find 8-10 real current jobs. Only design roles (UX, UI, Product Designer, Design Systems). \
No LATAM, no Asia, no internships.";

pub const NO_KEY_ERROR: &str = "No API key configured";

pub struct AiSearchAdapter {
    client: reqwest::Client,
    cfg: AiSearchConfig,
    base_url: String,
}

impl AiSearchAdapter {
    pub fn new(client: reqwest::Client, cfg: AiSearchConfig) -> Self {
        Self {
            client,
            cfg,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn complete(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Tool<'a> {
            #[serde(rename = "type")]
            kind: &'a str,
            name: &'a str,
        }
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: u32,
            tools: Vec<Tool<'a>>,
            messages: Vec<Msg<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            content: Vec<Block>,
        }
        #[derive(Deserialize)]
        struct Block {
            #[serde(default)]
            text: Option<String>,
        }

        let req = Req {
            model: &self.cfg.model,
            max_tokens: self.cfg.max_tokens,
            tools: vec![Tool {
                kind: "web_search_20250305",
                name: "web_search",
            }],
            messages: vec![Msg {
                role: "user",
                content: PROMPT,
            }],
        };

        let resp = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.cfg.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("anthropic-beta", WEB_SEARCH_BETA)
            .timeout(self.cfg.timeout())
            .json(&req)
            .send()
            .await
            .context("ai search request")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Degraded::UpstreamStatus {
                source: SOURCE,
                status: status.as_u16(),
            }
            .into());
        }
        let body: Resp = resp.json().await.context("ai search response body")?;
        Ok(body
            .content
            .into_iter()
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

/// Model reply → records; entries without title or company are dropped.
pub fn records_from_reply(text: &str, now: chrono::DateTime<chrono::Utc>) -> Vec<JobRecord> {
    let Some(items) = first_object_array(text) else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|v| v.is_object())
        .filter_map(|v| {
            let title = value_to_string(v.get("title"));
            let company = value_to_string(v.get("company"));
            if title.is_empty() || company.is_empty() {
                return None;
            }
            let url = value_to_string(v.get("url"));
            let location = match value_to_string(v.get("location")) {
                l if l.is_empty() => "Remote".to_string(),
                l => l,
            };
            Some(JobRecord {
                id: format!("ai-{}", short_id(&company, &title, &url)),
                title,
                company,
                url,
                location,
                date: normalize_date_value(v.get("date"), now),
                salary: value_to_string(v.get("salary")),
                kind: String::new(),
                desc: String::new(),
                source: SOURCE.to_string(),
            })
        })
        .collect()
}

fn short_id(company: &str, title: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(company.as_bytes());
    hasher.update(b"\n");
    hasher.update(title.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hasher
        .finalize()
        .iter()
        .take(6)
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[async_trait]
impl SourceAdapter for AiSearchAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn slug(&self) -> &'static str {
        "ai-jobs"
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        if !self.cfg.has_key() {
            return Err(Degraded::Unconfigured(NO_KEY_ERROR).into());
        }
        let text = self.complete().await?;
        let jobs = records_from_reply(&text, chrono::Utc::now());
        if jobs.is_empty() {
            tracing::info!(source = SOURCE, reply_len = text.len(), "no usable array in reply");
        }
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn extracts_array_from_prose_and_drops_incomplete() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let reply = r#"I searched several boards. Here is what I found:
[
  {"title": "Product Designer", "company": "Figma", "url": "https://figma.com/careers/1", "location": "Remote (US)", "salary": "$150k", "date": "2024-01-12"},
  {"title": "UX Researcher", "company": "", "url": "https://x"},
  {"title": "Design Systems Lead", "company": "Linear", "url": "https://linear.app/careers", "date": "whenever"}
]
Hope this helps!"#;
        let jobs = records_from_reply(reply, now);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].company, "Figma");
        assert_eq!(jobs[0].date, "2024-01-12T00:00:00+00:00");
        assert_eq!(jobs[0].source, "AI Search");
        assert!(jobs[0].id.starts_with("ai-"));
        assert_eq!(jobs[1].location, "Remote");
        assert_eq!(jobs[1].date, now.to_rfc3339());
    }

    #[test]
    fn citation_markers_ahead_of_the_array_are_skipped() {
        let now = chrono::Utc::now();
        let reply = "Based on my search [1], here are the roles:\n\
[{\"title\":\"Product Designer\",\"company\":\"Figma\",\"url\":\"https://figma.com/careers/2\"}]";
        let jobs = records_from_reply(reply, now);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Product Designer");
    }

    #[test]
    fn prose_only_yields_nothing() {
        let now = chrono::Utc::now();
        assert!(records_from_reply("Sorry, I could not find any postings.", now).is_empty());
        assert!(records_from_reply("[not json at all]", now).is_empty());
    }
}
