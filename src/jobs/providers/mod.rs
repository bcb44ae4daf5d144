// src/jobs/providers/mod.rs
//! One adapter per external job source, plus the HTTP plumbing they share.

pub mod ai_search;
pub mod arbeitnow;
pub mod greenhouse;
pub mod hn;
pub mod jobicy;
pub mod lever;
pub mod remoteok;
pub mod remotive;
pub mod wwr;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::config::{AiSearchConfig, FeedConfig, HttpConfig};
use crate::jobs::classify::Classifier;
use crate::jobs::types::{Degraded, SourceAdapter};

/// Shared reqwest client with the configured user agent and a default timeout.
pub fn build_client(http: &HttpConfig, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(http.user_agent.as_str())
        .connect_timeout(timeout.min(Duration::from_secs(4)))
        .timeout(timeout)
        .build()
        .context("building http client")
}

/// GET and decode JSON; non-success status becomes a [`Degraded`] error.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    source: &'static str,
) -> Result<T> {
    let resp = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .with_context(|| format!("{source} GET {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(Degraded::UpstreamStatus {
            source,
            status: status.as_u16(),
        }
        .into());
    }
    resp.json::<T>()
        .await
        .with_context(|| format!("{source} decoding json body"))
}

/// GET raw body text; non-success status becomes a [`Degraded`] error.
pub async fn get_text(client: &reqwest::Client, url: &str, source: &'static str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("{source} GET {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(Degraded::UpstreamStatus {
            source,
            status: status.as_u16(),
        }
        .into());
    }
    resp.text()
        .await
        .with_context(|| format!("{source} reading body"))
}

/// Every production adapter, in display order.
pub fn default_adapters(
    cfg: &FeedConfig,
    ai: &AiSearchConfig,
) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    let http = cfg.http();
    let classifier = Classifier::new(cfg.vocabulary());
    let roster_client = build_client(&http, http.roster_timeout())?;
    let client = build_client(&http, http.request_timeout())?;

    Ok(vec![
        Arc::new(greenhouse::GreenhouseAdapter::new(
            roster_client.clone(),
            Arc::new(cfg.greenhouse.clone()),
            classifier.clone(),
            http.roster_concurrency,
        )),
        Arc::new(lever::LeverAdapter::new(
            roster_client,
            Arc::new(cfg.lever.clone()),
            classifier.clone(),
            http.roster_concurrency,
        )),
        Arc::new(jobicy::JobicyAdapter::new(client.clone(), classifier.clone())),
        Arc::new(remoteok::RemoteOkAdapter::new(client.clone(), classifier.clone())),
        Arc::new(remotive::RemotiveAdapter::new(client.clone(), classifier.clone())),
        Arc::new(arbeitnow::ArbeitnowAdapter::new(client.clone(), classifier.clone())),
        Arc::new(wwr::WwrAdapter::new(client.clone(), classifier.clone())),
        Arc::new(ai_search::AiSearchAdapter::new(
            build_client(&http, ai.timeout())?,
            ai.clone(),
        )),
        Arc::new(hn::HnHiringAdapter::new(client, classifier, cfg.hn.clone())),
    ])
}
