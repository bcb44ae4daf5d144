// src/config/feed.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const ENV_FEED_CONFIG_PATH: &str = "FEED_CONFIG_PATH";
pub const DEFAULT_FEED_CONFIG_PATH: &str = "config/feed.toml";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; design-jobs-feed/0.1)";

const GREENHOUSE_BOARDS: &[&str] = &[
    // Design tools & dev-friendly
    "figma", "linear", "vercel", "notion", "loom", "superhuman", "miro", "framer", "webflow",
    "coda", "pitch",
    // Tech with a strong design culture
    "stripe", "intercom", "atlassian", "airtable", "asana", "dropbox", "zapier", "github",
    "gitlab", "brex", "plaid", "gusto", "lattice", "rippling", "mercury", "retool", "segment",
    "mixpanel", "amplitude", "contentful", "monday", "hubspot", "typeform", "canva", "descript",
];

const LEVER_BOARDS: &[&str] = &[
    "airbnb", "netflix", "spotify", "twilio", "sendbird", "personio", "pleo", "wise", "revolut",
    "monzo", "figma", "robinhood", "coinbase", "opensea", "postman", "hashicorp", "datadog",
    "snyk", "benchling",
];

const DESIGN_KEYWORDS: &[&str] = &[
    "ux", "ui designer", "ui/ux", "product designer", "product design",
    "interaction designer", "interaction design", "visual designer", "visual design",
    "design system", "web designer", "figma", "framer", "motion designer", "graphic designer",
    "brand designer", "creative director", "design lead", "design manager", "ux researcher",
    "user researcher", "user research", "staff designer", "principal designer",
];

const REMOTE_KEYWORDS: &[&str] = &[
    "remote", "anywhere", "worldwide", "distributed", "work from home", "wfh",
];

const ONSITE_KEYWORDS: &[&str] = &[
    "on-site", "onsite", "on site", "in-office", "in office", "office-based", "office based",
];

const BLOCKED_REGIONS: &[&str] = &[
    "latam", "latin america", "argentina", "brazil", "mexico", "india", "philippines",
    "indonesia", "china", "singapore", "taiwan", "hong kong", "japan", "korea", "australia",
    "new zealand",
];

/// Whole-service configuration. Immutable after load.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub http: HttpConfig,
    pub vocabulary: Vocabulary,
    pub greenhouse: Roster,
    pub lever: Roster,
    pub hn: HnConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Per-request timeout for single-endpoint adapters.
    pub request_timeout_ms: u64,
    /// Per-company timeout for roster adapters.
    pub roster_timeout_ms: u64,
    pub roster_concurrency: usize,
    /// Upper bound on one adapter inside an aggregation pass.
    pub adapter_deadline_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_ms: 8_000,
            roster_timeout_ms: 5_000,
            roster_concurrency: 12,
            adapter_deadline_ms: 45_000,
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn roster_timeout(&self) -> Duration {
        Duration::from_millis(self.roster_timeout_ms)
    }

    pub fn adapter_deadline(&self) -> Duration {
        Duration::from_millis(self.adapter_deadline_ms)
    }
}

/// Keyword lists used by the design and remote classifiers. Lower-cased on load.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Vocabulary {
    pub design: Vec<String>,
    pub remote: Vec<String>,
    pub onsite: Vec<String>,
    pub blocked_regions: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            design: owned(DESIGN_KEYWORDS),
            remote: owned(REMOTE_KEYWORDS),
            onsite: owned(ONSITE_KEYWORDS),
            blocked_regions: owned(BLOCKED_REGIONS),
        }
    }
}

/// Company board identifiers for one career-page provider.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Roster {
    pub companies: Vec<String>,
}

impl Roster {
    pub fn new<S: AsRef<str>>(companies: &[S]) -> Self {
        Self {
            companies: clean_list(companies.iter().map(|c| c.as_ref().to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HnConfig {
    pub max_jobs: usize,
    pub hits_per_page: u32,
}

impl Default for HnConfig {
    fn default() -> Self {
        Self {
            max_jobs: 20,
            hits_per_page: 100,
        }
    }
}

impl FeedConfig {
    /// Built-in rosters and vocabularies.
    pub fn builtin() -> Self {
        Self {
            greenhouse: Roster::new(GREENHOUSE_BOARDS),
            lever: Roster::new(LEVER_BOARDS),
            ..Self::default()
        }
    }

    pub fn vocabulary(&self) -> Arc<Vocabulary> {
        Arc::new(self.vocabulary.clone())
    }

    pub fn http(&self) -> Arc<HttpConfig> {
        Arc::new(self.http.clone())
    }
}

/// Load from an explicit TOML path. Sections absent from the file keep their defaults.
pub fn load_feed_config_from(path: &Path) -> Result<FeedConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed config from {}", path.display()))?;
    parse_feed_config(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Load using env var + fallbacks:
/// 1) $FEED_CONFIG_PATH
/// 2) config/feed.toml
/// 3) built-in defaults
pub fn load_feed_config_default() -> Result<FeedConfig> {
    if let Ok(p) = std::env::var(ENV_FEED_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feed_config_from(&pb);
        }
        return Err(anyhow!("{ENV_FEED_CONFIG_PATH} points to non-existent path"));
    }
    let default_p = PathBuf::from(DEFAULT_FEED_CONFIG_PATH);
    if default_p.exists() {
        return load_feed_config_from(&default_p);
    }
    Ok(FeedConfig::builtin())
}

fn parse_feed_config(s: &str) -> Result<FeedConfig> {
    // Missing roster tables mean "use the built-in roster", not "no companies".
    #[derive(Deserialize)]
    struct Raw {
        #[serde(default)]
        http: Option<HttpConfig>,
        #[serde(default)]
        vocabulary: Option<Vocabulary>,
        #[serde(default)]
        greenhouse: Option<Roster>,
        #[serde(default)]
        lever: Option<Roster>,
        #[serde(default)]
        hn: Option<HnConfig>,
    }

    let raw: Raw = toml::from_str(s)?;
    let builtin = FeedConfig::builtin();
    let vocabulary = raw.vocabulary.unwrap_or(builtin.vocabulary);
    Ok(FeedConfig {
        http: raw.http.unwrap_or(builtin.http),
        vocabulary: Vocabulary {
            design: clean_list(vocabulary.design),
            remote: clean_list(vocabulary.remote),
            onsite: clean_list(vocabulary.onsite),
            blocked_regions: clean_list(vocabulary.blocked_regions),
        },
        greenhouse: raw
            .greenhouse
            .map(|r| Roster::new(&r.companies))
            .unwrap_or(builtin.greenhouse),
        lever: raw
            .lever
            .map(|r| Roster::new(&r.companies))
            .unwrap_or(builtin.lever),
        hn: raw.hn.unwrap_or(builtin.hn),
    })
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Trim, lower-case, drop empties and duplicates; first occurrence wins.
fn clean_list<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}
