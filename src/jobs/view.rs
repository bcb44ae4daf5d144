// src/jobs/view.rs
//! Read-side filtering and relative-time labels. Pure; the merged set is untouched.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::jobs::normalize::parse_timestamp;
use crate::jobs::types::JobRecord;

/// Sentinel meaning "no source filter".
pub const ALL_SOURCES: &str = "all";

/// Query parameters for the feed view: `?q=&source=`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewFilter {
    #[serde(default, alias = "q")]
    pub query: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl ViewFilter {
    pub fn new(query: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            source: Some(source.into()),
        }
    }

    /// Lower-cased, trimmed query; `None` when blank.
    fn needle(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty())
    }

    /// Source label to keep; `None` means every source.
    pub fn source_label(&self) -> Option<&str> {
        self.source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(ALL_SOURCES))
    }

    pub fn query_text(&self) -> &str {
        self.query.as_deref().unwrap_or_default()
    }

    pub fn matches(&self, job: &JobRecord) -> bool {
        if let Some(src) = self.source_label() {
            if job.source != src {
                return false;
            }
        }
        match self.needle() {
            None => true,
            Some(q) => format!("{} {}", job.title, job.company)
                .to_lowercase()
                .contains(&q),
        }
    }

    /// Subset of `jobs` that passes both filters, in input order.
    pub fn apply<'a>(&self, jobs: &'a [JobRecord]) -> Vec<&'a JobRecord> {
        jobs.iter().filter(|j| self.matches(j)).collect()
    }
}

/// Human label for how long ago `date` was. Future or unparsable dates read
/// as "recent"; an empty date gives an empty label.
pub fn time_ago(date: &str, now: DateTime<Utc>) -> String {
    if date.trim().is_empty() {
        return String::new();
    }
    let Some(ts) = parse_timestamp(date) else {
        return "recent".to_string();
    };
    let secs = (now - ts).num_seconds();
    if secs < 0 {
        return "recent".to_string();
    }
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;
    if hours < 1 {
        format!("{mins}m ago")
    } else if days < 1 {
        format!("{hours}h ago")
    } else if days <= 30 {
        format!("{days}d ago")
    } else {
        ts.format("%b %-d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn job(title: &str, company: &str, location: &str, source: &str) -> JobRecord {
        JobRecord {
            id: format!("t-{company}-{title}"),
            title: title.into(),
            company: company.into(),
            url: String::new(),
            location: location.into(),
            date: String::new(),
            salary: String::new(),
            kind: String::new(),
            desc: String::new(),
            source: source.into(),
        }
    }

    fn sample() -> Vec<JobRecord> {
        vec![
            job("Product Designer", "Figma", "Remote (US)", "Greenhouse"),
            job("UX Designer", "Linear", "Remote (EU)", "Lever"),
            job("Design Systems Lead", "Acme", "Figma Tower, Remote", "Remotive"),
        ]
    }

    #[test]
    fn query_matches_title_and_company_case_insensitive() {
        let jobs = sample();
        let f = ViewFilter::new("FIGMA", ALL_SOURCES);
        let got: Vec<&str> = f.apply(&jobs).iter().map(|j| j.company.as_str()).collect();
        // location is not searched
        assert_eq!(got, vec!["Figma"]);
        assert_eq!(ViewFilter::new("systems", ALL_SOURCES).apply(&jobs).len(), 1);
    }

    #[test]
    fn source_filter_and_all_sentinel() {
        let jobs = sample();
        assert_eq!(ViewFilter::new("", "Lever").apply(&jobs).len(), 1);
        assert_eq!(ViewFilter::new("", "all").apply(&jobs).len(), 3);
        assert_eq!(ViewFilter::default().apply(&jobs).len(), 3);
        assert!(ViewFilter::new("figma", "Lever").apply(&jobs).is_empty());
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let at = |d: Duration| (now - d).to_rfc3339();
        assert_eq!(time_ago(&at(Duration::minutes(5)), now), "5m ago");
        assert_eq!(time_ago(&at(Duration::hours(3)), now), "3h ago");
        assert_eq!(time_ago(&at(Duration::days(2)), now), "2d ago");
        assert_eq!(time_ago("2024-03-04T00:00:00Z", now), "Mar 4");
        assert_eq!(time_ago(&(now + Duration::hours(1)).to_rfc3339(), now), "recent");
        assert_eq!(time_ago("soon-ish", now), "recent");
        assert_eq!(time_ago("", now), "");
    }
}
