// src/jobs/classify.rs
//! Keyword classifiers: design-role titles and remote-friendly locations.

use std::sync::Arc;

use crate::config::Vocabulary;
use crate::jobs::normalize::{strip_html, truncate_chars};

/// How much of a job body is scanned when the location string is inconclusive.
const BODY_SNIPPET_CHARS: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationVerdict {
    Remote,
    Blocked,
    OnSite,
    Unclear,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    vocab: Arc<Vocabulary>,
}

impl Classifier {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Case-insensitive match of the title against the design vocabulary.
    pub fn is_design(&self, title: &str) -> bool {
        let t = title.to_lowercase();
        self.vocab.design.iter().any(|k| contains_term(&t, k, false))
    }

    /// Any remote-work term in free text (already plain or HTML).
    pub fn mentions_remote(&self, text: &str) -> bool {
        let t = text.to_lowercase();
        self.vocab.remote.iter().any(|k| contains_term(&t, k, false))
    }

    /// False when the location names a blocked region.
    pub fn region_ok(&self, location: &str) -> bool {
        let l = location.to_lowercase();
        !self
            .vocab
            .blocked_regions
            .iter()
            .any(|r| contains_term(&l, r, true))
    }

    pub fn location_verdict(&self, location: &str) -> LocationVerdict {
        let l = location.trim().to_lowercase();
        if l.is_empty() {
            // Boards omit the field for fully remote roles.
            return LocationVerdict::Remote;
        }
        if !self.region_ok(&l) {
            return LocationVerdict::Blocked;
        }
        if self.vocab.onsite.iter().any(|k| contains_term(&l, k, true)) {
            return LocationVerdict::OnSite;
        }
        if self.mentions_remote(&l) {
            return LocationVerdict::Remote;
        }
        LocationVerdict::Unclear
    }

    /// Remote classifier used by the career-page adapters: explicit allow/deny
    /// on the location, then the opening of the job body for an unclear location.
    pub fn is_remote(&self, location: &str, body: Option<&str>) -> bool {
        match self.location_verdict(location) {
            LocationVerdict::Remote => true,
            LocationVerdict::Blocked | LocationVerdict::OnSite => false,
            LocationVerdict::Unclear => body
                .map(|b| self.mentions_remote(&truncate_chars(&strip_html(b), BODY_SNIPPET_CHARS)))
                .unwrap_or(false),
        }
    }
}

/// Substring match; short alphanumeric terms (`ux`, `wfh`) and `whole_word`
/// terms must sit on word boundaries.
fn contains_term(haystack: &str, term: &str, whole_word: bool) -> bool {
    if term.is_empty() {
        return false;
    }
    let bounded = whole_word || (term.chars().count() <= 3 && term.chars().all(char::is_alphanumeric));
    if !bounded {
        return haystack.contains(term);
    }
    haystack.match_indices(term).any(|(start, m)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + m.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
