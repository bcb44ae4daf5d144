// src/jobs/normalize.rs
//! Text and date normalization shared by the adapters and the aggregator.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Character budget for `JobRecord::desc`.
pub const DESC_MAX_CHARS: usize = 600;

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
static RE_BLOCK_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\s*(?:br\s*/?|/?p|/?li|/?div)\s*>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Decode entities, strip tags and collapse whitespace.
pub fn strip_html(s: &str) -> String {
    // Escaped markup (`&lt;p&gt;`) shows up in several feeds, so decode first.
    let decoded = html_escape::decode_html_entities(s);
    let no_tags = RE_TAGS.replace_all(&decoded, " ");
    let out = no_tags
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{00A0}', " ");
    RE_WS.replace_all(&out, " ").trim().to_string()
}

/// Like [`strip_html`] but keeps paragraph/line breaks as `\n`.
pub fn html_to_lines(s: &str) -> String {
    let broken = RE_BLOCK_BREAKS.replace_all(s, "\n");
    let no_tags = RE_TAGS.replace_all(&broken, "");
    let decoded = html_escape::decode_html_entities(&no_tags).to_string();
    decoded
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max).collect()
    } else {
        s.to_string()
    }
}

/// HTML body → plain excerpt within [`DESC_MAX_CHARS`].
pub fn excerpt(html: &str) -> String {
    truncate_chars(&strip_html(html), DESC_MAX_CHARS)
}

/// "figma" → "Figma"
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uppercase the first letter of every word ("senior ux designer" → "Senior Ux Designer").
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}

/// Composite merge key: lower-cased company + title with non-word characters removed.
pub fn dedupe_key(company: &str, title: &str) -> String {
    format!("{company}{title}")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Parse the date shapes the upstream boards emit.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(n) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&n));
    }
    if let Ok(n) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&n));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse::<i64>().ok().and_then(from_epoch);
    }
    None
}

/// Unix seconds or milliseconds.
pub fn from_epoch(n: i64) -> Option<DateTime<Utc>> {
    // Anything past ~year 5138 in seconds is really milliseconds.
    if n > 100_000_000_000 {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}

/// Normalize an optional upstream date to RFC 3339, falling back to `now`.
pub fn normalize_date(raw: Option<&str>, now: DateTime<Utc>) -> String {
    raw.and_then(parse_timestamp).unwrap_or(now).to_rfc3339()
}

/// Same as [`normalize_date`] for JSON fields that may be strings or numbers.
pub fn normalize_date_value(raw: Option<&serde_json::Value>, now: DateTime<Utc>) -> String {
    let parsed = match raw {
        Some(serde_json::Value::String(s)) => parse_timestamp(s),
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(from_epoch),
        _ => None,
    };
    parsed.unwrap_or(now).to_rfc3339()
}

/// Recency sort key; unparsable dates count as `now`.
pub fn sort_timestamp(date: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    parse_timestamp(date).unwrap_or(now)
}

/// JSON scalar → trimmed string ("" for null/objects).
pub fn value_to_string(v: Option<&serde_json::Value>) -> String {
    match v {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|i| i.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

fn value_to_f64(v: Option<&serde_json::Value>) -> Option<f64> {
    match v? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// "$80k–$120k" when both bounds are present and positive.
pub fn salary_range(min: Option<&serde_json::Value>, max: Option<&serde_json::Value>) -> String {
    match (value_to_f64(min), value_to_f64(max)) {
        (Some(lo), Some(hi)) if lo > 0.0 && hi > 0.0 => {
            format!("${}k–${}k", (lo / 1000.0).round(), (hi / 1000.0).round())
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strip_html_decodes_and_collapses() {
        let s = "&lt;p&gt;We&nbsp;are <b>hiring</b>&lt;/p&gt;\n\n  designers ";
        assert_eq!(strip_html(s), "We are hiring designers");
    }

    #[test]
    fn excerpt_is_capped() {
        let long = "a".repeat(DESC_MAX_CHARS + 50);
        assert_eq!(excerpt(&long).chars().count(), DESC_MAX_CHARS);
    }

    #[test]
    fn html_to_lines_keeps_paragraphs() {
        let s = "Acme | Product Designer | Remote<p>We build things.<p>Apply: <a href=\"x\">here</a>";
        let out = html_to_lines(s);
        assert_eq!(out.lines().next(), Some("Acme | Product Designer | Remote"));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn dedupe_key_ignores_case_and_punctuation() {
        assert_eq!(
            dedupe_key("Figma", "Product Designer"),
            dedupe_key("figma", "product-designer!")
        );
        assert_ne!(dedupe_key("Figma", "UX Researcher"), dedupe_key("Linear", "UX Researcher"));
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("senior product designer"), "Senior Product Designer");
        assert_eq!(title_case("ux/ui designer-lead"), "Ux/Ui Designer-Lead");
        assert_eq!(capitalize("figma"), "Figma");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn parses_common_date_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-10"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-10T00:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-10 00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("Wed, 10 Jan 2024 00:00:00 +0000"), Some(expected));
        assert_eq!(parse_timestamp("1704844800"), Some(expected));
        assert_eq!(parse_timestamp("1704844800000"), Some(expected));
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn missing_or_bad_dates_become_now() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        assert_eq!(normalize_date(None, now), now.to_rfc3339());
        assert_eq!(normalize_date(Some("soon"), now), now.to_rfc3339());
        assert_eq!(
            normalize_date_value(Some(&json!(1704844800)), now),
            "2024-01-10T00:00:00+00:00"
        );
    }

    #[test]
    fn salary_formatting() {
        assert_eq!(salary_range(Some(&json!(80000)), Some(&json!("120000"))), "$80k–$120k");
        assert_eq!(salary_range(Some(&json!(80000)), None), "");
        assert_eq!(salary_range(Some(&json!(0)), Some(&json!(0))), "");
    }

    #[test]
    fn value_to_string_flattens_arrays() {
        assert_eq!(value_to_string(Some(&json!(["Full-Time", " Contract "]))), "Full-Time, Contract");
        assert_eq!(value_to_string(Some(&json!(42))), "42");
        assert_eq!(value_to_string(None), "");
    }
}
