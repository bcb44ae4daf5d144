// src/jobs/extract.rs
//! Best-effort extraction from loosely structured upstream text.
//! Nothing here returns an error: a miss is `None` or an empty field.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<item(?:\s[^>]*)?>(.*?)</item>").unwrap());
static RE_FIRST_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?://[^\s<"]+"#).unwrap());

/// Fields pulled out of one `<item>` of a syndication feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub pub_date: String,
    pub description: String,
    pub region: String,
    pub company: String,
}

/// Pattern-matches a known set of tags; either CDATA-wrapped or plain bodies.
pub struct FeedExtractor {
    title: Regex,
    link: Regex,
    pub_date: Regex,
    description: Regex,
    region: Regex,
    company: Regex,
}

static FEED_EXTRACTOR: Lazy<FeedExtractor> = Lazy::new(FeedExtractor::new);

impl FeedExtractor {
    fn new() -> Self {
        Self {
            title: tag_regex("title"),
            link: tag_regex("link"),
            pub_date: tag_regex("pubDate"),
            description: tag_regex("description"),
            region: tag_regex("region"),
            company: tag_regex("company"),
        }
    }

    pub fn shared() -> &'static FeedExtractor {
        &FEED_EXTRACTOR
    }

    pub fn items(&self, xml: &str) -> Vec<FeedItem> {
        RE_ITEM
            .captures_iter(xml)
            .filter_map(|c| c.get(1))
            .map(|block| self.item(block.as_str()))
            .collect()
    }

    pub fn item(&self, block: &str) -> FeedItem {
        let link = match field(&self.link, block) {
            l if !l.is_empty() => l,
            _ => RE_FIRST_URL
                .find(block)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        };
        FeedItem {
            title: field(&self.title, block),
            link,
            pub_date: field(&self.pub_date, block),
            description: field(&self.description, block),
            region: field(&self.region, block),
            company: field(&self.company, block),
        }
    }
}

fn tag_regex(tag: &str) -> Regex {
    let pattern = format!(
        r"(?s)<{tag}(?:\s[^>]*)?>\s*<!\[CDATA\[(.*?)\]\]>\s*</{tag}>|<{tag}(?:\s[^>]*)?>([^<]*)</{tag}>"
    );
    Regex::new(&pattern).unwrap()
}

fn field(re: &Regex, block: &str) -> String {
    re.captures(block)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Parse feed XML into items.
pub fn feed_items(xml: &str) -> Vec<FeedItem> {
    FeedExtractor::shared().items(xml)
}

/// First balanced `[...]` in free text that parses as a JSON array holding
/// at least one object.
///
/// Brackets inside JSON strings are skipped, so `"Design [Remote]"` does not
/// end the scan early. Candidates that do not parse, and citation markers
/// such as `[1]`, are skipped and the scan resumes at the next `[`.
pub fn first_object_array(text: &str) -> Option<Vec<serde_json::Value>> {
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(rel) = text[from..].find('[') {
        let start = from + rel;
        if let Some(end) = matching_bracket(bytes, start) {
            if let Ok(serde_json::Value::Array(items)) =
                serde_json::from_str::<serde_json::Value>(&text[start..=end])
            {
                if items.iter().any(serde_json::Value::is_object) {
                    return Some(items);
                }
            }
        }
        from = start + 1;
    }
    None
}

/// Index of the `]` closing the `[` at `start`, honoring JSON string quoting.
fn matching_bracket(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_str = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_str {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_str = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_str = true,
            b'[' => depth += 1,
            b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
