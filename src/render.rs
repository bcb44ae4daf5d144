// src/render.rs
//! Server-rendered list page. Styling is minimal; structure carries the view.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use url::form_urlencoded;

use crate::jobs::aggregate::{AdapterStatus, FeedSnapshot};
use crate::jobs::types::JobRecord;
use crate::jobs::view::{time_ago, ViewFilter, ALL_SOURCES};

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:860px;margin:2rem auto;padding:0 1rem;color:#1a1a1a}\
header h1{margin:0}.sub{color:#666}.statuses{display:flex;flex-wrap:wrap;gap:.75rem;margin:1rem 0;font-size:.85rem}\
.dot{display:inline-block;width:.55rem;height:.55rem;border-radius:50%;margin-right:.3rem;background:#bbb}\
.dot.loading{background:#e0a800}.dot.done{background:#2e9d4f}.dot.failed{background:#d33}\
.filters a{margin-right:.4rem;padding:.2rem .6rem;border:1px solid #ccc;border-radius:1rem;text-decoration:none;color:inherit}\
.filters a.on{background:#1a1a1a;color:#fff}.card{border:1px solid #e4e4e4;border-radius:.5rem;padding:1rem;margin:.75rem 0}\
.badge{font-size:.75rem;background:#f0f0f0;border-radius:.3rem;padding:.1rem .4rem;margin-left:.4rem}\
.meta{color:#555;font-size:.9rem}footer{color:#888;font-size:.8rem;margin:2rem 0}";

fn status_class(s: &AdapterStatus) -> &'static str {
    match s {
        AdapterStatus::Idle => "idle",
        AdapterStatus::Loading => "loading",
        AdapterStatus::Done { .. } => "done",
        AdapterStatus::Failed { .. } => "failed",
    }
}

fn filter_href(query: &str, source: &str) -> String {
    let mut qs = form_urlencoded::Serializer::new(String::new());
    if !query.is_empty() {
        qs.append_pair("q", query);
    }
    qs.append_pair("source", source);
    format!("/?{}", qs.finish())
}

fn card(out: &mut String, job: &JobRecord, now: DateTime<Utc>) {
    let _ = write!(
        out,
        "<article class=\"card\"><div><strong>{}</strong><span class=\"badge\">{}</span></div>\
         <div class=\"meta\">{} · {}",
        text(&job.title),
        text(&job.source),
        text(&job.company),
        text(&job.location),
    );
    for extra in [&job.salary, &job.kind] {
        if !extra.is_empty() {
            let _ = write!(out, " · {}", text(extra));
        }
    }
    let ago = time_ago(&job.date, now);
    if !ago.is_empty() {
        let _ = write!(out, " · {}", text(&ago));
    }
    out.push_str("</div>");
    if !job.desc.is_empty() {
        let _ = write!(
            out,
            "<details><summary>Description</summary><p>{}</p></details>",
            text(&job.desc)
        );
    }
    if !job.url.is_empty() {
        let _ = write!(
            out,
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">Apply →</a>",
            attr(&job.url)
        );
    }
    out.push_str("</article>");
}

/// Full page for the given snapshot and filter.
pub fn page(snapshot: &FeedSnapshot, filter: &ViewFilter, now: DateTime<Utc>) -> String {
    let shown = filter.apply(&snapshot.jobs);
    let query = filter.query_text();
    let selected = filter.source_label().unwrap_or(ALL_SOURCES);

    let mut out = String::with_capacity(16 * 1024);
    let _ = write!(
        out,
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
         <title>Remote Design Jobs</title><style>{STYLE}</style></head><body>"
    );

    let _ = write!(
        out,
        "<header><h1>Remote Design Jobs</h1><p class=\"sub\">{} roles from {} sources{}</p></header>",
        snapshot.jobs.len(),
        snapshot.statuses.len(),
        if snapshot.loading { " · loading…" } else { "" },
    );

    out.push_str("<div class=\"statuses\">");
    for st in &snapshot.statuses {
        let _ = write!(
            out,
            "<span title=\"{}\"><span class=\"dot {}\"></span>{} {}</span>",
            attr(match &st.status {
                AdapterStatus::Failed { error } => error.as_str(),
                _ => "",
            }),
            status_class(&st.status),
            text(&st.source),
            text(&st.status.label()),
        );
    }
    out.push_str("</div>");

    let _ = write!(
        out,
        "<form method=\"get\" action=\"/\"><input type=\"search\" name=\"q\" value=\"{}\" \
         placeholder=\"Search title or company\"><input type=\"hidden\" name=\"source\" value=\"{}\">\
         <button type=\"submit\">Search</button></form><nav class=\"filters\">",
        attr(query),
        attr(selected),
    );
    let labels = std::iter::once(ALL_SOURCES).chain(snapshot.statuses.iter().map(|s| s.source.as_str()));
    for label in labels {
        let on = if label == selected { " class=\"on\"" } else { "" };
        let _ = write!(
            out,
            "<a href=\"{}\"{on}>{}</a>",
            attr(&filter_href(query, label)),
            text(if label == ALL_SOURCES { "All" } else { label }),
        );
    }
    out.push_str("</nav>");

    let _ = write!(out, "<p class=\"meta\">Showing {} of {}</p>", shown.len(), snapshot.jobs.len());
    if shown.is_empty() {
        out.push_str(if snapshot.loading {
            "<p>Fetching jobs…</p>"
        } else {
            "<p>No jobs match.</p>"
        });
    }
    for job in shown {
        card(&mut out, job, now);
    }

    let sources: Vec<&str> = snapshot.statuses.iter().map(|s| s.source.as_str()).collect();
    let _ = write!(out, "<footer>Sources: {}", text(&sources.join(", ")));
    if let Some(ts) = snapshot.updated_at {
        let _ = write!(out, " · updated {}", ts.format("%Y-%m-%d %H:%M UTC"));
    }
    out.push_str("</footer></body></html>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::aggregate::SourceStatus;

    fn snapshot() -> FeedSnapshot {
        FeedSnapshot {
            jobs: vec![JobRecord {
                id: "gh-1".into(),
                title: "Product Designer <Senior>".into(),
                company: "Figma".into(),
                url: "https://example.com/apply?a=1&b=2".into(),
                location: "Remote".into(),
                date: "2024-01-10T00:00:00+00:00".into(),
                salary: "$120k–$160k".into(),
                kind: "Full-time".into(),
                desc: "Design things".into(),
                source: "Greenhouse".into(),
            }],
            statuses: vec![
                SourceStatus {
                    source: "Greenhouse".into(),
                    status: AdapterStatus::Done { count: 1 },
                },
                SourceStatus {
                    source: "Lever".into(),
                    status: AdapterStatus::Failed {
                        error: "upstream 503".into(),
                    },
                },
            ],
            loading: false,
            updated_at: None,
        }
    }

    #[test]
    fn escapes_and_renders_statuses() {
        let html = page(&snapshot(), &ViewFilter::default(), Utc::now());
        assert!(html.contains("Product Designer &lt;Senior&gt;"));
        assert!(html.contains("https://example.com/apply?a=1&amp;b=2"));
        assert!(html.contains("dot done"));
        assert!(html.contains("dot failed"));
        assert!(html.contains("Greenhouse ✓ 1"));
        assert!(html.contains("Sources: Greenhouse, Lever"));
        assert!(html.contains("Showing 1 of 1"));
    }

    #[test]
    fn filter_with_no_match_shows_empty_state() {
        let html = page(&snapshot(), &ViewFilter::new("nobody", "all"), Utc::now());
        assert!(html.contains("Showing 0 of 1"));
        assert!(html.contains("No jobs match."));
        assert!(html.contains("value=\"nobody\""));
    }

    #[test]
    fn source_links_keep_query() {
        assert_eq!(filter_href("ux lead", "AI Search"), "/?q=ux+lead&source=AI+Search");
        assert_eq!(filter_href("", "all"), "/?source=all");
        assert_eq!(filter_href("a&b=c", "all"), "/?q=a%26b%3Dc&source=all");
    }
}
