// src/jobs/mod.rs
// Job feed: source adapters, normalization, merge, read-side views.

pub mod aggregate;
pub mod classify;
pub mod extract;
pub mod normalize;
pub mod providers;
pub mod types;
pub mod view;

pub use aggregate::{AdapterStatus, Aggregator, FeedSnapshot, Merger, RefreshOutcome, SourceStatus};
pub use classify::Classifier;
pub use types::{CachePolicy, Degraded, JobRecord, JobsResponse, SourceAdapter};
pub use view::{time_ago, ViewFilter};
