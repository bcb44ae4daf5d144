// src/jobs/aggregate.rs
//! Runs every adapter concurrently and folds results into one deduplicated,
//! recency-sorted set, republished after each adapter settles.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use metrics::{counter, gauge, histogram};
use serde::Serialize;

use crate::jobs::normalize::{dedupe_key, sort_timestamp};
use crate::jobs::types::{is_degraded, JobRecord, JobsResponse, SourceAdapter};
use crate::metrics::describe_feed_metrics;

/// Accumulating, deduplicated record set.
#[derive(Debug, Default, Clone)]
pub struct Merger {
    records: Vec<JobRecord>,
    seen: HashSet<String>,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch; first-seen wins per company+title key. Returns (added, duplicates).
    pub fn merge(&mut self, batch: Vec<JobRecord>) -> (usize, usize) {
        let mut added = 0usize;
        let mut dups = 0usize;
        for rec in batch {
            if self.seen.insert(dedupe_key(&rec.company, &rec.title)) {
                self.records.push(rec);
                added += 1;
            } else {
                dups += 1;
            }
        }
        (added, dups)
    }

    /// Records newest first; unparsable dates count as `now`.
    pub fn sorted(&self, now: DateTime<Utc>) -> Vec<JobRecord> {
        let mut out = self.records.clone();
        sort_by_recency(&mut out, now);
        out
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Stable sort, descending by parsed date.
pub fn sort_by_recency(records: &mut [JobRecord], now: DateTime<Utc>) {
    records.sort_by_cached_key(|r| std::cmp::Reverse(sort_timestamp(&r.date, now)));
}

/// Fold adapter outputs in arrival order into the final set.
pub fn merge_all<I>(batches: I, now: DateTime<Utc>) -> Vec<JobRecord>
where
    I: IntoIterator<Item = Vec<JobRecord>>,
{
    let mut merger = Merger::new();
    for b in batches {
        merger.merge(b);
    }
    merger.sorted(now)
}

/// Per-adapter progress. Observational only; `count` is what the adapter
/// returned, before cross-source dedupe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AdapterStatus {
    Idle,
    Loading,
    Done { count: usize },
    Failed { error: String },
}

impl AdapterStatus {
    pub fn label(&self) -> String {
        match self {
            AdapterStatus::Idle => "idle".to_string(),
            AdapterStatus::Loading => "loading…".to_string(),
            AdapterStatus::Done { count } => format!("✓ {count}"),
            AdapterStatus::Failed { .. } => "failed".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub source: String,
    #[serde(flatten)]
    pub status: AdapterStatus,
}

/// What readers see: the published set plus progress.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedSnapshot {
    pub jobs: Vec<JobRecord>,
    pub statuses: Vec<SourceStatus>,
    pub loading: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Completed { total: usize, failed: usize },
    AlreadyRunning,
}

/// Run one adapter with timing, counters and a warn log on failure.
pub async fn run_adapter(adapter: &dyn SourceAdapter) -> anyhow::Result<Vec<JobRecord>> {
    describe_feed_metrics();
    let t0 = Instant::now();
    counter!("jobs_adapter_fetch_total", "source" => adapter.name()).increment(1);
    let res = adapter.fetch_jobs().await;
    histogram!("jobs_adapter_fetch_ms", "source" => adapter.name())
        .record(t0.elapsed().as_secs_f64() * 1_000.0);
    if let Err(e) = &res {
        tracing::warn!(
            source = adapter.name(),
            degraded = is_degraded(e),
            error = %format!("{e:#}"),
            "adapter failed"
        );
        counter!("jobs_adapter_errors_total", "source" => adapter.name()).increment(1);
    }
    res
}

/// Flatten an adapter run into the endpoint shape: failures become an
/// empty job list plus an error string.
pub fn to_response(res: anyhow::Result<Vec<JobRecord>>) -> JobsResponse {
    match res {
        Ok(jobs) => JobsResponse::ok(jobs),
        Err(e) => JobsResponse::failed(format!("{e:#}")),
    }
}

/// Owns the adapters and the published feed.
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    state: RwLock<FeedSnapshot>,
    in_flight: AtomicBool,
    deadline: Duration,
}

/// Clears the in-flight flag even if a pass is dropped mid-way.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Aggregator {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, deadline: Duration) -> Self {
        let statuses = adapters
            .iter()
            .map(|a| SourceStatus {
                source: a.name().to_string(),
                status: AdapterStatus::Idle,
            })
            .collect();
        Self {
            adapters,
            state: RwLock::new(FeedSnapshot {
                statuses,
                ..FeedSnapshot::default()
            }),
            in_flight: AtomicBool::new(false),
            deadline,
        }
    }

    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    pub fn adapter(&self, slug: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.iter().find(|a| a.slug() == slug).cloned()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        match self.state.read() {
            Ok(g) => g.clone(),
            Err(poison) => poison.into_inner().clone(),
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn publish<F: FnOnce(&mut FeedSnapshot)>(&self, f: F) {
        let mut g = match self.state.write() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        };
        f(&mut g);
    }

    fn try_claim(&self) -> bool {
        describe_feed_metrics();
        let claimed = self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if !claimed {
            counter!("jobs_refresh_skipped_total").increment(1);
            tracing::info!("refresh already in flight; trigger ignored");
        }
        claimed
    }

    /// One aggregation pass. A trigger while another pass runs is ignored.
    pub async fn refresh(&self) -> RefreshOutcome {
        if !self.try_claim() {
            return RefreshOutcome::AlreadyRunning;
        }
        let _guard = InFlightGuard(&self.in_flight);
        self.run_pass().await
    }

    /// Claim the pass synchronously, run it on a background task.
    /// Returns false when a pass is already running.
    pub fn spawn_refresh(self: &Arc<Self>) -> bool {
        if !self.try_claim() {
            return false;
        }
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = InFlightGuard(&this.in_flight);
            let outcome = this.run_pass().await;
            tracing::debug!(?outcome, "background refresh done");
        });
        true
    }

    async fn run_pass(&self) -> RefreshOutcome {
        let t0 = Instant::now();

        // Replace the previous pass wholesale.
        self.publish(|s| {
            s.jobs.clear();
            s.loading = true;
            for st in s.statuses.iter_mut() {
                st.status = AdapterStatus::Loading;
            }
        });

        let deadline = self.deadline;
        let mut pending: FuturesUnordered<_> = self
            .adapters
            .iter()
            .enumerate()
            .map(|(idx, adapter)| async move {
                let res = tokio::time::timeout(deadline, run_adapter(adapter.as_ref())).await;
                let outcome = match res {
                    Ok(res) => to_response(res),
                    Err(_) => {
                        tracing::warn!(source = adapter.name(), ?deadline, "adapter deadline hit");
                        JobsResponse::failed(format!("timed out after {deadline:?}"))
                    }
                };
                (idx, outcome)
            })
            .collect();

        let mut merger = Merger::new();
        let mut failed = 0usize;
        while let Some((idx, outcome)) = pending.next().await {
            let status = match outcome.error {
                Some(error) => {
                    failed += 1;
                    AdapterStatus::Failed { error }
                }
                None => {
                    let count = outcome.jobs.len();
                    let (added, dups) = merger.merge(outcome.jobs);
                    counter!("jobs_merged_total").increment(added as u64);
                    counter!("jobs_dedup_total").increment(dups as u64);
                    AdapterStatus::Done { count }
                }
            };
            let sorted = merger.sorted(Utc::now());
            gauge!("jobs_feed_size").set(sorted.len() as f64);
            // merge + sort + publish is one step; passes never interleave
            self.publish(|s| {
                s.jobs = sorted;
                if let Some(st) = s.statuses.get_mut(idx) {
                    st.status = status;
                }
            });
        }

        let now = Utc::now();
        self.publish(|s| {
            s.loading = false;
            s.updated_at = Some(now);
        });
        gauge!("jobs_refresh_last_run_ts").set(now.timestamp() as f64);
        tracing::info!(
            total = merger.len(),
            failed,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "refresh pass finished"
        );
        RefreshOutcome::Completed {
            total: merger.len(),
            failed,
        }
    }
}
