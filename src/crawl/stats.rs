// src/crawl/stats.rs
// =============================================================================
// Counters shared by every worker.
//
// Atomics let many tasks bump a counter without a lock. Relaxed ordering is
// enough: the numbers are only read for reports, never to make decisions.
// =============================================================================

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters updated by the visit operation and the worker pool
#[derive(Debug, Default)]
pub struct CrawlStats {
    /// Visits that ran the expensive step and generated children
    pub visits: AtomicU64,
    /// Visits skipped because the node was already visited
    pub skipped: AtomicU64,
    /// Visits that found their node visited by someone else meanwhile
    pub duplicates: AtomicU64,
    /// Visits interrupted by shutdown
    pub aborted: AtomicU64,
    /// Tasks that returned another error or panicked
    pub failed: AtomicU64,
    /// Children pushed onto the work queue
    pub children_enqueued: AtomicU64,
    /// Children dropped because they were already visited
    pub children_dropped: AtomicU64,
}

impl CrawlStats {
    pub fn record_visit(&self) {
        self.visits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_abort(&self) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enqueued(&self) {
        self.children_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.children_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy all counters at once
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            visits: self.visits.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            children_enqueued: self.children_enqueued.load(Ordering::Relaxed),
            children_dropped: self.children_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of CrawlStats, printable as JSON
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub visits: u64,
    pub skipped: u64,
    pub duplicates: u64,
    pub aborted: u64,
    pub failed: u64,
    pub children_enqueued: u64,
    pub children_dropped: u64,
}
