// src/crawl/driver.rs
// =============================================================================
// The driver: seeds the crawl, feeds the worker pool, and reports progress.
//
// States:
//   Seeding    -> put exactly one node into the work queue
//   Running    -> wait (with a timeout) for the next node, hand it to the pool,
//                 go straight back to waiting. The driver never waits for a
//                 visit to finish.
//   IdleReport -> the queue stayed empty for a whole timeout window: emit a
//                 progress report and go back to Running. This is a liveness
//                 signal, not the end of the crawl.
//   Stopped    -> shutdown was triggered; stop the pool and return a summary
//
// Without shutdown the driver runs forever, just like a crawler that keeps
// waiting for new pages.
// =============================================================================

use super::children::ChildSource;
use super::pool::WorkerPool;
use super::queue::WorkQueue;
use super::shutdown::Shutdown;
use super::stats::{CrawlStats, StatsSnapshot};
use super::visit::Visitor;
use super::visited::VisitedSet;
use super::NodeId;
use crate::config::CrawlConfig;
use crate::error::{CrawlError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Where the driver currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Seeding,
    Running,
    IdleReport,
    Stopped,
}

/// Emitted each time the queue times out empty
#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    /// 1 for the first report, 2 for the second, ...
    pub report: u64,
    pub elapsed_secs: u64,
    /// Distinct nodes visited so far
    pub visited: usize,
    pub queued: usize,
    pub duplicates: u64,
}

/// Returned once the driver stops
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub seed: NodeId,
    pub elapsed_secs: f64,
    pub visited: usize,
    pub dispatched: u64,
    pub idle_reports: u64,
    pub stats: StatsSnapshot,
}

/// Owns the shared crawl state and runs the driver loop
pub struct Crawler {
    config: CrawlConfig,
    visited: Arc<VisitedSet>,
    queue: Arc<WorkQueue>,
    source: Arc<dyn ChildSource>,
    stats: Arc<CrawlStats>,
    shutdown: Shutdown,
}

impl Crawler {
    /// Validate the config and create the visited set and work queue
    pub fn new(config: CrawlConfig, source: Arc<dyn ChildSource>) -> Result<Self> {
        config.validate()?;
        let queue = Arc::new(WorkQueue::new(config.queue_capacity));
        Ok(Self {
            config,
            visited: Arc::new(VisitedSet::new()),
            queue,
            source,
            stats: Arc::new(CrawlStats::default()),
            shutdown: Shutdown::new(),
        })
    }

    /// Handle that stops the crawl when triggered (e.g. from Ctrl-C)
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn visited(&self) -> Arc<VisitedSet> {
        Arc::clone(&self.visited)
    }

    pub fn queue(&self) -> Arc<WorkQueue> {
        Arc::clone(&self.queue)
    }

    pub fn stats(&self) -> Arc<CrawlStats> {
        Arc::clone(&self.stats)
    }

    /// Run until shutdown, calling `on_idle` for every idle report
    pub async fn run<F>(self, mut on_idle: F) -> Result<CrawlSummary>
    where
        F: FnMut(&ProgressReport),
    {
        let visitor = Arc::new(Visitor::new(
            &self.config,
            Arc::clone(&self.visited),
            Arc::clone(&self.queue),
            Arc::clone(&self.source),
            Arc::clone(&self.stats),
            self.shutdown.clone(),
        ));
        let pool = WorkerPool::new(
            self.config.workers,
            self.config.backlog_capacity,
            visitor,
            Arc::clone(&self.stats),
            self.shutdown.clone(),
        );

        info!(
            workers = pool.size(),
            space = self.config.space_size,
            queue_capacity = self.queue.capacity(),
            "starting crawl"
        );

        let start = Instant::now();
        let mut state = DriverState::Seeding;
        let mut seed = 0;
        let mut dispatched = 0u64;
        let mut idle_reports = 0u64;

        while state != DriverState::Stopped {
            state = match state {
                DriverState::Seeding => {
                    seed = self
                        .config
                        .seed_node
                        .unwrap_or_else(|| self.source.pick(self.config.space_size));
                    info!(node = seed, "seeding work queue");
                    match self.shutdown.guard(self.queue.enqueue(seed)).await {
                        Some(Ok(())) => DriverState::Running,
                        Some(Err(e)) => return Self::abandon(pool, &self.shutdown, e).await,
                        None => DriverState::Stopped,
                    }
                }
                DriverState::Running => {
                    let next = self
                        .shutdown
                        .guard(self.queue.dequeue(self.config.idle_timeout))
                        .await;
                    match next {
                        Some(Some(node)) => match pool.submit(node).await {
                            Ok(()) => {
                                dispatched += 1;
                                DriverState::Running
                            }
                            Err(CrawlError::Cancelled) => DriverState::Stopped,
                            Err(e) => return Self::abandon(pool, &self.shutdown, e).await,
                        },
                        Some(None) => DriverState::IdleReport,
                        None => DriverState::Stopped,
                    }
                }
                DriverState::IdleReport => {
                    idle_reports += 1;
                    let report = ProgressReport {
                        report: idle_reports,
                        elapsed_secs: start.elapsed().as_secs(),
                        visited: self.visited.len(),
                        queued: self.queue.len(),
                        duplicates: self.stats.snapshot().duplicates,
                    };
                    info!(
                        visited = report.visited,
                        elapsed_secs = report.elapsed_secs,
                        "queue timed out empty"
                    );
                    on_idle(&report);
                    DriverState::Running
                }
                DriverState::Stopped => DriverState::Stopped,
            };
        }

        debug!("driver stopped, waiting for workers");
        self.shutdown.trigger();
        pool.join().await;

        let summary = CrawlSummary {
            seed,
            elapsed_secs: round_secs(start.elapsed()),
            visited: self.visited.len(),
            dispatched,
            idle_reports,
            stats: self.stats.snapshot(),
        };
        info!(
            visited = summary.visited,
            dispatched = summary.dispatched,
            duplicates = summary.stats.duplicates,
            "crawl stopped"
        );
        Ok(summary)
    }

    // Stop the workers before giving up on an unexpected error
    async fn abandon(pool: WorkerPool, shutdown: &Shutdown, e: CrawlError) -> Result<CrawlSummary> {
        error!(error = %e, "driver failed, stopping workers");
        shutdown.trigger();
        pool.join().await;
        Err(e)
    }
}

fn round_secs(d: Duration) -> f64 {
    (d.as_secs_f64() * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::children::{RandomChildren, ScriptedChildren};

    fn config() -> CrawlConfig {
        CrawlConfig {
            space_size: 10,
            queue_capacity: 100,
            backlog_capacity: 100,
            workers: 2,
            children_per_visit: 2,
            visit_latency: Duration::from_millis(10),
            idle_timeout: Duration::from_millis(50),
            seed_node: Some(3),
            rng_seed: None,
        }
    }

    fn stop_after(shutdown: Shutdown, after: Duration) {
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            shutdown.trigger();
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_self_referencing_visit_then_idle() {
        let crawler = Crawler::new(config(), Arc::new(ScriptedChildren::new([3, 3]))).unwrap();
        let visited = crawler.visited();
        let queue = crawler.queue();
        stop_after(crawler.shutdown_handle(), Duration::from_millis(70));

        let mut reports = Vec::new();
        let summary = crawler.run(|r| reports.push(r.clone())).await.unwrap();

        assert_eq!(summary.seed, 3);
        assert_eq!(summary.dispatched, 1);
        assert_eq!(visited.snapshot(), vec![3]);
        assert!(queue.is_empty());
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].visited, 1);
        assert_eq!(reports[0].queued, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_idle_report_per_window_and_keeps_running() {
        let crawler = Crawler::new(config(), Arc::new(ScriptedChildren::new([3]))).unwrap();
        stop_after(crawler.shutdown_handle(), Duration::from_millis(175));

        let mut reports = Vec::new();
        let summary = crawler.run(|r| reports.push(r.clone())).await.unwrap();

        // Windows end at 50, 100 and 150 ms; the driver was still running at 175
        assert_eq!(summary.idle_reports, 3);
        let ordinals: Vec<u64> = reports.iter().map(|r| r.report).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert!(reports.iter().all(|r| r.visited == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_crawl_explores_and_never_revisits() {
        let cfg = CrawlConfig {
            space_size: 50,
            // Roomy enough that a full backlog and a full queue never coincide
            queue_capacity: 1_000,
            backlog_capacity: 1_000,
            workers: 4,
            children_per_visit: 5,
            seed_node: None,
            ..config()
        };
        let crawler = Crawler::new(cfg, Arc::new(RandomChildren::seeded(1234))).unwrap();
        let visited = crawler.visited();
        let shutdown = crawler.shutdown_handle();

        let mut idle_seen = 0;
        let summary = crawler
            .run(|_| {
                idle_seen += 1;
                shutdown.trigger();
            })
            .await
            .unwrap();

        assert_eq!(idle_seen, 1);
        assert!(summary.visited > 1);
        assert_eq!(summary.visited, visited.len());
        assert!(visited.snapshot().iter().all(|&n| n < 50));
        // Each visit generated exactly 5 children
        let s = summary.stats;
        assert_eq!(s.children_enqueued + s.children_dropped, s.visits * 5);
        // A visit only ever runs for nodes that were not already recorded,
        // so extra visits are exactly the reported duplicates
        assert_eq!(s.visits, summary.visited as u64 + s.duplicates);
        assert_eq!(s.failed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_anything_runs() {
        let crawler = Crawler::new(config(), Arc::new(ScriptedChildren::new([1]))).unwrap();
        crawler.shutdown_handle().trigger();

        let summary = crawler.run(|_| {}).await.unwrap();
        assert_eq!(summary.dispatched, 0);
        assert_eq!(summary.visited, 0);
        assert_eq!(summary.idle_reports, 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let cfg = CrawlConfig {
            workers: 0,
            ..config()
        };
        let err = Crawler::new(cfg, Arc::new(ScriptedChildren::new([1])))
            .err()
            .unwrap();
        assert!(matches!(err, CrawlError::Config(_)));
    }
}
