// src/crawl/visit.rs
// =============================================================================
// The visit operation: the unit of work each pool worker runs.
//
// Steps for one node:
// 1. Already visited? Skip it. No expensive step, nothing enqueued.
// 2. Do the expensive step (a fixed delay standing in for a remote call).
// 3. Check the visited set again. If someone else visited the node while we
//    were waiting, warn about duplicate work, but keep going: the children
//    we generate are still valid.
// 4. Generate exactly K children from the child source.
// 5. Mark the node visited. This happens after generating children, so the
//    window for duplicate work stays open during steps 2-4.
// 6. Enqueue every child that is not visited yet. Visited children are
//    dropped quietly.
//
// If shutdown interrupts the expensive step, the node is NOT marked visited
// and the visit returns CrawlError::Aborted.
// =============================================================================

use super::children::ChildSource;
use super::queue::WorkQueue;
use super::shutdown::Shutdown;
use super::stats::CrawlStats;
use super::visited::VisitedSet;
use super::NodeId;
use crate::config::CrawlConfig;
use crate::error::{CrawlError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What happened during one visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitOutcome {
    /// The node was already visited; nothing was done
    Skipped,
    /// The node was visited
    Visited {
        /// All K generated children, in generation order
        children: Vec<NodeId>,
        /// How many of them were pushed onto the work queue
        enqueued: usize,
        /// Someone else visited the node while we were working on it
        duplicate: bool,
    },
}

/// Everything a visit needs, shared by all workers
pub struct Visitor {
    visited: Arc<VisitedSet>,
    queue: Arc<WorkQueue>,
    source: Arc<dyn ChildSource>,
    stats: Arc<CrawlStats>,
    shutdown: Shutdown,
    space_size: u64,
    children_per_visit: usize,
    latency: Duration,
}

impl Visitor {
    pub fn new(
        config: &CrawlConfig,
        visited: Arc<VisitedSet>,
        queue: Arc<WorkQueue>,
        source: Arc<dyn ChildSource>,
        stats: Arc<CrawlStats>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            visited,
            queue,
            source,
            stats,
            shutdown,
            space_size: config.space_size,
            children_per_visit: config.children_per_visit,
            latency: config.visit_latency,
        }
    }

    /// Visit one node on behalf of `worker`
    pub async fn visit(&self, node: NodeId, worker: &str) -> Result<VisitOutcome> {
        // Fast path: nothing to do for a node someone already visited
        if self.visited.contains(node) {
            self.stats.record_skip();
            debug!(worker, node, "already visited, skipping");
            return Ok(VisitOutcome::Skipped);
        }

        let children = self.expensive_visit_and_generate(node, worker).await?;
        self.stats.record_visit();
        info!(worker, node, "visited");

        // Only recorded now, after the children exist
        let duplicate = !self.visited.put_if_absent(node);

        let mut enqueued = 0;
        for &child in &children {
            if self.visited.contains(child) {
                self.stats.record_dropped();
                continue;
            }
            match self.shutdown.guard(self.queue.enqueue(child)).await {
                Some(result) => result?,
                None => return Err(CrawlError::Cancelled),
            }
            self.stats.record_enqueued();
            enqueued += 1;
        }

        Ok(VisitOutcome::Visited {
            children,
            enqueued,
            duplicate,
        })
    }

    // The "expensive" part: imagine a slow call to a remote service here.
    // Returns the freshly discovered children.
    async fn expensive_visit_and_generate(&self, node: NodeId, worker: &str) -> Result<Vec<NodeId>> {
        if self
            .shutdown
            .guard(tokio::time::sleep(self.latency))
            .await
            .is_none()
        {
            self.stats.record_abort();
            return Err(CrawlError::Aborted { node });
        }

        if self.visited.contains(node) {
            // Only one worker should ever get this far for a given node
            self.stats.record_duplicate();
            warn!(worker, node, "warning, duplicate work detected");
        }

        Ok(self.source.children(self.children_per_visit, self.space_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::children::{RandomChildren, ScriptedChildren};
    use std::sync::atomic::Ordering;

    struct Harness {
        visited: Arc<VisitedSet>,
        queue: Arc<WorkQueue>,
        stats: Arc<CrawlStats>,
        shutdown: Shutdown,
        visitor: Arc<Visitor>,
    }

    fn harness(config: CrawlConfig, source: Arc<dyn ChildSource>) -> Harness {
        let visited = Arc::new(VisitedSet::new());
        let queue = Arc::new(WorkQueue::new(config.queue_capacity));
        let stats = Arc::new(CrawlStats::default());
        let shutdown = Shutdown::new();
        let visitor = Arc::new(Visitor::new(
            &config,
            Arc::clone(&visited),
            Arc::clone(&queue),
            source,
            Arc::clone(&stats),
            shutdown.clone(),
        ));
        Harness {
            visited,
            queue,
            stats,
            shutdown,
            visitor,
        }
    }

    fn small_config() -> CrawlConfig {
        CrawlConfig {
            space_size: 10,
            queue_capacity: 100,
            children_per_visit: 2,
            visit_latency: Duration::from_millis(100),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_self_referencing_children_are_not_enqueued() {
        let h = harness(small_config(), Arc::new(ScriptedChildren::new([3, 3])));

        let outcome = h.visitor.visit(3, "worker-0").await.unwrap();

        assert_eq!(
            outcome,
            VisitOutcome::Visited {
                children: vec![3, 3],
                enqueued: 0,
                duplicate: false,
            }
        );
        assert_eq!(h.visited.snapshot(), vec![3]);
        assert!(h.queue.is_empty());
        assert_eq!(h.stats.children_dropped.load(Ordering::Relaxed), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generates_exactly_k_children_in_space() {
        let config = CrawlConfig {
            children_per_visit: 5,
            space_size: 1_000,
            ..small_config()
        };
        let h = harness(config, Arc::new(RandomChildren::seeded(7)));

        match h.visitor.visit(11, "worker-0").await.unwrap() {
            VisitOutcome::Visited { children, enqueued, .. } => {
                assert_eq!(children.len(), 5);
                assert!(children.iter().all(|&c| c < 1_000));
                assert_eq!(enqueued, h.queue.len());
                let fresh = children.iter().filter(|&&c| c != 11).count();
                assert_eq!(enqueued, fresh);
            }
            other => panic!("expected a visit, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_unvisited_children_are_enqueued() {
        let h = harness(small_config(), Arc::new(ScriptedChildren::new([5, 6])));
        h.visited.put_if_absent(5);

        let outcome = h.visitor.visit(1, "worker-0").await.unwrap();
        assert!(matches!(outcome, VisitOutcome::Visited { enqueued: 1, .. }));
        assert_eq!(h.queue.dequeue(Duration::from_millis(1)).await, Some(6));
        assert!(h.queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_visited_node_is_skipped_without_delay() {
        let h = harness(small_config(), Arc::new(ScriptedChildren::new([1, 2])));
        h.visited.put_if_absent(4);

        let started = tokio::time::Instant::now();
        let outcome = h.visitor.visit(4, "worker-0").await.unwrap();

        assert_eq!(outcome, VisitOutcome::Skipped);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(h.queue.is_empty());
        assert_eq!(h.stats.skipped.load(Ordering::Relaxed), 1);
        assert_eq!(h.stats.visits.load(Ordering::Relaxed), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_visits_of_same_node_warn_once() {
        let h = harness(small_config(), Arc::new(ScriptedChildren::new([8])));

        // Both visits pass the fast-path check before either finishes
        let a = {
            let visitor = Arc::clone(&h.visitor);
            tokio::spawn(async move { visitor.visit(7, "worker-0").await })
        };
        let b = {
            let visitor = Arc::clone(&h.visitor);
            tokio::spawn(async move { visitor.visit(7, "worker-1").await })
        };
        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();

        let duplicates = [a, b]
            .iter()
            .filter(|o| matches!(o, VisitOutcome::Visited { duplicate: true, .. }))
            .count();
        assert_eq!(duplicates, 1);
        assert_eq!(h.stats.duplicates.load(Ordering::Relaxed), 1);
        assert_eq!(h.stats.visits.load(Ordering::Relaxed), 2);
        assert_eq!(h.visited.snapshot(), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts_expensive_step_and_leaves_node_unvisited() {
        let h = harness(small_config(), Arc::new(ScriptedChildren::new([1, 2])));

        let visit = {
            let visitor = Arc::clone(&h.visitor);
            tokio::spawn(async move { visitor.visit(9, "worker-0").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        h.shutdown.trigger();

        let err = visit.await.unwrap().unwrap_err();
        assert!(matches!(err, CrawlError::Aborted { node: 9 }));
        assert!(!h.visited.contains(9));
        assert!(h.queue.is_empty());
        assert_eq!(h.stats.aborted.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_while_queue_full_cancels_enqueue() {
        let config = CrawlConfig {
            queue_capacity: 1,
            ..small_config()
        };
        let h = harness(config, Arc::new(ScriptedChildren::new([1, 2])));

        let visit = {
            let visitor = Arc::clone(&h.visitor);
            tokio::spawn(async move { visitor.visit(0, "worker-0").await })
        };
        // Past the expensive step; the second child is waiting for room
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!visit.is_finished());
        assert_eq!(h.queue.len(), 1);

        h.shutdown.trigger();
        let err = visit.await.unwrap().unwrap_err();
        assert!(matches!(err, CrawlError::Cancelled));
        // The node itself finished its visit before the enqueue stalled
        assert!(h.visited.contains(0));
    }
}
