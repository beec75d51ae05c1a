// src/crawl/pool.rs
// =============================================================================
// A fixed-size pool of workers that run visits.
//
// How it works:
// - `new` spawns exactly W long-lived worker tasks named worker-0..worker-{W-1}
// - `submit` puts a node into the pool's backlog, a bounded channel separate
//   from the work queue. When the backlog is full, submit waits.
// - Each worker takes the next node from the backlog and visits it
// - A visit that fails (or panics) is logged and counted; the worker moves
//   on to the next node. One bad task never takes down the pool.
// - `join` closes the backlog and waits for the workers to drain it
// - Triggering shutdown makes workers stop taking work; in-flight visits
//   abort at their next blocking point
//
// Rust concepts:
// - tokio::spawn: run a task concurrently on the runtime
// - JoinHandle: wait for a spawned task to finish
// - catch_unwind: turn a panic inside a future into an Err we can log
// =============================================================================

use super::shutdown::Shutdown;
use super::stats::CrawlStats;
use super::visit::Visitor;
use super::NodeId;
use crate::error::{CrawlError, Result};
use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Fixed pool of visit workers
pub struct WorkerPool {
    backlog: mpsc::Sender<NodeId>,
    handles: Vec<JoinHandle<()>>,
    names: Vec<String>,
    shutdown: Shutdown,
}

impl WorkerPool {
    /// Spawn `size` workers sharing one backlog of `backlog_capacity` slots
    ///
    /// Must be called from inside a tokio runtime.
    pub fn new(
        size: usize,
        backlog_capacity: usize,
        visitor: Arc<Visitor>,
        stats: Arc<CrawlStats>,
        shutdown: Shutdown,
    ) -> Self {
        let (backlog, receiver) = mpsc::channel(backlog_capacity);
        let receiver = Arc::new(Mutex::new(receiver));

        let names: Vec<String> = (0..size).map(|i| format!("worker-{}", i)).collect();
        let handles = names
            .iter()
            .map(|name| {
                tokio::spawn(worker_loop(
                    name.clone(),
                    Arc::clone(&receiver),
                    Arc::clone(&visitor),
                    Arc::clone(&stats),
                    shutdown.clone(),
                ))
            })
            .collect();

        Self {
            backlog,
            handles,
            names,
            shutdown,
        }
    }

    /// Hand a node to the pool, waiting while the backlog is full
    pub async fn submit(&self, node: NodeId) -> Result<()> {
        match self.shutdown.guard(self.backlog.send(node)).await {
            Some(Ok(())) => Ok(()),
            Some(Err(_)) => Err(CrawlError::PoolClosed),
            None => Err(CrawlError::Cancelled),
        }
    }

    /// Number of workers; fixed for the pool's lifetime
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Stable worker names, one per slot
    pub fn worker_names(&self) -> &[String] {
        &self.names
    }

    /// Nodes submitted but not yet picked up by a worker
    pub fn backlog_len(&self) -> usize {
        self.backlog.max_capacity() - self.backlog.capacity()
    }

    /// Stop accepting work and wait for every worker to exit
    ///
    /// Without shutdown, workers first finish everything in the backlog.
    pub async fn join(self) {
        drop(self.backlog);
        for result in join_all(self.handles).await {
            if let Err(e) = result {
                error!(error = %e, "worker task ended abnormally");
            }
        }
    }
}

async fn worker_loop(
    name: String,
    backlog: Arc<Mutex<mpsc::Receiver<NodeId>>>,
    visitor: Arc<Visitor>,
    stats: Arc<CrawlStats>,
    shutdown: Shutdown,
) {
    debug!(worker = %name, "worker started");
    loop {
        let next = shutdown
            .guard(async { backlog.lock().await.recv().await })
            .await;
        let node = match next {
            Some(Some(node)) => node,
            // Backlog closed and drained, or shutdown
            Some(None) | None => break,
        };

        let outcome = AssertUnwindSafe(visitor.visit(node, &name))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(_)) => {}
            Ok(Err(CrawlError::Aborted { node })) => {
                // Left unvisited; the crawl already tolerates missed nodes
                warn!(worker = %name, node, "visit aborted, node left unvisited");
            }
            Ok(Err(CrawlError::Cancelled)) => {
                debug!(worker = %name, node, "visit cancelled while enqueuing children");
            }
            Ok(Err(e)) => {
                stats.record_failure();
                warn!(worker = %name, node, error = %e, "visit failed");
            }
            Err(_) => {
                stats.record_failure();
                error!(worker = %name, node, "visit panicked");
            }
        }
    }
    debug!(worker = %name, "worker stopped");
}
