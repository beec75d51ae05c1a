// src/crawl/queue.rs
// =============================================================================
// The work queue: discovered nodes waiting to be visited.
//
// How it works:
// 1. Workers push the children they discover (producers)
// 2. The driver pops nodes and hands them to the worker pool (consumer)
// 3. The queue has a fixed capacity. When it is full, enqueue waits until
//    someone pops. Nothing is ever dropped.
//
// Backpressure:
// - A full queue means the pool is behind. Producers are pool workers, so
//   making them wait slows discovery down to the rate visits can happen.
// - try_enqueue is the non-waiting variant; it reports QueueFull so the
//   caller can retry.
//
// Rust concepts:
// - tokio::sync::mpsc: a bounded async channel, many senders, one receiver
// - tokio::sync::Mutex: lets several consumers share the single receiver
// - tokio::time::timeout: give up waiting after a deadline
// =============================================================================

use super::NodeId;
use crate::error::{CrawlError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;

/// Counters for the work queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total nodes enqueued
    pub enqueued: AtomicU64,
    /// Total nodes dequeued
    pub dequeued: AtomicU64,
    /// Times an enqueue found the queue full
    pub backpressure_events: AtomicU64,
}

/// Bounded FIFO of nodes waiting to be visited
#[derive(Debug)]
pub struct WorkQueue {
    sender: mpsc::Sender<NodeId>,
    receiver: Mutex<mpsc::Receiver<NodeId>>,
    stats: QueueStats,
}

impl WorkQueue {
    /// Create a queue holding at most `capacity` nodes
    ///
    /// Panics if capacity is zero; CrawlConfig::validate rejects that first.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender,
            receiver: Mutex::new(receiver),
            stats: QueueStats::default(),
        }
    }

    /// Push a node, waiting for room if the queue is full
    pub async fn enqueue(&self, node: NodeId) -> Result<()> {
        if self.sender.capacity() == 0 {
            self.stats.backpressure_events.fetch_add(1, Ordering::Relaxed);
        }
        self.sender
            .send(node)
            .await
            .map_err(|_| CrawlError::QueueClosed)?;
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Push a node without waiting
    ///
    /// A full queue returns the retryable CrawlError::QueueFull.
    pub fn try_enqueue(&self, node: NodeId) -> Result<()> {
        match self.sender.try_send(node) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(node)) => {
                self.stats.backpressure_events.fetch_add(1, Ordering::Relaxed);
                Err(CrawlError::QueueFull { node })
            }
            Err(TrySendError::Closed(_)) => Err(CrawlError::QueueClosed),
        }
    }

    /// Pop the oldest node, waiting up to `timeout`
    ///
    /// Returns None if nothing arrived in time. The timeout covers waiting
    /// for other consumers too.
    pub async fn dequeue(&self, timeout: Duration) -> Option<NodeId> {
        let popped = tokio::time::timeout(timeout, async {
            let mut receiver = self.receiver.lock().await;
            receiver.recv().await
        })
        .await;

        match popped {
            Ok(Some(node)) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(node)
            }
            // The queue owns a sender, so the channel can't close under us;
            // treat both cases as "nothing arrived"
            Ok(None) | Err(_) => None,
        }
    }

    /// Nodes currently waiting
    pub fn len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a Mutex around the receiver?
//    - mpsc means "multi producer, single consumer": recv() needs &mut
//    - The driver is normally the only consumer, but wrapping the receiver
//      lets any number of tasks call dequeue(&self) safely
//    - Each node still comes out exactly once
//
// 2. Why can len() be computed from the sender?
//    - capacity() is the number of free slots right now
//    - max_capacity() is the size the channel was created with
//    - The difference is the number of queued nodes (a snapshot; it may
//      change the moment after we read it)
// -----------------------------------------------------------------------------
