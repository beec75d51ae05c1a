// src/error.rs
// =============================================================================
// Error types for the crawler.
//
// The crawler modules return these structured errors so callers can decide
// what to do with each kind (retry, log and move on, or give up). main.rs
// wraps them with anyhow when it just wants to print them.
//
// Rust concepts:
// - thiserror: derive Display and Error for enums
// - #[from]: automatic conversion so `?` works across error types
// =============================================================================

use crate::crawl::NodeId;
use thiserror::Error;

/// Errors raised by the crawl engine
#[derive(Error, Debug)]
pub enum CrawlError {
    /// Bad configuration, detected before anything starts
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The work queue is at capacity (only from the non-blocking enqueue).
    /// Retry later; the node was not dropped by the queue.
    #[error("Work queue full, node {node} not enqueued (retry later)")]
    QueueFull { node: NodeId },

    /// The work queue has no receiver any more
    #[error("Work queue closed")]
    QueueClosed,

    /// The worker pool no longer accepts work
    #[error("Worker pool closed")]
    PoolClosed,

    /// The expensive step was interrupted; the node was left unvisited
    #[error("Visit of node {node} aborted before completion")]
    Aborted { node: NodeId },

    /// Shutdown was requested while waiting on a blocking call
    #[error("Operation cancelled by shutdown")]
    Cancelled,
}

impl CrawlError {
    /// Returns true when retrying the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, CrawlError::QueueFull { .. })
    }
}

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid space size {size}: must be at least 1")]
    InvalidSpaceSize { size: u64 },

    #[error("Invalid {name} capacity {capacity}: must be at least 1")]
    InvalidCapacity { name: &'static str, capacity: usize },

    #[error("Invalid worker count {count}: must be at least 1")]
    InvalidWorkerCount { count: usize },

    #[error("Invalid children per visit {count}: must be at least 1")]
    InvalidChildCount { count: usize },

    #[error("Seed node {node} is outside the space [0, {space})")]
    SeedOutOfRange { node: NodeId, space: u64 },

    #[error("Idle timeout must be greater than zero")]
    ZeroIdleTimeout,
}

/// Result type for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;
