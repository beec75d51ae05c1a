// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// Features:
// - A visited set shared by every worker (no node is visited twice, except
//   in a rare race that is detected and reported)
// - A bounded work queue with backpressure
// - A fixed pool of long-lived workers
// - A driver loop that reports progress when the queue stays empty
// - A shutdown signal that reaches every blocking call
//
// Submodules, leaves first:
// - visited:  the visited set
// - queue:    the work queue
// - children: where discovered nodes come from (random or scripted)
// - shutdown: the stop signal
// - stats:    shared counters
// - visit:    the visit operation
// - pool:     the worker pool
// - driver:   the driver loop
// =============================================================================

pub mod children;
pub mod driver;
pub mod pool;
pub mod queue;
pub mod shutdown;
pub mod stats;
pub mod visit;
pub mod visited;

/// A point on the number line being crawled
pub type NodeId = u64;

pub use children::{ChildSource, RandomChildren, ScriptedChildren};
pub use driver::{CrawlSummary, Crawler, DriverState, ProgressReport};
pub use pool::WorkerPool;
pub use queue::WorkQueue;
pub use shutdown::Shutdown;
pub use stats::{CrawlStats, StatsSnapshot};
pub use visit::{VisitOutcome, Visitor};
pub use visited::VisitedSet;
