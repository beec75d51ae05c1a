// src/lib.rs
// =============================================================================
// numberline-crawler: a crawler whose "pages" are integers.
//
// Each visit to an integer takes a while (think: a slow remote call) and
// discovers a few more integers to visit. A fixed pool of workers shares a
// visited set and a bounded work queue, and a driver loop keeps the pool fed
// until it is told to stop.
//
// ```text
//   seed ──► WorkQueue ──► Driver ──► Pool backlog ──► worker-0 .. worker-N
//               ▲                                            │
//               └──── unvisited children ◄── VisitedSet ◄────┘
// ```
//
// Example:
//   numberline-crawler --space-size 100000 --workers 100
//   numberline-crawler --space-size 1000 --rng-seed 42 --idle-timeout-secs 2 --json
// =============================================================================

pub mod cli;
pub mod config;
pub mod crawl;
pub mod error;

pub use config::CrawlConfig;
pub use error::{ConfigError, CrawlError, Result};
