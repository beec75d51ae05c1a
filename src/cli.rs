// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every knob of the crawler is a flag with a default that matches the
// classic configuration: 100,000 integers, 100 workers, 5 children per
// visit, 100 ms per visit and a 10 second idle timeout.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Option<T>: flags that may be left out entirely
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::Parser;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
#[derive(Parser, Debug, Clone)]
#[command(
    name = "numberline-crawler",
    version = "0.1.0",
    about = "Crawl the integer number line with a fixed worker pool",
    long_about = "numberline-crawler behaves like a site crawler, except the 'pages' are integers. \
                  Each visit takes a while and discovers a few more integers to visit. \
                  It runs until interrupted (Ctrl-C) and reports progress whenever the queue stays empty."
)]
pub struct Cli {
    /// Size of the space: nodes are drawn from [0, space-size)
    #[arg(long, default_value_t = 100_000)]
    pub space_size: u64,

    /// Capacity of the work queue of discovered nodes
    #[arg(long, default_value_t = 200_000)]
    pub queue_capacity: usize,

    /// Capacity of the worker pool's own backlog of dispatched nodes
    #[arg(long, default_value_t = 200_000)]
    pub backlog_capacity: usize,

    /// Number of workers in the pool
    #[arg(short, long, default_value_t = 100)]
    pub workers: usize,

    /// Number of child nodes discovered by each visit
    #[arg(long, default_value_t = 5)]
    pub children: usize,

    /// Simulated latency of one visit, in milliseconds
    #[arg(long, default_value_t = 100)]
    pub latency_ms: u64,

    /// Seconds the queue must stay empty before a progress report
    #[arg(long, default_value_t = 10)]
    pub idle_timeout_secs: u64,

    /// Start from this node instead of a random one
    #[arg(long)]
    pub seed_node: Option<u64>,

    /// Seed the random generator for a reproducible crawl
    #[arg(long)]
    pub rng_seed: Option<u64>,

    /// Print progress reports as JSON lines instead of text
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
