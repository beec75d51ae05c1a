// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Build and validate the crawl configuration
// 4. Run the crawler until Ctrl-C, printing a report whenever the queue
//    stays empty for a whole timeout window
// 5. Exit with proper code (0 = stopped cleanly, 2 = error)
//
// Rust concepts used:
// - async/await: workers and the driver are tokio tasks
// - Result<T, E>: For error handling (T = success type, E = error type)
// - Closures: the idle-report callback passed to the crawler
// =============================================================================

// The crawl engine lives in the library half of this package (src/lib.rs)
use clap::Parser;
use numberline_crawler::cli::Cli;
use numberline_crawler::config::CrawlConfig;
use numberline_crawler::crawl::{CrawlSummary, Crawler, ProgressReport, RandomChildren};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use anyhow::{Context, Result};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = CrawlConfig::from_cli(&cli).context("Invalid configuration")?;

    println!("🔍 Crawling [0, {}) with {} workers", config.space_size, config.workers);
    println!(
        "📊 {} children per visit, {} ms per visit, idle report every {} s",
        config.children_per_visit,
        config.visit_latency.as_millis(),
        config.idle_timeout.as_secs()
    );

    let source = Arc::new(RandomChildren::new(config.rng_seed));
    let crawler = Crawler::new(config, source).context("Failed to set up crawler")?;

    // Ctrl-C flips the shutdown signal; the driver notices at its next wait
    let shutdown = crawler.shutdown_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => eprintln!("\nInterrupt received, shutting down..."),
            Err(e) => warn!(error = %e, "could not listen for Ctrl-C"),
        }
        shutdown.trigger();
    });

    let json = cli.json;
    let summary = crawler
        .run(|report| print_report(report, json))
        .await
        .context("Crawl failed")?;

    print_summary(&summary, json)?;
    Ok(0)
}

// Default: info for our own events, warn for everything else.
// RUST_LOG overrides it.
fn setup_logging(verbose: bool) {
    let default = if verbose {
        "numberline_crawler=debug,warn"
    } else {
        "numberline_crawler=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Prints one idle report, either as a line of text or a JSON object
fn print_report(report: &ProgressReport, json: bool) {
    if json {
        match serde_json::to_string(report) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!(error = %e, "could not serialize progress report"),
        }
    } else {
        println!(
            "⏱️  queue timed out empty, visited {} in {} sec",
            report.visited, report.elapsed_secs
        );
    }
}

fn print_summary(summary: &CrawlSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!();
    println!("📊 Summary:");
    println!("   🌱 Seed: {}", summary.seed);
    println!("   ✅ Visited: {}", summary.visited);
    println!("   📬 Dispatched: {}", summary.dispatched);
    println!("   ⏭️  Skipped: {}", summary.stats.skipped);
    println!("   ⚠️  Duplicate work: {}", summary.stats.duplicates);
    println!("   ✋ Aborted: {}", summary.stats.aborted);
    println!("   ❌ Failed: {}", summary.stats.failed);
    println!("   ⏱️  Elapsed: {:.1} sec", summary.elapsed_secs);
    Ok(())
}
