// src/config.rs
// =============================================================================
// Runtime configuration for the crawler.
//
// CLI flags are parsed in cli.rs; this module turns them into a validated
// CrawlConfig that the crawl modules consume. Tests build CrawlConfig
// directly with struct update syntax: CrawlConfig { workers: 1, ..Default }.
// =============================================================================

use crate::cli::Cli;
use crate::crawl::NodeId;
use crate::error::ConfigError;
use std::time::Duration;

/// Validated crawler settings
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Nodes live in [0, space_size)
    pub space_size: u64,
    /// Work queue capacity
    pub queue_capacity: usize,
    /// Worker pool backlog capacity (independent from the work queue)
    pub backlog_capacity: usize,
    /// Number of workers
    pub workers: usize,
    /// Children generated by each visit
    pub children_per_visit: usize,
    /// How long the expensive step takes
    pub visit_latency: Duration,
    /// How long the queue must be empty before an idle report
    pub idle_timeout: Duration,
    /// Fixed seed node, random when None
    pub seed_node: Option<NodeId>,
    /// Seed for the random generator, entropy when None
    pub rng_seed: Option<u64>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            space_size: 100_000,
            queue_capacity: 200_000,
            backlog_capacity: 200_000,
            workers: 100,
            children_per_visit: 5,
            visit_latency: Duration::from_millis(100),
            idle_timeout: Duration::from_secs(10),
            seed_node: None,
            rng_seed: None,
        }
    }
}

impl CrawlConfig {
    /// Build a config from parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let config = Self {
            space_size: cli.space_size,
            queue_capacity: cli.queue_capacity,
            backlog_capacity: cli.backlog_capacity,
            workers: cli.workers,
            children_per_visit: cli.children,
            visit_latency: Duration::from_millis(cli.latency_ms),
            idle_timeout: Duration::from_secs(cli.idle_timeout_secs),
            seed_node: cli.seed_node,
            rng_seed: cli.rng_seed,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every field, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.space_size == 0 {
            return Err(ConfigError::InvalidSpaceSize { size: self.space_size });
        }
        // tokio's bounded channels panic on zero capacity
        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidCapacity {
                name: "queue",
                capacity: self.queue_capacity,
            });
        }
        if self.backlog_capacity == 0 {
            return Err(ConfigError::InvalidCapacity {
                name: "backlog",
                capacity: self.backlog_capacity,
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount { count: self.workers });
        }
        if self.children_per_visit == 0 {
            return Err(ConfigError::InvalidChildCount {
                count: self.children_per_visit,
            });
        }
        if let Some(node) = self.seed_node {
            if node >= self.space_size {
                return Err(ConfigError::SeedOutOfRange {
                    node,
                    space: self.space_size,
                });
            }
        }
        if self.idle_timeout.is_zero() {
            return Err(ConfigError::ZeroIdleTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_is_valid() {
        assert!(CrawlConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_cli() {
        let cli = Cli::parse_from(["numberline-crawler", "--latency-ms", "5", "--children", "2"]);
        let config = CrawlConfig::from_cli(&cli).unwrap();
        assert_eq!(config.visit_latency, Duration::from_millis(5));
        assert_eq!(config.children_per_visit, 2);
        assert_eq!(config.idle_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_zero_sizes() {
        let config = CrawlConfig { queue_capacity: 0, ..Default::default() };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidCapacity { name: "queue", capacity: 0 })
        );

        let config = CrawlConfig { backlog_capacity: 0, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCapacity { name: "backlog", .. })
        ));

        let config = CrawlConfig { workers: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::InvalidWorkerCount { count: 0 }));

        let config = CrawlConfig { space_size: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::InvalidSpaceSize { size: 0 }));

        let config = CrawlConfig { children_per_visit: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::InvalidChildCount { count: 0 }));

        let config = CrawlConfig { idle_timeout: Duration::ZERO, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::ZeroIdleTimeout));
    }

    #[test]
    fn test_rejects_seed_outside_space() {
        let config = CrawlConfig {
            space_size: 10,
            seed_node: Some(10),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SeedOutOfRange { node: 10, space: 10 })
        );
    }
}
