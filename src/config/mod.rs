//! Configuration module for Adsweep
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every setting has a default, so a run without a file behaves like
//! a run with an empty one.
//!
//! # Example
//!
//! ```no_run
//! use adsweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("adsweep.toml")).unwrap();
//! println!("Detail pages per batch: {}", config.scheduler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, CrawlerConfig, FetcherConfig, MarkupConfig, SchedulerConfig, StatsConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
