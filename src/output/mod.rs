//! Output module for run results
//!
//! This module handles:
//! - Aggregating scraped items into price statistics
//! - Flagging price outliers
//! - Writing the JSON result and the human-readable summary

mod outliers;
mod report;
pub mod stats;
mod writer;

pub use outliers::{detect_outliers, detect_outliers_with, OutlierPolicy};
pub use report::{print_summary, write_summary, RunMetrics, RunReport};
pub use stats::{aggregate, attribute_keys, summarize_excluding, PriceStats};
pub use writer::{write_json, write_json_file, OutputError, OutputResult};
