use crate::config::types::{
    Config, CrawlerConfig, FetcherConfig, MarkupConfig, SchedulerConfig, StatsConfig,
};
use crate::extract::MarkupProfile;
use crate::ConfigError;

/// Upper bound on detail pages fetched at once
const MAX_CONCURRENCY: usize = 50;

/// Upper bound on retries after the first attempt
const MAX_RETRIES: u32 = 10;

/// Upper bound on the pause between results pages (one minute)
const MAX_PAGE_DELAY_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_crawler_config(&config.crawler)?;
    validate_scheduler_config(&config.scheduler)?;
    validate_stats_config(&config.stats)?;
    validate_markup_config(&config.markup)?;
    Ok(())
}

fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= {}, got {}",
            MAX_RETRIES, config.max_retries
        )));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_delay_ms > MAX_PAGE_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "page-delay-ms must be <= {}, got {}",
            MAX_PAGE_DELAY_MS, config.page_delay_ms
        )));
    }

    Ok(())
}

fn validate_scheduler_config(config: &SchedulerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    Ok(())
}

fn validate_stats_config(config: &StatsConfig) -> Result<(), ConfigError> {
    if !config.outlier_multiplier.is_finite() || config.outlier_multiplier <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "outlier-multiplier must be a positive number, got {}",
            config.outlier_multiplier
        )));
    }

    if config.outlier_min_sample < 1 {
        return Err(ConfigError::Validation(
            "outlier-min-sample must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_markup_config(config: &MarkupConfig) -> Result<(), ConfigError> {
    let text_settings = [
        ("results-container-id", &config.results_container_id),
        ("results-container-token", &config.results_container_token),
        ("termination-marker", &config.termination_marker),
        ("full-row-class", &config.full_row_class),
    ];

    for (name, value) in text_settings {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    // Compiling the profile checks every selector
    MarkupProfile::from_config(config).map(|_| ())
}
