use crate::{matchendirect::START_URL, CrawlerError, DateNormalizer, HttpFetcher};
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::time::Duration;

/// 03:30 UTC on Mondays, Wednesdays and Fridays.
pub const DEFAULT_CRON: &str = "0 30 3 * * Mon,Wed,Fri";

#[derive(Debug, Clone, clap::Args)]
pub struct DatabaseArgs {
    /// SQLite file, created when missing
    #[arg(long, env = "DATABASE_PATH", default_value = "matches.sqlite3")]
    pub database: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct CrawlArgs {
    /// Newest results page, older pages are reached from it
    #[arg(long, env = "START_URL", default_value = START_URL)]
    pub start_url: String,

    /// Maximum number of pages visited in one run
    #[arg(long, env = "PAGE_BUDGET", default_value_t = 10)]
    pub page_budget: u32,

    /// UTC offset of the times shown by the site, e.g. +01:00
    #[arg(long, env = "SITE_UTC_OFFSET", default_value = "+00:00", value_parser = parse_offset)]
    pub site_utc_offset: FixedOffset,

    /// Minimum delay between two requests
    #[arg(long, env = "REQUEST_DELAY_MS", default_value_t = 200)]
    pub request_delay_ms: u64,

    /// Give up on a request after this many seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,
}

impl CrawlArgs {
    pub fn fetcher(&self) -> Result<HttpFetcher, CrawlerError> {
        HttpFetcher::new(
            Duration::from_millis(self.request_delay_ms),
            self.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn normalizer(&self) -> DateNormalizer {
        DateNormalizer::new(self.site_utc_offset)
    }
}

#[derive(Debug, Clone, Copy, clap::Args)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = 10)]
    pub size: u32,
}

pub fn parse_offset(s: &str) -> Result<FixedOffset, String> {
    DateTime::parse_from_rfc3339(&format!("2000-01-01T00:00:00{}", s.trim()))
        .map(|d| *d.offset())
        .map_err(|_| format!("invalid UTC offset {:?}, expected e.g. +01:00", s))
}

pub fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("+01:00").unwrap().local_minus_utc(), 3600);
        assert_eq!(parse_offset("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_offset("-05:30").unwrap().local_minus_utc(), -19800);
        assert!(parse_offset("Paris").is_err());
    }
}
