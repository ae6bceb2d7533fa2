use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod config;
pub mod crawler;
pub mod date;
pub mod extract;
pub mod fetch;
pub mod ingest;
pub mod matchendirect;
pub mod model;
pub mod schedule;
pub mod store;

mod data;
mod error;
mod utils;

pub use crawler::Crawler;
pub use data::Table;
pub use date::DateNormalizer;
pub use error::CrawlerError;
pub use extract::MatchRecordExtractor;
pub use fetch::{Fetcher, HttpFetcher};
pub use ingest::{ingest, IngestReport};
pub use store::{Database, MatchStore, TeamStore};

/// One structural element of a results page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageNode {
    /// Day header shared by every row below it, e.g. `Mardi 03 août 2021`.
    Header(Option<String>),
    Row(RowCells),
}

/// Raw cell text of one result row. Any cell may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowCells {
    pub home_team_name: Option<String>,
    pub away_team_name: Option<String>,
    pub score: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub nodes: Vec<PageNode>,
    pub previous_page_url: Option<String>,
}

/// Site specific reading of a results page.
pub trait PageParser {
    fn parse(&self, html: &str) -> Result<ParsedPage, CrawlerError>;
}

/// A match as read from the results site, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub home_team_name: String,
    pub away_team_name: String,
    pub home_team_score: Option<u32>,
    pub away_team_score: Option<u32>,
    #[serde(serialize_with = "date::serialize_canonical_opt")]
    pub date: Option<DateTime<Utc>>,
}
