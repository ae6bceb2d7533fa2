//! Adapter for the results tables of matchendirect.fr.

mod parser;

pub use parser::MatchEnDirectParser;

pub const ORIGIN: &str = "https://www.matchendirect.fr";

/// Most recent Champions League round; older rounds are reached through the
/// "previous" link of each page.
pub const START_URL: &str = "https://www.matchendirect.fr/europe/ligue-des-champions-uefa/2022-15/";
