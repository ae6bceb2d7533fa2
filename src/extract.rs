use crate::{DateNormalizer, MatchCandidate, PageNode, RowCells};
use itertools::Itertools;
use tracing::warn;

/// Turns page nodes into match candidates.
///
/// The last header seen is kept between calls, so a page that starts with
/// rows reuses the day of the page visited before it.
#[derive(Debug, Clone, Default)]
pub struct MatchRecordExtractor {
    normalizer: DateNormalizer,
    current_header: Option<String>,
}

impl MatchRecordExtractor {
    pub fn new(normalizer: DateNormalizer) -> Self {
        Self {
            normalizer,
            current_header: None,
        }
    }

    #[cfg(test)]
    fn with_header(mut self, header: Option<String>) -> Self {
        self.current_header = header;
        self
    }

    #[cfg(test)]
    fn current_header(&self) -> Option<&str> {
        self.current_header.as_deref()
    }

    pub fn extract<I>(&mut self, nodes: I) -> Vec<MatchCandidate>
    where
        I: IntoIterator<Item = PageNode>,
    {
        let mut candidates = vec![];
        for node in nodes {
            match node {
                PageNode::Header(Some(header)) => self.current_header = Some(header),
                PageNode::Header(None) => {}
                PageNode::Row(cells) => candidates.push(self.candidate(cells)),
            }
        }
        candidates
    }

    fn candidate(&self, cells: RowCells) -> MatchCandidate {
        let (home_team_score, away_team_score) = cells
            .score
            .as_deref()
            .map(parse_score)
            .unwrap_or((None, None));

        let time = cells.time.unwrap_or_default();
        let date = match self.current_header.as_deref() {
            Some(header) => match self.normalizer.normalize(header, &time) {
                Ok(date) => Some(date),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            },
            None => {
                warn!("Row before any day header, kickoff {:?}", time);
                None
            }
        };

        MatchCandidate {
            home_team_name: cells.home_team_name.unwrap_or_default(),
            away_team_name: cells.away_team_name.unwrap_or_default(),
            home_team_score,
            away_team_score,
            date,
        }
    }
}

/// Splits `2 - 1` into both sides. A side that is not a number is `None`.
pub fn parse_score(text: &str) -> (Option<u32>, Option<u32>) {
    let mut sides = text.split(" - ").map(|s| s.trim().parse::<u32>().ok());
    match sides.next_tuple() {
        Some((home, away)) => (home, away),
        None => (None, None),
    }
}
