use crate::{model::MatchFilter, MatchCandidate, MatchStore};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    /// Already stored under the same home team, away team and date.
    pub skipped: usize,
    pub failed: usize,
}

/// Stores the candidates whose (home team, away team, date) is not known yet.
///
/// Every candidate is looked up and inserted on its own; a store error is
/// logged and counted, the remaining candidates are still processed.
#[tracing::instrument(level = "debug", skip_all, fields(candidates = candidates.len()))]
pub async fn ingest<S>(store: &S, candidates: &[MatchCandidate]) -> IngestReport
where
    S: MatchStore + ?Sized,
{
    let mut report = IngestReport::default();
    for candidate in candidates {
        let key = MatchFilter::natural_key(
            &candidate.home_team_name,
            &candidate.away_team_name,
            candidate.date,
        );
        let existing = match store.find_many(&key, None).await {
            Ok(existing) => existing,
            Err(e) => {
                error!("Lookup of {:?} failed: {}", candidate, e);
                report.failed += 1;
                continue;
            }
        };

        if !existing.is_empty() {
            debug!(
                "Skip {} - {} ({:?})",
                candidate.home_team_name, candidate.away_team_name, candidate.date
            );
            report.skipped += 1;
            continue;
        }

        match store.insert_one(candidate.clone().into()).await {
            Ok(m) => {
                info!(
                    "[{}] Insert {} - {}",
                    m.id, m.home_team_name, m.away_team_name
                );
                report.inserted += 1;
            }
            Err(e) => {
                error!("Insert of {:?} failed: {}", candidate, e);
                report.failed += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::NewMatch, Database, Table};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn candidate(home: &str, away: &str, hour: u32) -> MatchCandidate {
        MatchCandidate {
            home_team_name: home.to_string(),
            away_team_name: away.to_string(),
            home_team_score: Some(1),
            away_team_score: Some(2),
            date: Some(Utc.with_ymd_and_hms(2021, 11, 24, hour, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_known_natural_key_is_not_inserted() {
        let db = Database::in_memory().await.unwrap();
        db.insert_one(NewMatch::from(candidate("Equipe 1", "Equipe 2", 20)))
            .await
            .unwrap();

        let report = ingest(&db, &[candidate("Equipe 1", "Equipe 2", 20)]).await;
        assert_eq!(
            report,
            IngestReport {
                inserted: 0,
                skipped: 1,
                failed: 0
            }
        );

        let report = ingest(&db, &[candidate("Equipe 3", "Equipe 4", 20)]).await;
        assert_eq!(report.inserted, 1);
        assert_eq!(db.matches.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_same_teams_other_date_is_inserted() {
        let db = Database::in_memory().await.unwrap();
        let report = ingest(
            &db,
            &[
                candidate("Equipe 1", "Equipe 2", 18),
                candidate("Equipe 1", "Equipe 2", 21),
                candidate("Equipe 2", "Equipe 1", 21),
            ],
        )
        .await;
        assert_eq!(report.inserted, 3);
    }

    #[tokio::test]
    async fn test_ingest_twice_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        let undated = MatchCandidate {
            home_team_score: None,
            away_team_score: None,
            date: None,
            ..candidate("Club Bruges", "Bayer Leverkusen", 21)
        };
        let candidates = vec![
            candidate("Equipe 1", "Equipe 2", 20),
            candidate("Equipe 3", "Equipe 4", 20),
            undated,
        ];

        let first = ingest(&db, &candidates).await;
        let second = ingest(&db, &candidates).await;

        assert_eq!(first.inserted, 3);
        assert_eq!(
            second,
            IngestReport {
                inserted: 0,
                skipped: 3,
                failed: 0
            }
        );
        assert_eq!(db.matches.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicates_within_one_batch_are_inserted_once() {
        let db = Database::in_memory().await.unwrap();
        let c = candidate("Equipe 1", "Equipe 2", 20);
        let report = ingest(&db, &[c.clone(), c]).await;
        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped, 1);
    }
}
