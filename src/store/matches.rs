use crate::{
    model::{DateFilter, Match, MatchFilter, NewMatch, Pagination},
    utils, Table,
};
use chrono::{Duration, TimeZone, Utc};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};

const COLUMNS: &str =
    "id, home_team_name, away_team_name, home_team_score, away_team_score, date, created_at";

pub struct MatchTable {
    name: String,
    pool: SqlitePool,
}

#[async_trait::async_trait]
impl Table for MatchTable {
    type Record = NewMatch;

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create(&self) -> Result<(), sqlx::Error> {
        if !utils::is_table_exists(self.get_pool(), &self.name).await? {
            // No unique index on (home, away, date): ingestion checks before inserting.
            let query = format!(
                r#"
                    CREATE TABLE {} (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        home_team_name TEXT NOT NULL,
                        away_team_name TEXT NOT NULL,
                        home_team_score INTEGER,
                        away_team_score INTEGER,
                        date DATETIME,
                        created_at DATETIME NOT NULL
                    )
                "#,
                &self.name
            );
            sqlx::query(query.as_str()).execute(self.get_pool()).await?;
        }
        Ok(())
    }

    async fn insert(&self, record: Self::Record) -> Result<i64, sqlx::Error> {
        let query = format!(
            r#"INSERT INTO {} (
                home_team_name,
                away_team_name,
                home_team_score,
                away_team_score,
                date,
                created_at) VALUES (?, ?, ?, ?, ?, ?)"#,
            self.name
        );
        let res = sqlx::query(&query)
            .bind(record.home_team_name)
            .bind(record.away_team_name)
            .bind(record.home_team_score)
            .bind(record.away_team_score)
            .bind(record.date)
            .bind(utils::get_now())
            .execute(self.get_pool())
            .await?;
        Ok(res.last_insert_rowid())
    }
}

impl MatchTable {
    pub(crate) fn new(name: &str, pool: SqlitePool) -> Self {
        Self {
            name: name.to_string(),
            pool,
        }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Match>, sqlx::Error> {
        let query = format!("SELECT {} FROM {} WHERE id = ?", COLUMNS, self.name);
        sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?
            .map(|row| from_row(&row))
            .transpose()
    }

    pub async fn select(
        &self,
        filter: &MatchFilter,
        pagination: Option<Pagination>,
    ) -> Result<Vec<Match>, sqlx::Error> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM {} WHERE 1 = 1", COLUMNS, self.name));

        if let Some(name) = &filter.home_team_name {
            query.push(" AND home_team_name = ").push_bind(name.clone());
        }
        if let Some(name) = &filter.away_team_name {
            query.push(" AND away_team_name = ").push_bind(name.clone());
        }
        if let Some(team) = &filter.team {
            query
                .push(" AND (home_team_name = ")
                .push_bind(team.clone())
                .push(" OR away_team_name = ")
                .push_bind(team.clone())
                .push(")");
        }
        match filter.date {
            // IS also matches NULL against NULL
            Some(DateFilter::At(date)) => {
                query.push(" AND date IS ").push_bind(date);
            }
            Some(DateFilter::Day(day)) => {
                let start = day.and_hms_opt(0, 0, 0).map(|d| Utc.from_utc_datetime(&d));
                let end = start.map(|d| d + Duration::days(1));
                query
                    .push(" AND date >= ")
                    .push_bind(start)
                    .push(" AND date < ")
                    .push_bind(end);
            }
            None => {}
        }

        query.push(" ORDER BY id");
        if let Some(pagination) = pagination {
            query
                .push(" LIMIT ")
                .push_bind(i64::from(pagination.size))
                .push(" OFFSET ")
                .push_bind(pagination.offset());
        }

        query
            .build()
            .fetch_all(self.get_pool())
            .await?
            .iter()
            .map(from_row)
            .collect()
    }

    /// Overwrites every field but the id. Returns whether the match existed.
    pub async fn replace(&self, id: i64, record: NewMatch) -> Result<bool, sqlx::Error> {
        let query = format!(
            r#"UPDATE {} SET
                home_team_name = ?,
                away_team_name = ?,
                home_team_score = ?,
                away_team_score = ?,
                date = ?
            WHERE id = ?"#,
            self.name
        );
        let res = sqlx::query(&query)
            .bind(record.home_team_name)
            .bind(record.away_team_name)
            .bind(record.home_team_score)
            .bind(record.away_team_score)
            .bind(record.date)
            .bind(id)
            .execute(self.get_pool())
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Keeps the oldest match of every (home team, away team, date) and
    /// deletes the others. Returns the number of deleted rows.
    pub async fn delete_duplicates(&self) -> Result<u64, sqlx::Error> {
        let query = format!(
            r#"DELETE FROM {0} WHERE id NOT IN (
                SELECT MIN(id) FROM {0} GROUP BY home_team_name, away_team_name, date
            )"#,
            self.name
        );
        let mut tx = self.get_pool().begin().await?;
        let res = sqlx::query(&query).execute(&mut tx).await?;
        tx.commit().await?;
        Ok(res.rows_affected())
    }
}

fn from_row(row: &SqliteRow) -> Result<Match, sqlx::Error> {
    Ok(Match {
        id: row.try_get("id")?,
        home_team_name: row.try_get("home_team_name")?,
        away_team_name: row.try_get("away_team_name")?,
        home_team_score: row.try_get("home_team_score")?,
        away_team_score: row.try_get("away_team_score")?,
        date: row.try_get("date")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{DateFilter, MatchFilter, MatchUpdate, NewMatch, Pagination},
        CrawlerError, Database, MatchStore, Table,
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn new_match(home: &str, away: &str, day: u32) -> NewMatch {
        NewMatch {
            home_team_name: home.to_string(),
            away_team_name: away.to_string(),
            home_team_score: Some(0),
            away_team_score: Some(1),
            date: Some(Utc.with_ymd_and_hms(2022, 3, day, 20, 0, 0).unwrap()),
        }
    }

    async fn seeded() -> Database {
        let db = Database::in_memory().await.expect("Open database");
        for (home, away, day) in [
            ("TOTO0", "Inter Milan", 8),
            ("TOTO1", "Inter Milan", 8),
            ("Inter Milan", "TOTO2", 9),
            ("TOTO3", "Liverpool", 9),
        ] {
            db.insert_one(new_match(home, away, day))
                .await
                .expect("Insert match");
        }
        db
    }

    fn names(matches: &[crate::model::Match]) -> Vec<&str> {
        matches.iter().map(|m| m.home_team_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_filters() {
        let db = seeded().await;

        let by_home = MatchFilter {
            home_team_name: Some("TOTO1".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&db.find_many(&by_home, None).await.unwrap()), vec!["TOTO1"]);

        let by_team = MatchFilter {
            team: Some("Inter Milan".to_string()),
            ..Default::default()
        };
        assert_eq!(
            names(&db.find_many(&by_team, None).await.unwrap()),
            vec!["TOTO0", "TOTO1", "Inter Milan"]
        );

        let by_day = MatchFilter {
            date: Some(DateFilter::Day(NaiveDate::from_ymd_opt(2022, 3, 9).unwrap())),
            ..Default::default()
        };
        assert_eq!(
            names(&db.find_many(&by_day, None).await.unwrap()),
            vec!["Inter Milan", "TOTO3"]
        );
    }

    #[tokio::test]
    async fn test_natural_key_lookup_matches_missing_dates() {
        let db = Database::in_memory().await.unwrap();
        let undated = NewMatch {
            date: None,
            home_team_score: None,
            away_team_score: None,
            ..new_match("Celtic", "Real Madrid", 1)
        };
        db.insert_one(undated).await.unwrap();

        let found = db
            .find_many(&MatchFilter::natural_key("Celtic", "Real Madrid", None), None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].home_team_score, None);
        assert_eq!(found[0].date, None);

        let dated = new_match("Celtic", "Real Madrid", 1).date;
        let found = db
            .find_many(&MatchFilter::natural_key("Celtic", "Real Madrid", dated), None)
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_pagination() {
        let db = seeded().await;
        let page = db
            .find_many(&MatchFilter::default(), Some(Pagination { page: 2, size: 3 }))
            .await
            .unwrap();
        assert_eq!(names(&page), vec!["TOTO3"]);
    }

    #[tokio::test]
    async fn test_update_reset_delete() {
        let db = seeded().await;

        let updated = db
            .update_by_id(
                1,
                MatchUpdate {
                    home_team_score: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.home_team_score, Some(3));
        assert_eq!(updated.away_team_score, Some(1));
        assert_eq!(updated.home_team_name, "TOTO0");

        let reset = db
            .reset_by_id(2, new_match("TEST1", "TEST2", 10))
            .await
            .unwrap();
        assert_eq!(reset.home_team_name, "TEST1");
        assert_eq!(reset.home_team_score, Some(0));

        db.delete_by_id(3).await.unwrap();
        assert!(matches!(
            db.find_by_id(3).await,
            Err(CrawlerError::NotFound { id: 3, .. })
        ));
        assert!(matches!(
            db.delete_by_id(3).await,
            Err(CrawlerError::NotFound { .. })
        ));
        assert_eq!(db.matches.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete_duplicates() {
        let db = seeded().await;
        db.insert_one(new_match("TOTO0", "Inter Milan", 8)).await.unwrap();
        db.insert_one(new_match("TOTO0", "Inter Milan", 8)).await.unwrap();

        assert_eq!(db.matches.delete_duplicates().await.unwrap(), 2);
        assert_eq!(db.matches.count().await.unwrap(), 4);
        assert!(db.matches.get(1).await.unwrap().is_some());
    }
}
