mod matches;
mod teams;

pub use matches::MatchTable;
pub use teams::TeamTable;

use crate::{
    model::{Match, MatchFilter, MatchUpdate, NewMatch, NewTeam, Pagination, Team, TeamUpdate},
    utils, CrawlerError, Table,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;

/// Record store for matches. The crawler only needs `find_many` and
/// `insert_one`, the rest backs the `matches` commands.
///
/// `insert_one` stores scraped records as they come; callers creating matches
/// by hand validate first. Updates and resets are validated here.
#[async_trait::async_trait]
pub trait MatchStore: Send + Sync {
    async fn find_many(
        &self,
        filter: &MatchFilter,
        pagination: Option<Pagination>,
    ) -> Result<Vec<Match>, CrawlerError>;
    async fn insert_one(&self, record: NewMatch) -> Result<Match, CrawlerError>;
    async fn find_by_id(&self, id: i64) -> Result<Match, CrawlerError>;
    async fn update_by_id(&self, id: i64, update: MatchUpdate) -> Result<Match, CrawlerError>;
    async fn reset_by_id(&self, id: i64, record: NewMatch) -> Result<Match, CrawlerError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), CrawlerError>;
}

#[async_trait::async_trait]
pub trait TeamStore: Send + Sync {
    async fn find_many(&self, pagination: Pagination) -> Result<Vec<Team>, CrawlerError>;
    async fn insert_one(&self, record: NewTeam) -> Result<Team, CrawlerError>;
    async fn find_by_id(&self, id: i64) -> Result<Team, CrawlerError>;
    async fn update_by_id(&self, id: i64, update: TeamUpdate) -> Result<Team, CrawlerError>;
    async fn reset_by_id(&self, id: i64, record: NewTeam) -> Result<Team, CrawlerError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), CrawlerError>;
}

pub struct Database {
    pub matches: MatchTable,
    pub teams: TeamTable,
    pool: SqlitePool,
}

impl Database {
    pub async fn new(path: &str) -> Result<Database, CrawlerError> {
        let opt = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opt).await?;
        Self::with_pool(pool).await
    }

    /// Private database living as long as the returned value.
    pub async fn in_memory() -> Result<Database, CrawlerError> {
        let opt = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Database, CrawlerError> {
        let db = Database {
            matches: MatchTable::new("matches", pool.clone()),
            teams: TeamTable::new("teams", pool.clone()),
            pool,
        };

        if !utils::is_table_exists(&db.pool, db.matches.get_name()).await? {
            tracing::debug!("Create table {}", db.matches.get_name());
            db.matches.create().await?;
        } else {
            tracing::debug!("Use table {}", db.matches.get_name());
        }
        if !utils::is_table_exists(&db.pool, db.teams.get_name()).await? {
            tracing::debug!("Create table {}", db.teams.get_name());
            db.teams.create().await?;
        } else {
            tracing::debug!("Use table {}", db.teams.get_name());
        }

        Ok(db)
    }
}

#[async_trait::async_trait]
impl MatchStore for Database {
    async fn find_many(
        &self,
        filter: &MatchFilter,
        pagination: Option<Pagination>,
    ) -> Result<Vec<Match>, CrawlerError> {
        Ok(self.matches.select(filter, pagination).await?)
    }

    async fn insert_one(&self, record: NewMatch) -> Result<Match, CrawlerError> {
        let id = self.matches.insert(record).await?;
        MatchStore::find_by_id(self, id).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Match, CrawlerError> {
        self.matches
            .get(id)
            .await?
            .ok_or(CrawlerError::NotFound {
                resource: "match",
                id,
            })
    }

    async fn update_by_id(&self, id: i64, update: MatchUpdate) -> Result<Match, CrawlerError> {
        update.validate()?;
        let mut current = MatchStore::find_by_id(self, id).await?;
        update.apply(&mut current);
        let record = NewMatch {
            home_team_name: current.home_team_name,
            away_team_name: current.away_team_name,
            home_team_score: current.home_team_score,
            away_team_score: current.away_team_score,
            date: current.date,
        };
        self.matches.replace(id, record).await?;
        MatchStore::find_by_id(self, id).await
    }

    async fn reset_by_id(&self, id: i64, record: NewMatch) -> Result<Match, CrawlerError> {
        record.validate()?;
        if !self.matches.replace(id, record).await? {
            return Err(CrawlerError::NotFound {
                resource: "match",
                id,
            });
        }
        MatchStore::find_by_id(self, id).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), CrawlerError> {
        if self.matches.delete(id).await? {
            Ok(())
        } else {
            Err(CrawlerError::NotFound {
                resource: "match",
                id,
            })
        }
    }
}

#[async_trait::async_trait]
impl TeamStore for Database {
    async fn find_many(&self, pagination: Pagination) -> Result<Vec<Team>, CrawlerError> {
        Ok(self.teams.select(pagination).await?)
    }

    async fn insert_one(&self, record: NewTeam) -> Result<Team, CrawlerError> {
        record.validate()?;
        let id = self.teams.insert(record).await?;
        TeamStore::find_by_id(self, id).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Team, CrawlerError> {
        self.teams.get(id).await?.ok_or(CrawlerError::NotFound {
            resource: "team",
            id,
        })
    }

    async fn update_by_id(&self, id: i64, update: TeamUpdate) -> Result<Team, CrawlerError> {
        update.validate()?;
        let mut current = TeamStore::find_by_id(self, id).await?;
        update.apply(&mut current);
        let record = NewTeam {
            name: current.name,
            country: current.country,
        };
        self.teams.replace(id, record).await?;
        TeamStore::find_by_id(self, id).await
    }

    async fn reset_by_id(&self, id: i64, record: NewTeam) -> Result<Team, CrawlerError> {
        record.validate()?;
        if !self.teams.replace(id, record).await? {
            return Err(CrawlerError::NotFound { resource: "team", id });
        }
        TeamStore::find_by_id(self, id).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), CrawlerError> {
        if self.teams.delete(id).await? {
            Ok(())
        } else {
            Err(CrawlerError::NotFound { resource: "team", id })
        }
    }
}
