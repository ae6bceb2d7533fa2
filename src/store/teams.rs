use crate::{
    model::{NewTeam, Pagination, Team},
    utils, Table,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

pub struct TeamTable {
    name: String,
    pool: SqlitePool,
}

#[async_trait::async_trait]
impl Table for TeamTable {
    type Record = NewTeam;

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create(&self) -> Result<(), sqlx::Error> {
        if !utils::is_table_exists(self.get_pool(), &self.name).await? {
            let query = format!(
                r#"
                    CREATE TABLE {} (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        name TEXT NOT NULL,
                        country TEXT,
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
            "INSERT INTO {} (name, country, created_at) VALUES (?, ?, ?)",
            self.name
        );
        let res = sqlx::query(&query)
            .bind(record.name)
            .bind(record.country)
            .bind(utils::get_now())
            .execute(self.get_pool())
            .await?;
        Ok(res.last_insert_rowid())
    }
}

impl TeamTable {
    pub(crate) fn new(name: &str, pool: SqlitePool) -> Self {
        Self {
            name: name.to_string(),
            pool,
        }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Team>, sqlx::Error> {
        let query = format!(
            "SELECT id, name, country, created_at FROM {} WHERE id = ?",
            self.name
        );
        sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?
            .map(|row| from_row(&row))
            .transpose()
    }

    pub async fn select(&self, pagination: Pagination) -> Result<Vec<Team>, sqlx::Error> {
        let query = format!(
            "SELECT id, name, country, created_at FROM {} ORDER BY id LIMIT ? OFFSET ?",
            self.name
        );
        sqlx::query(&query)
            .bind(i64::from(pagination.size))
            .bind(pagination.offset())
            .fetch_all(self.get_pool())
            .await?
            .iter()
            .map(from_row)
            .collect()
    }

    pub async fn replace(&self, id: i64, record: NewTeam) -> Result<bool, sqlx::Error> {
        let query = format!("UPDATE {} SET name = ?, country = ? WHERE id = ?", self.name);
        let res = sqlx::query(&query)
            .bind(record.name)
            .bind(record.country)
            .bind(id)
            .execute(self.get_pool())
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

fn from_row(row: &SqliteRow) -> Result<Team, sqlx::Error> {
    Ok(Team {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        country: row.try_get("country")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{NewTeam, Pagination, TeamUpdate},
        CrawlerError, Database, TeamStore,
    };
    use pretty_assertions::assert_eq;

    fn team(name: &str) -> NewTeam {
        NewTeam {
            name: name.to_string(),
            country: Some("France".to_string()),
        }
    }

    #[tokio::test]
    async fn test_team_crud() {
        let db = Database::in_memory().await.unwrap();
        for name in ["PSG", "OM", "OL"] {
            db.insert_one(team(name)).await.unwrap();
        }

        let page = db.find_many(Pagination { page: 1, size: 2 }).await.unwrap();
        assert_eq!(
            page.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["PSG", "OM"]
        );

        let updated = db
            .update_by_id(
                2,
                TeamUpdate {
                    name: Some("Olympique de Marseille".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Olympique de Marseille");
        assert_eq!(updated.country.as_deref(), Some("France"));

        db.delete_by_id(1).await.unwrap();
        assert!(matches!(
            db.find_by_id(1).await,
            Err(CrawlerError::NotFound { resource: "team", .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_team_is_rejected() {
        let db = Database::in_memory().await.unwrap();
        assert!(matches!(
            db.insert_one(team("")).await,
            Err(CrawlerError::Validation { .. })
        ));
        assert!(matches!(
            db.reset_by_id(7, team("Lens")).await,
            Err(CrawlerError::NotFound { .. })
        ));
    }
}
