use sqlx::{Row, SqlitePool};

#[async_trait::async_trait]
pub trait Table {
    type Record: Send;

    fn get_name(&self) -> &str;
    fn get_pool(&self) -> &SqlitePool;

    async fn create(&self) -> Result<(), sqlx::Error>;
    /// Inserts a record and returns its new id.
    async fn insert(&self, record: Self::Record) -> Result<i64, sqlx::Error>;

    /// Returns whether a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let query = format!(r#"DELETE FROM {} WHERE id = ?"#, self.get_name());
        let res = sqlx::query(&query)
            .bind(id)
            .execute(self.get_pool())
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u32, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {}", self.get_name());
        Ok(sqlx::query(&query)
            .fetch_one(self.get_pool())
            .await?
            .try_get(0)?)
    }
}
