// SQLite WorkRepository Implementation

use std::sync::Arc;

use async_trait::async_trait;
use salon_core::domain::{EntityId, Work};
use salon_core::error::Result;
use salon_core::port::{CrudRepository, WorkRepository};
use sqlx::{Connection, Sqlite, Transaction};
use tracing::warn;

use crate::error_map::map_sqlx_error;
use crate::pool::ConnectionPool;

pub struct SqliteWorkRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteWorkRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(
        tx: &mut Transaction<'_, Sqlite>,
        id: EntityId,
    ) -> sqlx::Result<Option<WorkRow>> {
        sqlx::query_as::<_, WorkRow>("SELECT * FROM works WHERE work_id = ?")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}

#[async_trait]
impl CrudRepository<Work> for SqliteWorkRepository {
    async fn list_all(&self) -> Result<Vec<Work>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, WorkRow>("SELECT * FROM works")
            .fetch_all(&mut *conn)
            .await;

        match rows {
            Ok(rows) => Ok(rows.into_iter().map(WorkRow::into_work).collect()),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "work list_all failed");
                Ok(Vec::new())
            }
        }
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Work> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query_as::<_, WorkRow>("SELECT * FROM works WHERE work_id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await;

        match row {
            Ok(Some(row)) => Ok(row.into_work()),
            Ok(None) => Ok(Work::sentinel()),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), work_id = id, "work lookup failed");
                Ok(Work::sentinel())
            }
        }
    }

    async fn create(&self, candidate: Work) -> Result<Work> {
        let mut conn = self.pool.acquire().await?;

        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "work create: begin failed");
                return Ok(Work::sentinel());
            }
        };

        let inserted = sqlx::query(
            "INSERT INTO works \
             (work_datetime, work_amount, work_tip, work_discount, work_grandtotal, work_notes) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&candidate.datetime)
        .bind(candidate.amount)
        .bind(candidate.tip)
        .bind(candidate.discount)
        .bind(candidate.grand_total)
        .bind(&candidate.notes)
        .execute(&mut *tx)
        .await;

        let assigned_id = match inserted {
            Ok(done) => done.last_insert_rowid(),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "work insert failed, rolling back");
                let _ = tx.rollback().await;
                return Ok(Work::sentinel());
            }
        };

        if let Err(e) = tx.commit().await {
            warn!(error = %map_sqlx_error(e), "work create: commit failed");
            return Ok(Work::sentinel());
        }

        Ok(Work {
            id: assigned_id,
            ..candidate
        })
    }

    async fn update(&self, candidate: Work) -> Result<Work> {
        let mut conn = self.pool.acquire().await?;

        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "work update: begin failed");
                return Ok(Work::sentinel());
            }
        };

        match Self::fetch_by_id(&mut tx, candidate.id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                let _ = tx.rollback().await;
                return Ok(Work::sentinel());
            }
            Err(e) => {
                warn!(error = %map_sqlx_error(e), work_id = candidate.id, "work update: existence check failed");
                let _ = tx.rollback().await;
                return Ok(Work::sentinel());
            }
        }

        let updated = sqlx::query(
            "UPDATE works SET work_datetime=?, work_amount=?, work_tip=?, work_discount=?, \
             work_grandtotal=?, work_notes=? WHERE work_id=?",
        )
        .bind(&candidate.datetime)
        .bind(candidate.amount)
        .bind(candidate.tip)
        .bind(candidate.discount)
        .bind(candidate.grand_total)
        .bind(&candidate.notes)
        .bind(candidate.id)
        .execute(&mut *tx)
        .await;

        if let Err(e) = updated {
            warn!(error = %map_sqlx_error(e), work_id = candidate.id, "work update failed, rolling back");
            let _ = tx.rollback().await;
            return Ok(Work::sentinel());
        }

        if let Err(e) = tx.commit().await {
            warn!(error = %map_sqlx_error(e), "work update: commit failed");
            return Ok(Work::sentinel());
        }

        Ok(candidate)
    }

    async fn delete(&self, id: EntityId) -> Result<Work> {
        let mut conn = self.pool.acquire().await?;

        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "work delete: begin failed");
                return Ok(Work::sentinel());
            }
        };

        let existing = match Self::fetch_by_id(&mut tx, id).await {
            Ok(Some(row)) => row.into_work(),
            Ok(None) => {
                let _ = tx.rollback().await;
                return Ok(Work::sentinel());
            }
            Err(e) => {
                warn!(error = %map_sqlx_error(e), work_id = id, "work delete: existence check failed");
                let _ = tx.rollback().await;
                return Ok(Work::sentinel());
            }
        };

        let deleted = sqlx::query("DELETE FROM works WHERE work_id=?")
            .bind(id)
            .execute(&mut *tx)
            .await;

        if let Err(e) = deleted {
            warn!(error = %map_sqlx_error(e), work_id = id, "work delete failed, rolling back");
            let _ = tx.rollback().await;
            return Ok(Work::sentinel());
        }

        if let Err(e) = tx.commit().await {
            warn!(error = %map_sqlx_error(e), "work delete: commit failed");
            return Ok(Work::sentinel());
        }

        Ok(existing)
    }
}

#[async_trait]
impl WorkRepository for SqliteWorkRepository {
    async fn list_between(&self, from: &str, to: &str) -> Result<Vec<Work>> {
        let mut conn = self.pool.acquire().await?;

        // Datetimes are ISO-8601 TEXT, so BETWEEN compares lexicographically.
        let rows =
            sqlx::query_as::<_, WorkRow>("SELECT * FROM works WHERE work_datetime BETWEEN ? AND ?")
                .bind(from)
                .bind(to)
                .fetch_all(&mut *conn)
                .await;

        match rows {
            Ok(rows) => Ok(rows.into_iter().map(WorkRow::into_work).collect()),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), from, to, "work range lookup failed");
                Ok(Vec::new())
            }
        }
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct WorkRow {
    work_id: i64,
    work_datetime: String,
    work_amount: f64,
    work_tip: f64,
    work_discount: f64,
    work_grandtotal: f64,
    work_notes: String,
}

impl WorkRow {
    fn into_work(self) -> Work {
        Work {
            id: self.work_id,
            datetime: self.work_datetime,
            amount: self.work_amount,
            tip: self.work_tip,
            discount: self.work_discount,
            grand_total: self.work_grandtotal,
            notes: self.work_notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{run_migrations, StoreConfig};

    async fn setup_repo() -> SqliteWorkRepository {
        let pool = Arc::new(
            ConnectionPool::open(&StoreConfig::in_memory())
                .await
                .unwrap(),
        );
        run_migrations(&pool).await.unwrap();
        SqliteWorkRepository::new(pool)
    }

    fn sample_work(datetime: &str) -> Work {
        Work::new(datetime, 100.0, 10.0, 0.0, 110.0, "gel set").unwrap()
    }

    #[tokio::test]
    async fn create_and_round_trip() {
        let repo = setup_repo().await;

        let created = repo.create(sample_work("2024-01-01")).await.unwrap();
        assert!(created.id >= 0);

        let found = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn list_between_is_inclusive() {
        let repo = setup_repo().await;
        for dt in ["2023-12-31", "2024-01-01", "2024-01-02", "2024-01-03"] {
            repo.create(sample_work(dt)).await.unwrap();
        }

        let hits = repo.list_between("2024-01-01", "2024-01-02").await.unwrap();
        let dates: Vec<_> = hits.iter().map(|w| w.datetime.as_str()).collect();
        assert_eq!(dates, ["2024-01-01", "2024-01-02"]);
    }

    #[tokio::test]
    async fn update_missing_work_returns_sentinel() {
        let repo = setup_repo().await;

        let mut ghost = sample_work("2024-01-01");
        ghost.id = 31337;
        assert!(repo.update(ghost).await.unwrap().is_sentinel());
    }

    #[tokio::test]
    async fn delete_returns_pre_delete_record() {
        let repo = setup_repo().await;
        let created = repo.create(sample_work("2024-01-01")).await.unwrap();

        let removed = repo.delete(created.id).await.unwrap();
        assert_eq!(removed, created);
        assert!(repo.find_by_id(created.id).await.unwrap().is_sentinel());
    }
}
