// SQLite DetailRepository Implementation

use std::sync::Arc;

use async_trait::async_trait;
use salon_core::domain::{Detail, EntityId};
use salon_core::error::Result;
use salon_core::port::{CrudRepository, DetailRepository};
use sqlx::{Connection, Sqlite, Transaction};
use tracing::warn;

use crate::error_map::map_sqlx_error;
use crate::pool::ConnectionPool;

pub struct SqliteDetailRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteDetailRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(
        tx: &mut Transaction<'_, Sqlite>,
        id: EntityId,
    ) -> sqlx::Result<Option<DetailRow>> {
        sqlx::query_as::<_, DetailRow>("SELECT * FROM emp_work_detail WHERE detail_id = ?")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}

#[async_trait]
impl CrudRepository<Detail> for SqliteDetailRepository {
    async fn list_all(&self) -> Result<Vec<Detail>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, DetailRow>("SELECT * FROM emp_work_detail")
            .fetch_all(&mut *conn)
            .await;

        match rows {
            Ok(rows) => Ok(rows.into_iter().map(DetailRow::into_detail).collect()),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "detail list_all failed");
                Ok(Vec::new())
            }
        }
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Detail> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query_as::<_, DetailRow>("SELECT * FROM emp_work_detail WHERE detail_id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await;

        match row {
            Ok(Some(row)) => Ok(row.into_detail()),
            Ok(None) => Ok(Detail::sentinel()),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), detail_id = id, "detail lookup failed");
                Ok(Detail::sentinel())
            }
        }
    }

    async fn create(&self, candidate: Detail) -> Result<Detail> {
        let mut conn = self.pool.acquire().await?;

        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "detail create: begin failed");
                return Ok(Detail::sentinel());
            }
        };

        let inserted = sqlx::query(
            "INSERT INTO emp_work_detail \
             (work_id, emp_id, emp_amount, emp_tip, detail_notes) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(candidate.work_id)
        .bind(candidate.employee_id)
        .bind(candidate.employee_amount)
        .bind(candidate.employee_tip)
        .bind(&candidate.notes)
        .execute(&mut *tx)
        .await;

        let assigned_id = match inserted {
            Ok(done) => done.last_insert_rowid(),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "detail insert failed, rolling back");
                let _ = tx.rollback().await;
                return Ok(Detail::sentinel());
            }
        };

        if let Err(e) = tx.commit().await {
            warn!(error = %map_sqlx_error(e), "detail create: commit failed");
            return Ok(Detail::sentinel());
        }

        Ok(Detail {
            id: assigned_id,
            ..candidate
        })
    }

    async fn update(&self, candidate: Detail) -> Result<Detail> {
        let mut conn = self.pool.acquire().await?;

        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "detail update: begin failed");
                return Ok(Detail::sentinel());
            }
        };

        match Self::fetch_by_id(&mut tx, candidate.id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                let _ = tx.rollback().await;
                return Ok(Detail::sentinel());
            }
            Err(e) => {
                warn!(error = %map_sqlx_error(e), detail_id = candidate.id, "detail update: existence check failed");
                let _ = tx.rollback().await;
                return Ok(Detail::sentinel());
            }
        }

        let updated = sqlx::query(
            "UPDATE emp_work_detail SET work_id=?, emp_id=?, emp_amount=?, emp_tip=?, \
             detail_notes=? WHERE detail_id=?",
        )
        .bind(candidate.work_id)
        .bind(candidate.employee_id)
        .bind(candidate.employee_amount)
        .bind(candidate.employee_tip)
        .bind(&candidate.notes)
        .bind(candidate.id)
        .execute(&mut *tx)
        .await;

        if let Err(e) = updated {
            warn!(error = %map_sqlx_error(e), detail_id = candidate.id, "detail update failed, rolling back");
            let _ = tx.rollback().await;
            return Ok(Detail::sentinel());
        }

        if let Err(e) = tx.commit().await {
            warn!(error = %map_sqlx_error(e), "detail update: commit failed");
            return Ok(Detail::sentinel());
        }

        Ok(candidate)
    }

    async fn delete(&self, id: EntityId) -> Result<Detail> {
        let mut conn = self.pool.acquire().await?;

        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "detail delete: begin failed");
                return Ok(Detail::sentinel());
            }
        };

        let existing = match Self::fetch_by_id(&mut tx, id).await {
            Ok(Some(row)) => row.into_detail(),
            Ok(None) => {
                let _ = tx.rollback().await;
                return Ok(Detail::sentinel());
            }
            Err(e) => {
                warn!(error = %map_sqlx_error(e), detail_id = id, "detail delete: existence check failed");
                let _ = tx.rollback().await;
                return Ok(Detail::sentinel());
            }
        };

        let deleted = sqlx::query("DELETE FROM emp_work_detail WHERE detail_id=?")
            .bind(id)
            .execute(&mut *tx)
            .await;

        if let Err(e) = deleted {
            warn!(error = %map_sqlx_error(e), detail_id = id, "detail delete failed, rolling back");
            let _ = tx.rollback().await;
            return Ok(Detail::sentinel());
        }

        if let Err(e) = tx.commit().await {
            warn!(error = %map_sqlx_error(e), "detail delete: commit failed");
            return Ok(Detail::sentinel());
        }

        Ok(existing)
    }
}

#[async_trait]
impl DetailRepository for SqliteDetailRepository {
    async fn find_by_work_ids(&self, work_ids: &[EntityId]) -> Result<Vec<Detail>> {
        if work_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.acquire().await?;

        // One bound parameter per id; duplicates collapse to one row.
        let placeholders = vec!["?"; work_ids.len()].join(", ");
        let sql = format!("SELECT * FROM emp_work_detail WHERE work_id IN ({placeholders})");

        let mut query = sqlx::query_as::<_, DetailRow>(&sql);
        for id in work_ids {
            query = query.bind(id);
        }

        match query.fetch_all(&mut *conn).await {
            Ok(rows) => Ok(rows.into_iter().map(DetailRow::into_detail).collect()),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "detail lookup by work ids failed");
                Ok(Vec::new())
            }
        }
    }

    async fn find_by_employee_and_work_ids(
        &self,
        employee_id: EntityId,
        work_ids: &[EntityId],
    ) -> Result<Vec<Detail>> {
        if work_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.acquire().await?;

        let placeholders = vec!["?"; work_ids.len()].join(", ");
        let sql = format!(
            "SELECT * FROM emp_work_detail WHERE emp_id = ? AND work_id IN ({placeholders})"
        );

        let mut query = sqlx::query_as::<_, DetailRow>(&sql).bind(employee_id);
        for id in work_ids {
            query = query.bind(id);
        }

        match query.fetch_all(&mut *conn).await {
            Ok(rows) => Ok(rows.into_iter().map(DetailRow::into_detail).collect()),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), emp_id = employee_id, "detail lookup by employee and work ids failed");
                Ok(Vec::new())
            }
        }
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct DetailRow {
    detail_id: i64,
    work_id: i64,
    emp_id: i64,
    emp_amount: f64,
    emp_tip: f64,
    detail_notes: String,
}

impl DetailRow {
    fn into_detail(self) -> Detail {
        Detail {
            id: self.detail_id,
            work_id: self.work_id,
            employee_id: self.emp_id,
            employee_amount: self.emp_amount,
            employee_tip: self.emp_tip,
            notes: self.detail_notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{run_migrations, StoreConfig};

    async fn setup_repo() -> SqliteDetailRepository {
        let pool = Arc::new(
            ConnectionPool::open(&StoreConfig::in_memory())
                .await
                .unwrap(),
        );
        run_migrations(&pool).await.unwrap();
        SqliteDetailRepository::new(pool)
    }

    #[tokio::test]
    async fn create_and_round_trip() {
        let repo = setup_repo().await;

        let detail = Detail::new(1, 2, 55.0, 5.0, "half share").unwrap();
        let created = repo.create(detail).await.unwrap();
        assert!(created.id >= 0);

        let found = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn lookup_by_work_ids_collapses_duplicates() {
        let repo = setup_repo().await;

        let a = repo
            .create(Detail::new(10, 1, 50.0, 0.0, "").unwrap())
            .await
            .unwrap();
        let b = repo
            .create(Detail::new(11, 1, 60.0, 0.0, "").unwrap())
            .await
            .unwrap();
        repo.create(Detail::new(12, 2, 70.0, 0.0, "").unwrap())
            .await
            .unwrap();

        // Duplicate work id in the input must not duplicate the row.
        let hits = repo.find_by_work_ids(&[10, 10, 11]).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.contains(&a));
        assert!(hits.contains(&b));
    }

    #[tokio::test]
    async fn empty_id_set_short_circuits() {
        let repo = setup_repo().await;
        assert!(repo.find_by_work_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lookup_by_employee_intersects_work_set() {
        let repo = setup_repo().await;

        let ana_mon = repo
            .create(Detail::new(10, 1, 50.0, 0.0, "").unwrap())
            .await
            .unwrap();
        repo.create(Detail::new(10, 2, 50.0, 0.0, "").unwrap())
            .await
            .unwrap();
        repo.create(Detail::new(99, 1, 80.0, 0.0, "").unwrap())
            .await
            .unwrap();

        let hits = repo
            .find_by_employee_and_work_ids(1, &[10, 11])
            .await
            .unwrap();
        assert_eq!(hits, vec![ana_mon]);
    }

    #[tokio::test]
    async fn update_missing_detail_returns_sentinel() {
        let repo = setup_repo().await;

        let mut ghost = Detail::new(1, 1, 10.0, 0.0, "").unwrap();
        ghost.id = 500;
        assert!(repo.update(ghost).await.unwrap().is_sentinel());
    }
}
