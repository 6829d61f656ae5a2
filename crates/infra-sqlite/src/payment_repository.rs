// SQLite PaymentRepository Implementation

use std::sync::Arc;

use async_trait::async_trait;
use salon_core::domain::{EntityId, Payment};
use salon_core::error::Result;
use salon_core::port::{CrudRepository, PaymentRepository};
use sqlx::{Connection, Sqlite, Transaction};
use tracing::warn;

use crate::error_map::map_sqlx_error;
use crate::pool::ConnectionPool;

pub struct SqlitePaymentRepository {
    pool: Arc<ConnectionPool>,
}

impl SqlitePaymentRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(
        tx: &mut Transaction<'_, Sqlite>,
        id: EntityId,
    ) -> sqlx::Result<Option<PaymentRow>> {
        sqlx::query_as::<_, PaymentRow>("SELECT * FROM payments WHERE pmt_id = ?")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    async fn list_matching(&self, column: &str, ids: &[EntityId]) -> Result<Vec<Payment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.acquire().await?;

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM payments WHERE {column} IN ({placeholders})");

        let mut query = sqlx::query_as::<_, PaymentRow>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        match query.fetch_all(&mut *conn).await {
            Ok(rows) => Ok(rows.into_iter().map(PaymentRow::into_payment).collect()),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), column, "payment multi-id lookup failed");
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl CrudRepository<Payment> for SqlitePaymentRepository {
    async fn list_all(&self) -> Result<Vec<Payment>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, PaymentRow>("SELECT * FROM payments")
            .fetch_all(&mut *conn)
            .await;

        match rows {
            Ok(rows) => Ok(rows.into_iter().map(PaymentRow::into_payment).collect()),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "payment list_all failed");
                Ok(Vec::new())
            }
        }
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Payment> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query_as::<_, PaymentRow>("SELECT * FROM payments WHERE pmt_id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await;

        match row {
            Ok(Some(row)) => Ok(row.into_payment()),
            Ok(None) => Ok(Payment::sentinel()),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), pmt_id = id, "payment lookup failed");
                Ok(Payment::sentinel())
            }
        }
    }

    async fn create(&self, candidate: Payment) -> Result<Payment> {
        let mut conn = self.pool.acquire().await?;

        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "payment create: begin failed");
                return Ok(Payment::sentinel());
            }
        };

        let inserted = sqlx::query(
            "INSERT INTO payments (work_id, pmt_amount, pmt_type) VALUES (?, ?, ?)",
        )
        .bind(candidate.work_id)
        .bind(candidate.amount)
        .bind(&candidate.kind)
        .execute(&mut *tx)
        .await;

        let assigned_id = match inserted {
            Ok(done) => done.last_insert_rowid(),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "payment insert failed, rolling back");
                let _ = tx.rollback().await;
                return Ok(Payment::sentinel());
            }
        };

        if let Err(e) = tx.commit().await {
            warn!(error = %map_sqlx_error(e), "payment create: commit failed");
            return Ok(Payment::sentinel());
        }

        Ok(Payment {
            id: assigned_id,
            ..candidate
        })
    }

    async fn update(&self, candidate: Payment) -> Result<Payment> {
        let mut conn = self.pool.acquire().await?;

        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "payment update: begin failed");
                return Ok(Payment::sentinel());
            }
        };

        match Self::fetch_by_id(&mut tx, candidate.id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                let _ = tx.rollback().await;
                return Ok(Payment::sentinel());
            }
            Err(e) => {
                warn!(error = %map_sqlx_error(e), pmt_id = candidate.id, "payment update: existence check failed");
                let _ = tx.rollback().await;
                return Ok(Payment::sentinel());
            }
        }

        let updated =
            sqlx::query("UPDATE payments SET work_id=?, pmt_amount=?, pmt_type=? WHERE pmt_id=?")
                .bind(candidate.work_id)
                .bind(candidate.amount)
                .bind(&candidate.kind)
                .bind(candidate.id)
                .execute(&mut *tx)
                .await;

        if let Err(e) = updated {
            warn!(error = %map_sqlx_error(e), pmt_id = candidate.id, "payment update failed, rolling back");
            let _ = tx.rollback().await;
            return Ok(Payment::sentinel());
        }

        if let Err(e) = tx.commit().await {
            warn!(error = %map_sqlx_error(e), "payment update: commit failed");
            return Ok(Payment::sentinel());
        }

        Ok(candidate)
    }

    async fn delete(&self, id: EntityId) -> Result<Payment> {
        let mut conn = self.pool.acquire().await?;

        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "payment delete: begin failed");
                return Ok(Payment::sentinel());
            }
        };

        let existing = match Self::fetch_by_id(&mut tx, id).await {
            Ok(Some(row)) => row.into_payment(),
            Ok(None) => {
                let _ = tx.rollback().await;
                return Ok(Payment::sentinel());
            }
            Err(e) => {
                warn!(error = %map_sqlx_error(e), pmt_id = id, "payment delete: existence check failed");
                let _ = tx.rollback().await;
                return Ok(Payment::sentinel());
            }
        };

        let deleted = sqlx::query("DELETE FROM payments WHERE pmt_id=?")
            .bind(id)
            .execute(&mut *tx)
            .await;

        if let Err(e) = deleted {
            warn!(error = %map_sqlx_error(e), pmt_id = id, "payment delete failed, rolling back");
            let _ = tx.rollback().await;
            return Ok(Payment::sentinel());
        }

        if let Err(e) = tx.commit().await {
            warn!(error = %map_sqlx_error(e), "payment delete: commit failed");
            return Ok(Payment::sentinel());
        }

        Ok(existing)
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn find_by_ids(&self, ids: &[EntityId]) -> Result<Vec<Payment>> {
        self.list_matching("pmt_id", ids).await
    }

    async fn find_by_work_ids(&self, work_ids: &[EntityId]) -> Result<Vec<Payment>> {
        self.list_matching("work_id", work_ids).await
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    pmt_id: i64,
    work_id: i64,
    pmt_amount: f64,
    pmt_type: String,
}

impl PaymentRow {
    fn into_payment(self) -> Payment {
        Payment {
            id: self.pmt_id,
            work_id: self.work_id,
            amount: self.pmt_amount,
            kind: self.pmt_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{run_migrations, StoreConfig};

    async fn setup_repo() -> SqlitePaymentRepository {
        let pool = Arc::new(
            ConnectionPool::open(&StoreConfig::in_memory())
                .await
                .unwrap(),
        );
        run_migrations(&pool).await.unwrap();
        SqlitePaymentRepository::new(pool)
    }

    #[tokio::test]
    async fn create_and_round_trip() {
        let repo = setup_repo().await;

        let created = repo
            .create(Payment::new(1, 110.0, "card").unwrap())
            .await
            .unwrap();
        assert!(created.id >= 0);

        let found = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn find_by_ids_returns_exact_matches() {
        let repo = setup_repo().await;

        let card = repo
            .create(Payment::new(1, 110.0, "card").unwrap())
            .await
            .unwrap();
        repo.create(Payment::new(1, 20.0, "cash").unwrap())
            .await
            .unwrap();

        let hits = repo.find_by_ids(&[card.id]).await.unwrap();
        assert_eq!(hits, vec![card]);
    }

    #[tokio::test]
    async fn find_by_work_ids_spans_payments() {
        let repo = setup_repo().await;

        repo.create(Payment::new(7, 50.0, "card").unwrap())
            .await
            .unwrap();
        repo.create(Payment::new(7, 60.0, "cash").unwrap())
            .await
            .unwrap();
        repo.create(Payment::new(8, 70.0, "card").unwrap())
            .await
            .unwrap();

        let hits = repo.find_by_work_ids(&[7]).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn delete_missing_payment_returns_sentinel() {
        let repo = setup_repo().await;
        assert!(repo.delete(123).await.unwrap().is_sentinel());
    }
}
