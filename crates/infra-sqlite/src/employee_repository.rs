// SQLite EmployeeRepository Implementation

use std::sync::Arc;

use async_trait::async_trait;
use salon_core::domain::{Employee, EntityId};
use salon_core::error::Result;
use salon_core::port::CrudRepository;
use sqlx::{Connection, Sqlite, Transaction};
use tracing::warn;

use crate::error_map::map_sqlx_error;
use crate::pool::ConnectionPool;

pub struct SqliteEmployeeRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteEmployeeRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(
        tx: &mut Transaction<'_, Sqlite>,
        id: EntityId,
    ) -> sqlx::Result<Option<EmployeeRow>> {
        sqlx::query_as::<_, EmployeeRow>("SELECT * FROM employees WHERE emp_id = ?")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}

#[async_trait]
impl CrudRepository<Employee> for SqliteEmployeeRepository {
    async fn list_all(&self) -> Result<Vec<Employee>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, EmployeeRow>("SELECT * FROM employees")
            .fetch_all(&mut *conn)
            .await;

        match rows {
            Ok(rows) => Ok(rows.into_iter().map(EmployeeRow::into_employee).collect()),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "employee list_all failed");
                Ok(Vec::new())
            }
        }
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Employee> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query_as::<_, EmployeeRow>("SELECT * FROM employees WHERE emp_id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await;

        match row {
            Ok(Some(row)) => Ok(row.into_employee()),
            Ok(None) => Ok(Employee::sentinel()),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), emp_id = id, "employee lookup failed");
                Ok(Employee::sentinel())
            }
        }
    }

    async fn create(&self, candidate: Employee) -> Result<Employee> {
        let mut conn = self.pool.acquire().await?;

        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "employee create: begin failed");
                return Ok(Employee::sentinel());
            }
        };

        let inserted = sqlx::query(
            "INSERT INTO employees \
             (emp_name, emp_phone, emp_ssn, emp_address, emp_work_percentage, emp_cash_percentage, emp_salary) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&candidate.name)
        .bind(&candidate.phone)
        .bind(&candidate.ssn)
        .bind(&candidate.address)
        .bind(candidate.work_percentage)
        .bind(candidate.cash_percentage)
        .bind(candidate.salary)
        .execute(&mut *tx)
        .await;

        // Id of the row just inserted on this connection; immune to
        // concurrent inserts on other pool connections.
        let assigned_id = match inserted {
            Ok(done) => done.last_insert_rowid(),
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "employee insert failed, rolling back");
                let _ = tx.rollback().await;
                return Ok(Employee::sentinel());
            }
        };

        if let Err(e) = tx.commit().await {
            warn!(error = %map_sqlx_error(e), "employee create: commit failed");
            return Ok(Employee::sentinel());
        }

        Ok(Employee {
            id: assigned_id,
            ..candidate
        })
    }

    async fn update(&self, candidate: Employee) -> Result<Employee> {
        let mut conn = self.pool.acquire().await?;

        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "employee update: begin failed");
                return Ok(Employee::sentinel());
            }
        };

        // Existence gate: the UPDATE never runs against a missing row.
        match Self::fetch_by_id(&mut tx, candidate.id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                let _ = tx.rollback().await;
                return Ok(Employee::sentinel());
            }
            Err(e) => {
                warn!(error = %map_sqlx_error(e), emp_id = candidate.id, "employee update: existence check failed");
                let _ = tx.rollback().await;
                return Ok(Employee::sentinel());
            }
        }

        let updated = sqlx::query(
            "UPDATE employees SET emp_name=?, emp_phone=?, emp_ssn=?, emp_address=?, \
             emp_work_percentage=?, emp_cash_percentage=?, emp_salary=? WHERE emp_id=?",
        )
        .bind(&candidate.name)
        .bind(&candidate.phone)
        .bind(&candidate.ssn)
        .bind(&candidate.address)
        .bind(candidate.work_percentage)
        .bind(candidate.cash_percentage)
        .bind(candidate.salary)
        .bind(candidate.id)
        .execute(&mut *tx)
        .await;

        if let Err(e) = updated {
            warn!(error = %map_sqlx_error(e), emp_id = candidate.id, "employee update failed, rolling back");
            let _ = tx.rollback().await;
            return Ok(Employee::sentinel());
        }

        if let Err(e) = tx.commit().await {
            warn!(error = %map_sqlx_error(e), "employee update: commit failed");
            return Ok(Employee::sentinel());
        }

        Ok(candidate)
    }

    async fn delete(&self, id: EntityId) -> Result<Employee> {
        let mut conn = self.pool.acquire().await?;

        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %map_sqlx_error(e), "employee delete: begin failed");
                return Ok(Employee::sentinel());
            }
        };

        let existing = match Self::fetch_by_id(&mut tx, id).await {
            Ok(Some(row)) => row.into_employee(),
            Ok(None) => {
                let _ = tx.rollback().await;
                return Ok(Employee::sentinel());
            }
            Err(e) => {
                warn!(error = %map_sqlx_error(e), emp_id = id, "employee delete: existence check failed");
                let _ = tx.rollback().await;
                return Ok(Employee::sentinel());
            }
        };

        let deleted = sqlx::query("DELETE FROM employees WHERE emp_id=?")
            .bind(id)
            .execute(&mut *tx)
            .await;

        if let Err(e) = deleted {
            warn!(error = %map_sqlx_error(e), emp_id = id, "employee delete failed, rolling back");
            let _ = tx.rollback().await;
            return Ok(Employee::sentinel());
        }

        if let Err(e) = tx.commit().await {
            warn!(error = %map_sqlx_error(e), "employee delete: commit failed");
            return Ok(Employee::sentinel());
        }

        // The record as it existed just before deletion.
        Ok(existing)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    emp_id: i64,
    emp_name: String,
    emp_phone: String,
    emp_ssn: String,
    emp_address: String,
    emp_work_percentage: i64,
    emp_cash_percentage: i64,
    emp_salary: i64,
}

impl EmployeeRow {
    fn into_employee(self) -> Employee {
        Employee {
            id: self.emp_id,
            name: self.emp_name,
            phone: self.emp_phone,
            ssn: self.emp_ssn,
            address: self.emp_address,
            work_percentage: self.emp_work_percentage,
            cash_percentage: self.emp_cash_percentage,
            salary: self.emp_salary,
        }
    }
}
