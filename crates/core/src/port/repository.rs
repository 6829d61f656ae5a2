// Repository Ports (Interfaces)

use crate::domain::{Detail, EntityId, Payment, Work};
use crate::error::Result;
use async_trait::async_trait;

/// Uniform CRUD surface shared by all four entity repositories.
///
/// Every operation is total from the caller's point of view: a missing row
/// or a failed mutation is reported as the entity's sentinel record
/// (identifier `-1`), not as an error. The only `Err` a caller can see is
/// `AppError::PoolExhausted` when no connection becomes available in time.
/// Callers MUST check `is_sentinel()` on the returned record before
/// treating the operation as successful.
#[async_trait]
pub trait CrudRepository<E>: Send + Sync {
    /// All rows, in storage (rowid) order. No pagination.
    async fn list_all(&self) -> Result<Vec<E>>;

    /// The matching row, or the sentinel record if none exists.
    async fn find_by_id(&self, id: EntityId) -> Result<E>;

    /// Insert `candidate` (its id is ignored) and return it with the
    /// store-assigned id filled in. Sentinel on statement failure.
    async fn create(&self, candidate: E) -> Result<E>;

    /// Update the row with `candidate.id`. The existence check and the
    /// update run under one transaction; if the row is absent the update
    /// statement never executes and the sentinel is returned.
    async fn update(&self, candidate: E) -> Result<E>;

    /// Delete the row with `id`, returning the record as it existed just
    /// before deletion. Sentinel if the row was absent.
    async fn delete(&self, id: EntityId) -> Result<E>;
}

/// Work-specific lookups.
#[async_trait]
pub trait WorkRepository: CrudRepository<Work> {
    /// Works whose datetime falls in the inclusive `[from, to]` range,
    /// in storage order.
    async fn list_between(&self, from: &str, to: &str) -> Result<Vec<Work>>;
}

/// Detail-specific lookups.
#[async_trait]
pub trait DetailRepository: CrudRepository<Detail> {
    /// Details whose work id matches any of `work_ids`. Duplicate ids in
    /// the input collapse to their single matching row; an empty input
    /// yields an empty result without touching the store.
    async fn find_by_work_ids(&self, work_ids: &[EntityId]) -> Result<Vec<Detail>>;

    /// Details for one employee restricted to a set of works.
    async fn find_by_employee_and_work_ids(
        &self,
        employee_id: EntityId,
        work_ids: &[EntityId],
    ) -> Result<Vec<Detail>>;
}

/// Payment-specific lookups.
#[async_trait]
pub trait PaymentRepository: CrudRepository<Payment> {
    /// Payments whose id matches any of `ids`.
    async fn find_by_ids(&self, ids: &[EntityId]) -> Result<Vec<Payment>>;

    /// Payments attached to any of the given works.
    async fn find_by_work_ids(&self, work_ids: &[EntityId]) -> Result<Vec<Payment>>;
}
