// Domain Layer - Pure record types and validation

pub mod detail;
pub mod employee;
pub mod error;
pub mod payment;
pub mod work;

// Re-exports
pub use detail::Detail;
pub use employee::Employee;
pub use error::DomainError;
pub use payment::Payment;
pub use work::Work;

/// Row identifier assigned by the store at insert time.
pub type EntityId = i64;

/// Identifier value meaning "not persisted / not found".
///
/// Every repository operation is total: a missing row or a failed mutation
/// comes back as a record carrying this id, never as an error. Callers must
/// check it before treating a result as a live row.
pub const SENTINEL_ID: EntityId = -1;
