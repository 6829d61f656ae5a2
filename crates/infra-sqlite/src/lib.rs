// Salon Infrastructure - SQLite Adapter
// Implements the repository ports on top of a bounded connection pool.

mod config;
mod detail_repository;
mod employee_repository;
mod error_map;
mod migration;
mod payment_repository;
mod pool;
mod work_repository;

pub use config::StoreConfig;
pub use detail_repository::SqliteDetailRepository;
pub use employee_repository::SqliteEmployeeRepository;
pub use migration::run_migrations;
pub use payment_repository::SqlitePaymentRepository;
pub use pool::{ConnectionPool, PooledConnection};
pub use work_repository::SqliteWorkRepository;

// Note: sqlx::Error conversion lives in error_map (orphan rules prevent
// implementing From<sqlx::Error> for AppError here).
