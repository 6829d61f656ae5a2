// Port Layer - Interfaces for the persistence adapter

pub mod repository;

// Re-exports
pub use repository::{CrudRepository, DetailRepository, PaymentRepository, WorkRepository};
