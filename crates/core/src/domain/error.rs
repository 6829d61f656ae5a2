// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Percentage out of range: {field} = {value} (expected 0..=100)")]
    PercentageOutOfRange { field: &'static str, value: i64 },

    #[error("Negative amount: {field} = {value}")]
    NegativeAmount { field: &'static str, value: f64 },

    #[error("Negative salary: {0}")]
    NegativeSalary(i64),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
