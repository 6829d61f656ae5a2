// Work Detail Record

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};
use super::{EntityId, SENTINEL_ID};

/// One employee's share of one work: links a `Work` row to an `Employee`
/// row with that employee's earned amount and tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    pub id: EntityId,
    pub work_id: EntityId,
    pub employee_id: EntityId,
    pub employee_amount: f64,
    pub employee_tip: f64,
    pub notes: String,
}

impl Detail {
    /// Build a validated, not-yet-persisted detail (id left as sentinel).
    pub fn new(
        work_id: EntityId,
        employee_id: EntityId,
        employee_amount: f64,
        employee_tip: f64,
        notes: impl Into<String>,
    ) -> Result<Self> {
        for (field, value) in [
            ("employee_amount", employee_amount),
            ("employee_tip", employee_tip),
        ] {
            if value < 0.0 {
                return Err(DomainError::NegativeAmount { field, value });
            }
        }

        Ok(Self {
            id: SENTINEL_ID,
            work_id,
            employee_id,
            employee_amount,
            employee_tip,
            notes: notes.into(),
        })
    }

    /// The "no such detail" record.
    pub fn sentinel() -> Self {
        Self::default()
    }

    pub fn is_sentinel(&self) -> bool {
        self.id == SENTINEL_ID
    }
}

impl Default for Detail {
    fn default() -> Self {
        Self {
            id: SENTINEL_ID,
            work_id: 0,
            employee_id: 0,
            employee_amount: 0.0,
            employee_tip: 0.0,
            notes: String::new(),
        }
    }
}
