// Payment Record

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};
use super::{EntityId, SENTINEL_ID};

/// How (part of) a work was paid. `kind` is free-form ("card", "cash", ...)
/// and serializes as `type` to match the stored column and wire field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: EntityId,
    pub work_id: EntityId,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Payment {
    /// Build a validated, not-yet-persisted payment (id left as sentinel).
    pub fn new(work_id: EntityId, amount: f64, kind: impl Into<String>) -> Result<Self> {
        if amount < 0.0 {
            return Err(DomainError::NegativeAmount {
                field: "amount",
                value: amount,
            });
        }

        Ok(Self {
            id: SENTINEL_ID,
            work_id,
            amount,
            kind: kind.into(),
        })
    }

    /// The "no such payment" record.
    pub fn sentinel() -> Self {
        Self::default()
    }

    pub fn is_sentinel(&self) -> bool {
        self.id == SENTINEL_ID
    }
}

impl Default for Payment {
    fn default() -> Self {
        Self {
            id: SENTINEL_ID,
            work_id: 0,
            amount: 0.0,
            kind: String::new(),
        }
    }
}
