// Work Record

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};
use super::{EntityId, SENTINEL_ID};

/// One service job. The datetime is kept as an ISO-8601 string and compared
/// lexicographically in range lookups, matching the stored TEXT column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub id: EntityId,
    pub datetime: String,
    pub amount: f64,
    pub tip: f64,
    pub discount: f64,
    pub grand_total: f64,
    pub notes: String,
}

impl Work {
    /// Build a validated, not-yet-persisted work (id left as sentinel).
    pub fn new(
        datetime: impl Into<String>,
        amount: f64,
        tip: f64,
        discount: f64,
        grand_total: f64,
        notes: impl Into<String>,
    ) -> Result<Self> {
        for (field, value) in [
            ("amount", amount),
            ("tip", tip),
            ("discount", discount),
            ("grand_total", grand_total),
        ] {
            if value < 0.0 {
                return Err(DomainError::NegativeAmount { field, value });
            }
        }

        Ok(Self {
            id: SENTINEL_ID,
            datetime: datetime.into(),
            amount,
            tip,
            discount,
            grand_total,
            notes: notes.into(),
        })
    }

    /// The "no such work" record.
    pub fn sentinel() -> Self {
        Self::default()
    }

    pub fn is_sentinel(&self) -> bool {
        self.id == SENTINEL_ID
    }
}

impl Default for Work {
    fn default() -> Self {
        Self {
            id: SENTINEL_ID,
            datetime: String::new(),
            amount: 0.0,
            tip: 0.0,
            discount: 0.0,
            grand_total: 0.0,
            notes: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_work() {
        let work = Work::new("2024-01-01", 100.0, 10.0, 0.0, 110.0, "").unwrap();
        assert!(work.is_sentinel());
        assert_eq!(work.grand_total, 110.0);
    }

    #[test]
    fn rejects_negative_tip() {
        let err = Work::new("2024-01-01", 100.0, -1.0, 0.0, 99.0, "").unwrap_err();
        assert!(matches!(
            err,
            DomainError::NegativeAmount { field: "tip", .. }
        ));
    }
}
