// Employee Record

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};
use super::{EntityId, SENTINEL_ID};

/// An employee of the salon.
///
/// `work_percentage` and `cash_percentage` are the employee's cut of a job
/// paid by card and by cash respectively; both are whole percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EntityId,
    pub name: String,
    pub phone: String,
    pub ssn: String,
    pub address: String,
    pub work_percentage: i64,
    pub cash_percentage: i64,
    pub salary: i64,
}

impl Employee {
    /// Build a validated, not-yet-persisted employee (id left as sentinel).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        ssn: impl Into<String>,
        address: impl Into<String>,
        work_percentage: i64,
        cash_percentage: i64,
        salary: i64,
    ) -> Result<Self> {
        if !(0..=100).contains(&work_percentage) {
            return Err(DomainError::PercentageOutOfRange {
                field: "work_percentage",
                value: work_percentage,
            });
        }
        if !(0..=100).contains(&cash_percentage) {
            return Err(DomainError::PercentageOutOfRange {
                field: "cash_percentage",
                value: cash_percentage,
            });
        }
        if salary < 0 {
            return Err(DomainError::NegativeSalary(salary));
        }

        Ok(Self {
            id: SENTINEL_ID,
            name: name.into(),
            phone: phone.into(),
            ssn: ssn.into(),
            address: address.into(),
            work_percentage,
            cash_percentage,
            salary,
        })
    }

    /// The "no such employee" record.
    pub fn sentinel() -> Self {
        Self::default()
    }

    pub fn is_sentinel(&self) -> bool {
        self.id == SENTINEL_ID
    }
}

impl Default for Employee {
    fn default() -> Self {
        Self {
            id: SENTINEL_ID,
            name: String::new(),
            phone: String::new(),
            ssn: String::new(),
            address: String::new(),
            work_percentage: 0,
            cash_percentage: 0,
            salary: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_employee_starts_unpersisted() {
        let emp = Employee::new("Ana", "555-0101", "000-00-0000", "1 Main St", 50, 50, 0).unwrap();
        assert!(emp.is_sentinel());
        assert_eq!(emp.name, "Ana");
    }

    #[test]
    fn rejects_percentage_over_100() {
        let err = Employee::new("Ana", "", "", "", 150, 50, 0).unwrap_err();
        assert!(matches!(
            err,
            DomainError::PercentageOutOfRange {
                field: "work_percentage",
                value: 150
            }
        ));
    }

    #[test]
    fn rejects_negative_salary() {
        let err = Employee::new("Ana", "", "", "", 50, 50, -5).unwrap_err();
        assert!(matches!(err, DomainError::NegativeSalary(-5)));
    }

    #[test]
    fn sentinel_has_minus_one_id() {
        assert_eq!(Employee::sentinel().id, SENTINEL_ID);
        assert!(Employee::sentinel().is_sentinel());
    }
}
