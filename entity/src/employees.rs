use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

use crate::{Kudos, Loan};

pub type EmployeeId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: String,
    /// Negative while the employee owes an advance.
    pub points_balance: i64,
    /// Newest first.
    #[serde(default)]
    pub recent_kudos: Vec<Kudos>,
    /// Newest first.
    #[serde(default)]
    pub loan_history: Vec<Loan>,
}

impl Employee {
    pub fn new(id: EmployeeId, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role: role.into(),
            points_balance: 0,
            recent_kudos: Vec::new(),
            loan_history: Vec::new(),
        }
    }

    pub fn with_balance(mut self, points_balance: i64) -> Self {
        self.points_balance = points_balance;
        self
    }

    /// First word of the role, e.g. "Senior" for "Senior Engineer".
    pub fn department(&self) -> &str {
        self.role.split_whitespace().next().unwrap_or_default()
    }

    pub fn outstanding_loan(&self) -> Option<&Loan> {
        self.loan_history.iter().find(|loan| loan.is_outstanding())
    }

    pub fn outstanding_loans(&self) -> usize {
        self.loan_history
            .iter()
            .filter(|loan| loan.is_outstanding())
            .count()
    }

    pub fn has_advance(&self) -> bool {
        self.points_balance < 0
    }

    /// Sum of every advance ever taken, repaid or not.
    pub fn total_advanced(&self) -> i64 {
        self.loan_history.iter().map(|loan| loan.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RepaymentStatus;
    use chrono::{TimeZone, Utc};

    fn loan(id: i64, status: RepaymentStatus) -> Loan {
        Loan {
            id,
            amount: 50,
            date: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            redeemed_perk: "Coffee Gift Card".into(),
            repayment_status: status,
            repaid_date: None,
        }
    }

    #[test]
    fn department_is_first_word_of_role() {
        let employee = Employee::new(1, "James Chen", "Senior Engineer");
        assert_eq!(employee.department(), "Senior");
        let blank = Employee::new(2, "Nobody", "  ");
        assert_eq!(blank.department(), "");
    }

    #[test]
    fn outstanding_loan_skips_repaid_entries() {
        let mut employee = Employee::new(3, "Sarah Johnson", "Sales Representative");
        employee.loan_history = vec![
            loan(2, RepaymentStatus::Repaid),
            loan(1, RepaymentStatus::Outstanding),
        ];
        assert_eq!(employee.outstanding_loan().map(|l| l.id), Some(1));
        assert_eq!(employee.outstanding_loans(), 1);
        assert_eq!(employee.total_advanced(), 100);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let employee = Employee::new(7, "Emma Davis", "HR Specialist").with_balance(-5);
        let value = serde_json::to_value(&employee).unwrap();
        assert_eq!(value["pointsBalance"], -5);
        assert!(value["recentKudos"].as_array().unwrap().is_empty());
        assert!(value["loanHistory"].as_array().unwrap().is_empty());
        assert!(employee.has_advance());
    }
}
