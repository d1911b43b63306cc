use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RecordId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum RepaymentStatus {
    Outstanding,
    Repaid,
}

/// A perk redeemed on credit, repaid by later awards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: RecordId,
    pub amount: i64,
    pub date: DateTime<Utc>,
    pub redeemed_perk: String,
    pub repayment_status: RepaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repaid_date: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn is_outstanding(&self) -> bool {
        self.repayment_status == RepaymentStatus::Outstanding
    }

    pub fn mark_repaid(&mut self, at: DateTime<Utc>) {
        self.repayment_status = RepaymentStatus::Repaid;
        self.repaid_date = Some(at);
    }
}
