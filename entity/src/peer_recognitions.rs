use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EmployeeId, RecordId};

/// One employee spending their own points on another. Names are copied at
/// the time of the award.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct PeerRecognition {
    pub id: RecordId,
    pub from_employee_id: EmployeeId,
    pub to_employee_id: EmployeeId,
    pub from_employee_name: String,
    pub to_employee_name: String,
    pub reason: String,
    pub points: i64,
    pub message: String,
    pub date: DateTime<Utc>,
}
