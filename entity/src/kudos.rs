use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RecordId;

/// `from` value recorded for manager-granted awards.
pub const MANAGER_SOURCE: &str = "Manager";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct Kudos {
    pub id: RecordId,
    pub message: String,
    pub points: i64,
    pub date: DateTime<Utc>,
    pub from: String,
}
