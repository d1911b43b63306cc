use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Serialize};

pub type PerkId = i64;

/// Display grouping only; it carries no ledger meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum PerkCategory {
    Food,
    Transportation,
    Wellness,
    Electronics,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct Perk {
    pub id: PerkId,
    pub name: String,
    pub cost: i64,
    pub description: String,
    pub category: PerkCategory,
}

impl Perk {
    pub fn affordable_with(&self, balance: i64) -> bool {
        balance >= self.cost
    }
}
