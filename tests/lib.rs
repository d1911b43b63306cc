//! Shared fixtures for the end-to-end ledger scenarios.

use platform_db::{DbResult, RecordStore, Seed, SharedStore};
use products_recognition::MessageGenerator;

/// Deterministic congratulation text.
pub struct FixedMessages;

impl MessageGenerator for FixedMessages {
    fn generate(&self, employee_name: &str, reason: &str, points: i64) -> String {
        format!("{employee_name} earned {points} for {reason}")
    }
}

pub fn demo_store() -> DbResult<RecordStore> {
    RecordStore::from_seed(Seed::demo())
}

pub fn shared_demo_store() -> DbResult<SharedStore> {
    demo_store().map(RecordStore::into_shared)
}
