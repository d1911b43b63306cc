//! Record types for employees, recognitions, advances and the perk catalog.
//!
//! These are plain data carriers. Mutation goes through the record store in
//! `platform-db`; nothing here changes a balance on its own.

pub mod employees;
pub mod kudos;
pub mod loans;
pub mod peer_recognitions;
pub mod perks;

pub use employees::{Employee, EmployeeId};
pub use kudos::{Kudos, MANAGER_SOURCE};
pub use loans::{Loan, RepaymentStatus};
pub use peer_recognitions::PeerRecognition;
pub use perks::{Perk, PerkCategory, PerkId};

/// Identifier for kudos, loan and peer-recognition records.
pub type RecordId = i64;
