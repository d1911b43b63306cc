//! Recognition slice: the points ledger, peer awards, perk redemption and
//! the read-only views built on top of them.
//!
//! Every mutating operation takes `&mut RecordStore`, checks all of its
//! preconditions, and only then writes. Callers hold the store's write lock
//! for the duration of a call.

mod error;
pub mod insights;
pub mod ledger;
pub mod messages;
pub mod peer;
pub mod redemption;
mod requests;

pub use error::{RecognitionError, RecognitionResult};
pub use insights::{
    DepartmentStats, EmployeeSummary, Engagement, FinancialTip, TeamOverview, TeamStats, TipKind,
    employee_summary, financial_tips, health_score, leaderboard, ranked, team_stats,
};
pub use ledger::{AwardOutcome, AwardReceipt, apply_award, award_kudos};
pub use messages::{MessageGenerator, TemplateMessages};
pub use peer::{PeerReceipt, peer_recognize};
pub use redemption::{RedemptionPlan, RedemptionReceipt, plan_redemption, redeem_perk};
pub use requests::{AwardRequest, PeerAwardRequest, RedeemRequest};

/// Default number of entries in the leaderboard summary.
pub const LEADERBOARD_SIZE: usize = 10;
