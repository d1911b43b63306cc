//! Spending points on perks. A redemption the balance cannot cover, or one
//! explicitly requested as an advance, is recorded as a loan.

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use entity::{Employee, Loan, RepaymentStatus};
use platform_db::RecordStore;
use serde::Serialize;
use tracing::info;

use crate::{RecognitionError, RecognitionResult, RedeemRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedemptionPlan {
    pub is_advance: bool,
    pub new_balance: i64,
}

/// The balance always drops by exactly `cost`; whether that is an advance
/// depends on the flag and on the balance covering the cost.
pub fn plan_redemption(balance: i64, cost: i64, advance_requested: bool) -> RedemptionPlan {
    RedemptionPlan {
        is_advance: advance_requested || balance < cost,
        new_balance: balance.saturating_sub(cost),
    }
}

#[derive(Clone, Debug, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionReceipt {
    pub employee: Employee,
    pub is_advance: bool,
    /// Name of the redeemed perk.
    pub perk: String,
    pub new_balance: i64,
}

pub fn redeem_perk(
    store: &mut RecordStore,
    request: &RedeemRequest,
    now: DateTime<Utc>,
) -> RecognitionResult<RedemptionReceipt> {
    let redeem = request.validate()?;
    let employee = store
        .employee(redeem.employee_id)
        .ok_or(RecognitionError::EmployeeNotFound(redeem.employee_id))?;
    let perk = store
        .perk(redeem.perk_id)
        .ok_or(RecognitionError::PerkNotFound(redeem.perk_id))?;

    let plan = plan_redemption(employee.points_balance, perk.cost, redeem.advance);
    // A loan is only still owed while the balance is negative.
    let settle_open_loan =
        employee.outstanding_loan().is_some() && employee.points_balance >= 0;
    if plan.is_advance && !settle_open_loan {
        if let Some(open) = employee.outstanding_loan() {
            return Err(RecognitionError::AdvanceOutstanding {
                employee_id: employee.id,
                loan_id: open.id,
            });
        }
    }
    let (perk_name, cost) = (perk.name.clone(), perk.cost);

    if settle_open_loan {
        if let Some(loan_id) = store.resolve_outstanding_loan(redeem.employee_id, now)? {
            info!(employee_id = redeem.employee_id, loan_id, "covered advance settled");
        }
    }
    store.set_balance(redeem.employee_id, plan.new_balance)?;
    if plan.is_advance {
        let loan = Loan {
            id: store.next_record_id(),
            amount: cost,
            date: now,
            redeemed_perk: perk_name.clone(),
            repayment_status: RepaymentStatus::Outstanding,
            repaid_date: None,
        };
        store.record_loan(redeem.employee_id, loan)?;
    }
    info!(
        employee_id = redeem.employee_id,
        perk_id = redeem.perk_id,
        cost,
        is_advance = plan.is_advance,
        balance = plan.new_balance,
        "perk redeemed"
    );

    let employee = store
        .employee(redeem.employee_id)
        .cloned()
        .ok_or(RecognitionError::EmployeeNotFound(redeem.employee_id))?;
    Ok(RedemptionReceipt {
        employee,
        is_advance: plan.is_advance,
        perk: perk_name,
        new_balance: plan.new_balance,
    })
}
