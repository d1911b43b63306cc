//! Earned-points awards. An award first pays down any outstanding advance
//! (a negative balance) and only the remainder becomes spendable.

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use entity::{Employee, EmployeeId, Kudos, MANAGER_SOURCE};
use platform_db::RecordStore;
use serde::Serialize;
use tracing::info;

use crate::{AwardRequest, MessageGenerator, RecognitionError, RecognitionResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AwardOutcome {
    pub new_balance: i64,
    pub loan_repaid: bool,
}

/// Apply `awarded` (> 0) to `balance`.
///
/// A non-negative balance is simply credited. A negative balance is debt:
/// an award covering the whole debt clears it and leaves the remainder,
/// anything smaller only reduces it. A partial payment is reflected in the
/// balance alone; the loan record keeps its original amount.
///
/// `balance + awarded` must fit in an `i64`; [`credit`] checks this.
pub fn apply_award(balance: i64, awarded: i64) -> AwardOutcome {
    if balance >= 0 {
        return AwardOutcome {
            new_balance: balance + awarded,
            loan_repaid: false,
        };
    }
    let debt = balance.saturating_neg();
    if awarded >= debt {
        AwardOutcome {
            new_balance: awarded - debt,
            loan_repaid: true,
        }
    } else {
        AwardOutcome {
            new_balance: balance + awarded,
            loan_repaid: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct AwardReceipt {
    pub employee: Employee,
    pub loan_repaid: bool,
    pub message: String,
}

/// Manager award of `request.points` to `request.employee_id`.
pub fn award_kudos(
    store: &mut RecordStore,
    request: &AwardRequest,
    messages: &dyn MessageGenerator,
    now: DateTime<Utc>,
) -> RecognitionResult<AwardReceipt> {
    let award = request.validate()?;
    let employee = store
        .employee(award.employee_id)
        .ok_or(RecognitionError::EmployeeNotFound(award.employee_id))?;
    let message = messages.generate(&employee.name, award.reason, award.points);

    let outcome = credit(
        store,
        award.employee_id,
        award.points,
        MANAGER_SOURCE,
        &message,
        now,
    )?;
    info!(
        employee_id = award.employee_id,
        points = award.points,
        balance = outcome.new_balance,
        loan_repaid = outcome.loan_repaid,
        "kudos awarded"
    );

    let employee = store
        .employee(award.employee_id)
        .cloned()
        .ok_or(RecognitionError::EmployeeNotFound(award.employee_id))?;
    Ok(AwardReceipt {
        employee,
        loan_repaid: outcome.loan_repaid,
        message,
    })
}

/// Credit `points` to an existing employee, settle their advance once the
/// balance is no longer negative, and record the kudos entry.
///
/// An advance taken while the balance covered the perk leaves an outstanding
/// loan next to a non-negative balance; the next award settles it.
pub(crate) fn credit(
    store: &mut RecordStore,
    employee_id: EmployeeId,
    points: i64,
    from: &str,
    message: &str,
    now: DateTime<Utc>,
) -> RecognitionResult<AwardOutcome> {
    let employee = store
        .employee(employee_id)
        .ok_or(RecognitionError::EmployeeNotFound(employee_id))?;
    let balance = employee.points_balance;
    let has_open_loan = employee.outstanding_loan().is_some();
    if balance.checked_add(points).is_none() {
        return Err(RecognitionError::bad_request(
            "points would overflow the balance",
        ));
    }
    let mut outcome = apply_award(balance, points);

    store.set_balance(employee_id, outcome.new_balance)?;
    if outcome.loan_repaid || (has_open_loan && outcome.new_balance >= 0) {
        if let Some(loan_id) = store.resolve_outstanding_loan(employee_id, now)? {
            info!(employee_id, loan_id, "advance repaid");
            outcome.loan_repaid = true;
        }
    }
    let kudos = Kudos {
        id: store.next_record_id(),
        message: message.to_string(),
        points,
        date: now,
        from: from.to_string(),
    };
    store.record_kudos(employee_id, kudos)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::RepaymentStatus;
    use platform_db::{KUDOS_HISTORY_LIMIT, Seed};

    struct Fixed;

    impl MessageGenerator for Fixed {
        fn generate(&self, employee_name: &str, reason: &str, points: i64) -> String {
            format!("{employee_name}:{reason}:{points}")
        }
    }

    fn demo_store() -> RecordStore {
        RecordStore::from_seed(Seed::demo()).unwrap()
    }

    fn award(employee_id: i64, points: i64) -> AwardRequest {
        AwardRequest {
            employee_id: Some(employee_id),
            reason: Some("teamwork".into()),
            points: Some(points),
        }
    }

    #[test]
    fn positive_balance_is_credited() {
        for balance in [0, 1, 80, 150] {
            assert_eq!(
                apply_award(balance, 25),
                AwardOutcome {
                    new_balance: balance + 25,
                    loan_repaid: false
                }
            );
        }
    }

    #[test]
    fn covering_award_clears_debt() {
        assert_eq!(
            apply_award(-50, 70),
            AwardOutcome {
                new_balance: 20,
                loan_repaid: true
            }
        );
        assert_eq!(
            apply_award(-50, 50),
            AwardOutcome {
                new_balance: 0,
                loan_repaid: true
            }
        );
    }

    #[test]
    fn partial_award_reduces_debt() {
        assert_eq!(
            apply_award(-50, 30),
            AwardOutcome {
                new_balance: -20,
                loan_repaid: false
            }
        );
    }

    #[test]
    fn award_repays_outstanding_loan() {
        let mut store = demo_store();
        let now = Utc::now();
        let receipt = award_kudos(&mut store, &award(3, 70), &Fixed, now).unwrap();

        assert!(receipt.loan_repaid);
        assert_eq!(receipt.employee.points_balance, 20);
        assert_eq!(receipt.message, "Sarah Johnson:teamwork:70");
        let loan = &receipt.employee.loan_history[0];
        assert_eq!(loan.repayment_status, RepaymentStatus::Repaid);
        assert_eq!(loan.repaid_date, Some(now));
        let kudos = &receipt.employee.recent_kudos[0];
        assert_eq!((kudos.points, kudos.from.as_str()), (70, MANAGER_SOURCE));
    }

    #[test]
    fn partial_award_leaves_loan_untouched() {
        let mut store = demo_store();
        let receipt = award_kudos(&mut store, &award(3, 30), &Fixed, Utc::now()).unwrap();

        assert!(!receipt.loan_repaid);
        assert_eq!(receipt.employee.points_balance, -20);
        let loan = &receipt.employee.loan_history[0];
        assert_eq!(loan.repayment_status, RepaymentStatus::Outstanding);
        assert_eq!(loan.amount, 50);
        assert!(loan.repaid_date.is_none());
    }

    #[test]
    fn kudos_history_never_exceeds_limit() {
        let mut store = demo_store();
        for _ in 0..(KUDOS_HISTORY_LIMIT + 4) {
            let receipt = award_kudos(&mut store, &award(1, 5), &Fixed, Utc::now()).unwrap();
            assert!(receipt.employee.recent_kudos.len() <= KUDOS_HISTORY_LIMIT);
        }
        let maria = store.employee(1).unwrap();
        assert_eq!(maria.recent_kudos.len(), KUDOS_HISTORY_LIMIT);
        assert_eq!(maria.points_balance, 150 + 5 * (KUDOS_HISTORY_LIMIT as i64 + 4));
    }

    #[test]
    fn unknown_employee_is_not_found() {
        let mut store = demo_store();
        let err = award_kudos(&mut store, &award(99, 10), &Fixed, Utc::now()).unwrap_err();
        assert!(matches!(err, RecognitionError::EmployeeNotFound(99)));
    }

    #[test]
    fn award_settles_advance_taken_on_a_covered_balance() {
        let mut store = demo_store();
        let explicit = crate::RedeemRequest {
            employee_id: Some(1),
            perk_id: Some(1),
            advance: Some(true),
        };
        crate::redeem_perk(&mut store, &explicit, Utc::now()).unwrap();
        assert!(store.employee(1).unwrap().outstanding_loan().is_some());

        let receipt = award_kudos(&mut store, &award(1, 10), &Fixed, Utc::now()).unwrap();
        assert!(receipt.loan_repaid);
        assert_eq!(receipt.employee.points_balance, 110);
        assert_eq!(
            receipt.employee.loan_history[0].repayment_status,
            RepaymentStatus::Repaid
        );
    }

    #[test]
    fn overflowing_award_is_rejected_before_mutation() {
        let mut store = demo_store();
        store.set_balance(4, i64::MAX - 5).unwrap();
        let before = store.snapshot();
        let err = award_kudos(&mut store, &award(4, 10), &Fixed, Utc::now()).unwrap_err();
        assert!(matches!(err, RecognitionError::BadRequest(_)));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn invalid_request_does_not_touch_store() {
        let mut store = demo_store();
        let before = store.snapshot();
        let err = award_kudos(&mut store, &award(1, 0), &Fixed, Utc::now()).unwrap_err();
        assert!(matches!(err, RecognitionError::BadRequest(_)));
        assert_eq!(store.snapshot(), before);
    }
}
