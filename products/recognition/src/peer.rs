//! Peer awards: the sender pays out of their own balance and the recipient
//! is credited under the same rules as a manager award.

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use entity::{Employee, PeerRecognition};
use platform_db::RecordStore;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    MessageGenerator, PeerAwardRequest, RecognitionError, RecognitionResult, ledger::credit,
};

#[derive(Clone, Debug, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct PeerReceipt {
    pub from_employee: Employee,
    pub to_employee: Employee,
    pub loan_repaid: bool,
    pub message: String,
}

/// Move `points` from one employee to another.
///
/// Affordability is the sender's raw balance against the requested points.
/// The sender is debited the full amount even when the recipient only
/// needed part of it to clear an advance.
pub fn peer_recognize(
    store: &mut RecordStore,
    request: &PeerAwardRequest,
    messages: &dyn MessageGenerator,
    now: DateTime<Utc>,
) -> RecognitionResult<PeerReceipt> {
    let award = request.validate()?;
    let sender = store
        .employee(award.from_employee_id)
        .ok_or(RecognitionError::EmployeeNotFound(award.from_employee_id))?;
    let recipient = store
        .employee(award.to_employee_id)
        .ok_or(RecognitionError::EmployeeNotFound(award.to_employee_id))?;
    if sender.id == recipient.id {
        return Err(RecognitionError::bad_request(
            "Employees cannot recognize themselves",
        ));
    }
    if sender.points_balance < award.points {
        warn!(
            from_employee_id = sender.id,
            available = sender.points_balance,
            requested = award.points,
            "peer recognition rejected"
        );
        return Err(RecognitionError::InsufficientFunds {
            available: sender.points_balance,
            requested: award.points,
        });
    }

    let sender_name = sender.name.clone();
    let recipient_name = recipient.name.clone();
    let sender_balance = sender.points_balance;
    let message = messages.generate(&recipient_name, award.reason, award.points);

    let outcome = credit(
        store,
        award.to_employee_id,
        award.points,
        &sender_name,
        &message,
        now,
    )?;
    store.set_balance(award.from_employee_id, sender_balance - award.points)?;
    let recognition = PeerRecognition {
        id: store.next_record_id(),
        from_employee_id: award.from_employee_id,
        to_employee_id: award.to_employee_id,
        from_employee_name: sender_name,
        to_employee_name: recipient_name,
        reason: award.reason.to_string(),
        points: award.points,
        message: message.clone(),
        date: now,
    };
    store.record_peer_recognition(recognition);
    info!(
        from_employee_id = award.from_employee_id,
        to_employee_id = award.to_employee_id,
        points = award.points,
        loan_repaid = outcome.loan_repaid,
        "peer recognition recorded"
    );

    let from_employee = store
        .employee(award.from_employee_id)
        .cloned()
        .ok_or(RecognitionError::EmployeeNotFound(award.from_employee_id))?;
    let to_employee = store
        .employee(award.to_employee_id)
        .cloned()
        .ok_or(RecognitionError::EmployeeNotFound(award.to_employee_id))?;
    Ok(PeerReceipt {
        from_employee,
        to_employee,
        loan_repaid: outcome.loan_repaid,
        message,
    })
}
