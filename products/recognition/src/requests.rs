use async_graphql::InputObject;
use entity::{EmployeeId, PerkId};
use serde::Deserialize;

use crate::{RecognitionError, RecognitionResult};

/// Manager award. Every field is optional on the wire so that absence is
/// reported as a bad request rather than a decoding failure.
#[derive(Clone, Debug, Default, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "AwardInput")]
pub struct AwardRequest {
    pub employee_id: Option<EmployeeId>,
    pub reason: Option<String>,
    pub points: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "PeerAwardInput")]
pub struct PeerAwardRequest {
    pub from_employee_id: Option<EmployeeId>,
    pub to_employee_id: Option<EmployeeId>,
    pub reason: Option<String>,
    pub points: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "RedeemInput")]
pub struct RedeemRequest {
    pub employee_id: Option<EmployeeId>,
    pub perk_id: Option<PerkId>,
    #[serde(default)]
    pub advance: Option<bool>,
}

pub(crate) struct ValidAward<'a> {
    pub employee_id: EmployeeId,
    pub reason: &'a str,
    pub points: i64,
}

pub(crate) struct ValidPeerAward<'a> {
    pub from_employee_id: EmployeeId,
    pub to_employee_id: EmployeeId,
    pub reason: &'a str,
    pub points: i64,
}

pub(crate) struct ValidRedeem {
    pub employee_id: EmployeeId,
    pub perk_id: PerkId,
    pub advance: bool,
}

impl AwardRequest {
    pub(crate) fn validate(&self) -> RecognitionResult<ValidAward<'_>> {
        let mut missing = Missing::default();
        let employee_id = missing.check("employeeId", self.employee_id);
        let reason = missing.check("reason", present_text(&self.reason));
        let points = missing.check("points", self.points);
        missing.finish()?;
        match (employee_id, reason, points) {
            (Some(employee_id), Some(reason), Some(points)) => Ok(ValidAward {
                employee_id,
                reason,
                points: positive_points(points)?,
            }),
            _ => Err(RecognitionError::bad_request("Missing required fields")),
        }
    }
}

impl PeerAwardRequest {
    pub(crate) fn validate(&self) -> RecognitionResult<ValidPeerAward<'_>> {
        let mut missing = Missing::default();
        let from = missing.check("fromEmployeeId", self.from_employee_id);
        let to = missing.check("toEmployeeId", self.to_employee_id);
        let reason = missing.check("reason", present_text(&self.reason));
        let points = missing.check("points", self.points);
        missing.finish()?;
        match (from, to, reason, points) {
            (Some(from_employee_id), Some(to_employee_id), Some(reason), Some(points)) => {
                Ok(ValidPeerAward {
                    from_employee_id,
                    to_employee_id,
                    reason,
                    points: positive_points(points)?,
                })
            }
            _ => Err(RecognitionError::bad_request("Missing required fields")),
        }
    }
}

impl RedeemRequest {
    pub(crate) fn validate(&self) -> RecognitionResult<ValidRedeem> {
        let mut missing = Missing::default();
        let employee_id = missing.check("employeeId", self.employee_id);
        let perk_id = missing.check("perkId", self.perk_id);
        missing.finish()?;
        match (employee_id, perk_id) {
            (Some(employee_id), Some(perk_id)) => Ok(ValidRedeem {
                employee_id,
                perk_id,
                advance: self.advance.unwrap_or(false),
            }),
            _ => Err(RecognitionError::bad_request("Missing required fields")),
        }
    }
}

#[derive(Default)]
struct Missing(Vec<&'static str>);

impl Missing {
    fn check<T>(&mut self, field: &'static str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.0.push(field);
        }
        value
    }

    fn finish(self) -> RecognitionResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(RecognitionError::bad_request(format!(
                "Missing required fields: {}",
                self.0.join(", ")
            )))
        }
    }
}

fn present_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

fn positive_points(points: i64) -> RecognitionResult<i64> {
    if points > 0 {
        Ok(points)
    } else {
        Err(RecognitionError::bad_request(
            "points must be a positive whole number",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_listed() {
        let request = AwardRequest {
            employee_id: Some(1),
            reason: Some("   ".into()),
            points: None,
        };
        let Err(err) = request.validate() else {
            panic!("blank reason should be rejected");
        };
        assert_eq!(err.to_string(), "Missing required fields: reason, points");
    }

    #[test]
    fn zero_points_is_rejected_as_non_positive() {
        let request = AwardRequest {
            employee_id: Some(1),
            reason: Some("teamwork".into()),
            points: Some(0),
        };
        let Err(err) = request.validate() else {
            panic!("zero points should be rejected");
        };
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn reason_is_trimmed() {
        let request = AwardRequest {
            employee_id: Some(4),
            reason: Some("  great demo ".into()),
            points: Some(15),
        };
        let valid = request.validate().unwrap();
        assert_eq!(valid.reason, "great demo");
        assert_eq!(valid.points, 15);
    }

    #[test]
    fn redeem_defaults_advance_to_false() {
        let request: RedeemRequest =
            serde_json::from_str(r#"{"employeeId": 2, "perkId": 3}"#).unwrap();
        let valid = request.validate().unwrap();
        assert!(!valid.advance);
        assert_eq!((valid.employee_id, valid.perk_id), (2, 3));
    }

    #[test]
    fn peer_request_reports_every_missing_id() {
        let request: PeerAwardRequest =
            serde_json::from_str(r#"{"reason": "help", "points": 5}"#).unwrap();
        let Err(err) = request.validate() else {
            panic!("missing ids should be rejected");
        };
        assert_eq!(
            err.to_string(),
            "Missing required fields: fromEmployeeId, toEmployeeId"
        );
    }
}
