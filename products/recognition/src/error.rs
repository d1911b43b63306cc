use entity::{EmployeeId, PerkId, RecordId};
use platform_api::ApiError;
use platform_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Employee not found")]
    EmployeeNotFound(EmployeeId),
    #[error("Perk not found")]
    PerkNotFound(PerkId),
    #[error("Insufficient points to give recognition")]
    InsufficientFunds { available: i64, requested: i64 },
    #[error("An advance is already outstanding; it must be repaid before taking another")]
    AdvanceOutstanding {
        employee_id: EmployeeId,
        loan_id: RecordId,
    },
    #[error(transparent)]
    Store(#[from] DbError),
}

impl RecognitionError {
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

pub type RecognitionResult<T> = Result<T, RecognitionError>;

impl From<RecognitionError> for ApiError {
    fn from(err: RecognitionError) -> Self {
        let message = err.to_string();
        match err {
            RecognitionError::BadRequest(_) => ApiError::InvalidInput(message),
            RecognitionError::EmployeeNotFound(_) | RecognitionError::PerkNotFound(_) => {
                ApiError::NotFound(message)
            }
            RecognitionError::InsufficientFunds { .. } => ApiError::InsufficientFunds(message),
            RecognitionError::AdvanceOutstanding { .. } => ApiError::Conflict(message),
            RecognitionError::Store(err) => ApiError::internal(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_onto_api_taxonomy() {
        let cases = [
            (RecognitionError::bad_request("Missing required fields"), "INVALID_INPUT"),
            (RecognitionError::EmployeeNotFound(9), "NOT_FOUND"),
            (RecognitionError::PerkNotFound(9), "NOT_FOUND"),
            (
                RecognitionError::InsufficientFunds {
                    available: 10,
                    requested: 25,
                },
                "INSUFFICIENT_FUNDS",
            ),
            (
                RecognitionError::AdvanceOutstanding {
                    employee_id: 3,
                    loan_id: 1,
                },
                "CONFLICT",
            ),
            (
                RecognitionError::Store(DbError::UnknownEmployee(9)),
                "INTERNAL",
            ),
        ];
        for (err, code) in cases {
            assert_eq!(ApiError::from(err).code(), code);
        }
    }

    #[test]
    fn not_found_message_matches_client_expectations() {
        let api = ApiError::from(RecognitionError::EmployeeNotFound(4));
        assert_eq!(api.to_string(), "Employee not found");
    }
}
