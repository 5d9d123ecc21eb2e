//! Response-specific error types.
//!
//! Every operation returns one of these as its typed failure outcome.

use crate::domain::foundation::{DomainError, ErrorCode, MapId, ResponseId, Timestamp, UserId};

/// Errors surfaced by response operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// The referenced map does not exist.
    MapNotFound(MapId),
    /// The referenced response version does not exist.
    ResponseNotFound(ResponseId),
    /// The caller is not (a member of) the reviewer of record.
    Forbidden,
    /// Another party holds a live edit lock.
    Denied { holder: UserId, expires_at: Timestamp },
    /// A mutating call was made without holding the required edit lock.
    LockNotHeld,
    /// The version has already been submitted and its content is frozen.
    AlreadySubmitted,
    /// The deviation notification could not be handed off.
    NotificationDeliveryFailed(String),
    /// Input failed validation.
    ValidationFailed { field: String, message: String },
    /// Infrastructure error.
    Infrastructure(String),
}

impl ResponseError {
    pub fn map_not_found(id: MapId) -> Self {
        ResponseError::MapNotFound(id)
    }
    pub fn response_not_found(id: ResponseId) -> Self {
        ResponseError::ResponseNotFound(id)
    }
    pub fn denied(holder: UserId, expires_at: Timestamp) -> Self {
        ResponseError::Denied { holder, expires_at }
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ResponseError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        ResponseError::Infrastructure(message.into())
    }

    /// True for the "someone else is editing, try later" outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResponseError::Denied { .. })
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ResponseError::MapNotFound(_) => ErrorCode::MapNotFound,
            ResponseError::ResponseNotFound(_) => ErrorCode::ResponseNotFound,
            ResponseError::Forbidden => ErrorCode::Forbidden,
            ResponseError::Denied { .. } => ErrorCode::LockDenied,
            ResponseError::LockNotHeld => ErrorCode::LockNotHeld,
            ResponseError::AlreadySubmitted => ErrorCode::AlreadySubmitted,
            ResponseError::NotificationDeliveryFailed(_) => ErrorCode::NotificationDeliveryFailed,
            ResponseError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            ResponseError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ResponseError::MapNotFound(id) => format!("Response map not found: {}", id),
            ResponseError::ResponseNotFound(id) => format!("Response not found: {}", id),
            ResponseError::Forbidden => "You are not a reviewer on this response".to_string(),
            ResponseError::Denied { .. } => {
                "Another user is modifying this response or has modified this response. Try again later."
                    .to_string()
            }
            ResponseError::LockNotHeld => {
                "You must hold the edit lock on this response to change it".to_string()
            }
            ResponseError::AlreadySubmitted => {
                "This response has already been submitted and can no longer be edited".to_string()
            }
            ResponseError::NotificationDeliveryFailed(msg) => {
                format!("Deviation notification was not delivered: {}", msg)
            }
            ResponseError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            ResponseError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ResponseError {}

impl From<DomainError> for ResponseError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden => ResponseError::Forbidden,
            ErrorCode::LockNotHeld => ResponseError::LockNotHeld,
            ErrorCode::AlreadySubmitted => ResponseError::AlreadySubmitted,
            ErrorCode::ValidationFailed => ResponseError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::NotificationDeliveryFailed => {
                ResponseError::NotificationDeliveryFailed(err.message)
            }
            _ => ResponseError::Infrastructure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_is_the_only_retryable_error() {
        let denied = ResponseError::denied(UserId::new("bob").unwrap(), Timestamp::now());
        assert!(denied.is_retryable());
        assert!(!ResponseError::LockNotHeld.is_retryable());
        assert!(!ResponseError::AlreadySubmitted.is_retryable());
    }

    #[test]
    fn lock_errors_have_distinct_codes() {
        assert_eq!(ResponseError::LockNotHeld.code(), ErrorCode::LockNotHeld);
        assert_eq!(
            ResponseError::AlreadySubmitted.code(),
            ErrorCode::AlreadySubmitted
        );
        assert_ne!(
            ResponseError::LockNotHeld.code(),
            ResponseError::AlreadySubmitted.code()
        );
    }

    #[test]
    fn database_errors_become_infrastructure() {
        let err: ResponseError = DomainError::database("connection reset").into();
        assert!(matches!(err, ResponseError::Infrastructure(_)));
    }

    #[test]
    fn validation_errors_keep_field_detail() {
        let err: ResponseError = DomainError::new(ErrorCode::ValidationFailed, "too long")
            .with_detail("field", "comment")
            .into();
        assert_eq!(
            err,
            ResponseError::ValidationFailed {
                field: "comment".to_string(),
                message: "too long".to_string()
            }
        );
    }

    #[test]
    fn display_uses_message() {
        let id = ResponseId::new();
        assert_eq!(
            ResponseError::response_not_found(id).to_string(),
            format!("Response not found: {}", id)
        );
    }
}
