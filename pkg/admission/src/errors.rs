use pkg_constants::admission::NOT_READY_MESSAGE;
use std::fmt;
use thiserror::Error;

pub type AdmissionResult<T> = Result<T, AdmissionError>;

/// Why a request was not admitted.
#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("{0}")]
    BadRequest(String),

    /// The request was evaluated and violates policy.
    #[error("{0}")]
    Forbidden(ForbiddenError),

    /// Caches are not warm yet; the caller should retry shortly.
    #[error("{0}")]
    NotReady(ForbiddenError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AdmissionError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AdmissionError::BadRequest(msg.into())
    }

    pub fn forbidden(
        resource: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        AdmissionError::Forbidden(ForbiddenError {
            resource: resource.into(),
            name: name.into(),
            reason: reason.into(),
        })
    }

    pub fn not_ready(resource: impl Into<String>, name: impl Into<String>) -> Self {
        AdmissionError::NotReady(ForbiddenError {
            resource: resource.into(),
            name: name.into(),
            reason: NOT_READY_MESSAGE.to_string(),
        })
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        AdmissionError::Internal(msg.into())
    }

    /// Only a not-ready rejection is worth retrying unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, AdmissionError::NotReady(_))
    }

    /// HTTP status code reported to the caller.
    pub fn code(&self) -> u16 {
        match self {
            AdmissionError::BadRequest(_) => 400,
            AdmissionError::Forbidden(_) | AdmissionError::NotReady(_) => 403,
            AdmissionError::Internal(_) => 500,
        }
    }

    /// Machine-readable status reason.
    pub fn reason(&self) -> &'static str {
        match self {
            AdmissionError::BadRequest(_) => "BadRequest",
            AdmissionError::Forbidden(_) => "Forbidden",
            AdmissionError::NotReady(_) => "NotReady",
            AdmissionError::Internal(_) => "InternalError",
        }
    }
}

#[derive(Debug)]
pub struct ForbiddenError {
    pub resource: String,
    pub name: String,
    pub reason: String,
}

impl fmt::Display for ForbiddenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \"{}\" is forbidden: {}",
            self.resource, self.name, self.reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_message_names_the_object() {
        let err = AdmissionError::forbidden("shoots", "s1", "Quota limits exceeded");
        assert_eq!(err.to_string(), "shoots \"s1\" is forbidden: Quota limits exceeded");
        assert_eq!(err.code(), 403);
        assert_eq!(err.reason(), "Forbidden");
        assert!(!err.is_transient());
    }

    #[test]
    fn not_ready_is_a_transient_forbidden() {
        let err = AdmissionError::not_ready("shoots", "s1");
        assert_eq!(
            err.to_string(),
            "shoots \"s1\" is forbidden: not yet ready to handle request"
        );
        assert_eq!(err.code(), 403);
        assert_eq!(err.reason(), "NotReady");
        assert!(err.is_transient());
    }

    #[test]
    fn internal_and_bad_request_codes() {
        assert_eq!(AdmissionError::internal_error("boom").code(), 500);
        assert_eq!(AdmissionError::internal_error("boom").to_string(), "internal error: boom");
        assert_eq!(AdmissionError::bad_request("nope").code(), 400);
    }
}
