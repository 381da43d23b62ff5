//! Unified error definitions
//!
//! Registry and buffer misuse surfaces synchronously as `Err`; per-request
//! delivery failures travel through each request's rejection path instead.
//! The coded kinds carry their numeric code both in the display template
//! and through [`CoreError::code`].

use thiserror::Error;

use crate::ServiceName;

/// Unified error type
///
/// Clone is required because a batch-wide rejection hands the same error
/// to every request in the batch.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Malformed argument to a registry or buffer operation
    #[error("illegal argument: {0} (#2000)")]
    IllegalArgument(String),

    /// Operation addressed a service name with no registration
    #[error("the service with the given name has not been registered: {0} (#2001)")]
    ServiceUnregistered(ServiceName),

    /// Registration collided with an existing name and overwrite was off
    #[error("the service with the given name has already been registered: {0} (#2002)")]
    ServiceAlreadyRegistered(ServiceName),

    /// Batch response count did not match the number of buffered requests
    #[error("the service returned {actual} responses for {expected} requests (#2003)")]
    IllegalResponseSize { expected: usize, actual: usize },

    /// The remote end answered with a null or malformed response slot
    #[error("the service returned an erroneous response: {0} (#2004)")]
    ErroneousResponse(String),

    /// Free-form dispatcher-side failure (transport errors, remote errors)
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Create an illegal-argument error
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::IllegalArgument(message.into())
    }

    /// Create an unregistered-service error
    pub fn unregistered(name: impl Into<ServiceName>) -> Self {
        Self::ServiceUnregistered(name.into())
    }

    /// Create an already-registered error
    pub fn already_registered(name: impl Into<ServiceName>) -> Self {
        Self::ServiceAlreadyRegistered(name.into())
    }

    /// Create an erroneous-response error
    pub fn erroneous_response(message: impl Into<String>) -> Self {
        Self::ErroneousResponse(message.into())
    }

    /// Wrap a free-form failure message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Numeric code of the coded kinds; `None` for wrapped free-form errors.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::IllegalArgument(_) => Some(2000),
            Self::ServiceUnregistered(_) => Some(2001),
            Self::ServiceAlreadyRegistered(_) => Some(2002),
            Self::IllegalResponseSize { .. } => Some(2003),
            Self::ErroneousResponse(_) => Some(2004),
            Self::Other(_) => None,
        }
    }
}

// The wrapping rule: anything that is not already a CoreError becomes Other
impl From<String> for CoreError {
    fn from(message: String) -> Self {
        Self::Other(message)
    }
}

impl From<&str> for CoreError {
    fn from(message: &str) -> Self {
        Self::Other(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_in_message() {
        let err = CoreError::unregistered("geo");
        assert!(err.to_string().contains("geo"));
        assert!(err.to_string().contains("#2001"));
        assert_eq!(err.code(), Some(2001));
    }

    #[test]
    fn test_size_mismatch_message() {
        let err = CoreError::IllegalResponseSize {
            expected: 3,
            actual: 1,
        };
        assert_eq!(err.code(), Some(2003));
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains('1'));
    }

    #[test]
    fn test_wrapping_rule() {
        let err: CoreError = "boom".into();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.code(), None);
    }
}
