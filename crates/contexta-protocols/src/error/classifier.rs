//! Classification backend errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classification backend unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid classification response: {0}")]
    InvalidResponse(String),

    #[error("Classification timed out after {0} ms")]
    Timeout(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable() {
        let err = ClassifierError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_invalid_response() {
        let err = ClassifierError::InvalidResponse("missing scores".to_string());
        assert!(err.to_string().contains("missing scores"));
    }

    #[test]
    fn test_timeout() {
        let err = ClassifierError::Timeout(2000);
        assert!(err.to_string().contains("2000"));
    }
}
