//! Error types for the submission pipeline.
//!
//! Uses `thiserror` with structured variants. The three error domains match
//! the three places a submission can go wrong: the form (returned as
//! [`FieldErrors`](crate::validate::FieldErrors), never raised), the
//! prediction service, and the history store. A history failure is soft and
//! never surfaces through the pipeline's error type.

use crate::validate::FieldErrors;

/// The prediction service could not produce a result.
///
/// All three variants mean the same thing to the caller: the submission
/// failed without a prediction, and the entered form should be kept for a
/// retry. They are distinct from validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PredictError {
    /// The request never completed (DNS, refused connection, dropped socket).
    #[error("could not reach the prediction service: {message}")]
    Connection { message: String },

    /// The service answered with a non-success status.
    #[error("prediction service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The service answered success but the body was not a usable result.
    #[error("unusable response from the prediction service: {message}")]
    InvalidResponse { message: String },
}

/// The history store could not be written or read.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored line could not be parsed back into a record.
    #[error("corrupt history record at line {line}: {message}")]
    Corrupt { line: usize, message: String },
}

/// A submission failed before a prediction was obtained.
///
/// History failures are deliberately absent: once a prediction exists it is
/// returned to the caller even if the history write fails.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("form validation failed: {0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    Prediction(#[from] PredictError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_error_display() {
        let err = PredictError::Connection {
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "could not reach the prediction service: connection refused"
        );

        let err = PredictError::Status {
            status: 500,
            message: "model crashed".into(),
        };
        assert_eq!(
            err.to_string(),
            "prediction service returned HTTP 500: model crashed"
        );
    }

    #[test]
    fn test_history_error_display() {
        let err = HistoryError::Corrupt {
            line: 3,
            message: "expected value at column 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt history record at line 3: expected value at column 1"
        );
    }

    #[test]
    fn test_history_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: HistoryError = io_err.into();
        assert!(matches!(err, HistoryError::Io(_)));
    }

    #[test]
    fn test_submit_error_from_predict() {
        let err: SubmitError = PredictError::InvalidResponse {
            message: "not JSON".into(),
        }
        .into();
        assert!(matches!(err, SubmitError::Prediction(_)));
        assert_eq!(
            err.to_string(),
            "unusable response from the prediction service: not JSON"
        );
    }
}
