//! The submission pipeline: validate, predict, then best-effort history.
//!
//! One logical task per submission. The only suspension points are the
//! prediction call and the history append, strictly in that order: field
//! errors never reach the network, and the history store is never touched
//! unless a prediction was obtained. A history failure does not take the
//! prediction away from the caller.

use crate::error::{HistoryError, SubmitError};
use crate::features::{FeatureForm, FeatureRecord, Prediction};
use crate::history::{NewSubmission, RecordStore, SubmissionRecord};
use crate::identity::IdentityProvider;
use crate::predict::Predictor;
use crate::validate::validate;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a successful submission.
///
/// `record` is present when the history append succeeded; otherwise
/// `history_error` explains the soft failure. Exactly one of the two is set.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub features: FeatureRecord,
    pub prediction: Prediction,
    pub record: Option<SubmissionRecord>,
    pub history_error: Option<HistoryError>,
}

/// Runs submissions against a predictor, a record store, and an identity
/// provider, all injected as trait objects.
pub struct Submitter {
    predictor: Arc<dyn Predictor>,
    store: Arc<dyn RecordStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl Submitter {
    pub fn new(
        predictor: Arc<dyn Predictor>,
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            predictor,
            store,
            identity,
        }
    }

    /// Run one submission end to end.
    ///
    /// Returns `Err` only when there is no prediction to show: the form
    /// failed validation, or the prediction service was unavailable. The
    /// caller keeps the entered form either way.
    pub async fn submit(&self, form: &FeatureForm) -> Result<SubmissionOutcome, SubmitError> {
        let features = validate(form).map_err(SubmitError::Validation)?;

        let prediction = self.predictor.predict(&features).await?;
        debug!(
            motor_updrs = prediction.motor_updrs,
            total_updrs = prediction.total_updrs,
            "prediction obtained"
        );

        let owner = self.identity.current_user();
        let submission = NewSubmission {
            features: features.clone(),
            prediction,
            owner,
        };

        match self.store.append(submission).await {
            Ok(record) => Ok(SubmissionOutcome {
                features,
                prediction,
                record: Some(record),
                history_error: None,
            }),
            Err(e) => {
                warn!(error = %e, "failed to save submission to history");
                Ok(SubmissionOutcome {
                    features,
                    prediction,
                    record: None,
                    history_error: Some(e),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictError;
    use crate::features::FeatureKey;
    use crate::history::MemoryRecordStore;
    use crate::identity::StaticIdentity;
    use crate::predict::MockPredictor;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    /// A store whose appends always fail, for exercising the soft path.
    struct BrokenStore;

    #[async_trait]
    impl RecordStore for BrokenStore {
        async fn append(
            &self,
            _submission: NewSubmission,
        ) -> Result<SubmissionRecord, HistoryError> {
            Err(HistoryError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "store offline",
            )))
        }

        async fn for_user(
            &self,
            _owner: Option<&str>,
        ) -> Result<Vec<SubmissionRecord>, HistoryError> {
            Ok(Vec::new())
        }
    }

    fn sample_prediction() -> Prediction {
        Prediction {
            motor_updrs: 21.348,
            total_updrs: 28.915,
        }
    }

    #[tokio::test]
    async fn test_successful_submission_is_stored() {
        let predictor = Arc::new(MockPredictor::returning(sample_prediction()));
        let store = Arc::new(MemoryRecordStore::new());
        let submitter = Submitter::new(
            predictor.clone(),
            store.clone(),
            Arc::new(StaticIdentity::new(Some("u1".into()))),
        );

        let outcome = submitter.submit(&FeatureForm::sample()).await.unwrap();
        assert_eq!(outcome.prediction, sample_prediction());
        assert!(outcome.history_error.is_none());

        let record = outcome.record.unwrap();
        assert_eq!(record.user_id.as_deref(), Some("u1"));
        assert_eq!(record.motor_updrs, 21.348);
        assert_eq!(store.len().await, 1);
        assert_eq!(predictor.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_network_or_store() {
        let predictor = Arc::new(MockPredictor::returning(sample_prediction()));
        let store = Arc::new(MemoryRecordStore::new());
        let submitter = Submitter::new(
            predictor.clone(),
            store.clone(),
            Arc::new(StaticIdentity::anonymous()),
        );

        let mut form = FeatureForm::sample();
        form.set(FeatureKey::Age, "150");
        let err = submitter.submit(&form).await.unwrap_err();
        match err {
            SubmitError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors.get(FeatureKey::Age), Some("Age must be ≤ 120"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(predictor.calls(), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_prediction_failure_skips_history() {
        let predictor = Arc::new(MockPredictor::failing(PredictError::Status {
            status: 500,
            message: "model crashed".into(),
        }));
        let store = Arc::new(MemoryRecordStore::new());
        let submitter = Submitter::new(
            predictor.clone(),
            store.clone(),
            Arc::new(StaticIdentity::anonymous()),
        );

        let err = submitter.submit(&FeatureForm::sample()).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Prediction(PredictError::Status { status: 500, .. })
        ));
        assert_eq!(predictor.calls(), 1);
        assert!(store.is_empty().await, "history must not be written");
    }

    #[tokio::test]
    async fn test_history_failure_is_soft() {
        let submitter = Submitter::new(
            Arc::new(MockPredictor::returning(sample_prediction())),
            Arc::new(BrokenStore),
            Arc::new(StaticIdentity::new(Some("u1".into()))),
        );

        let outcome = submitter.submit(&FeatureForm::sample()).await.unwrap();
        // The prediction survives the failed write.
        assert_eq!(outcome.prediction, sample_prediction());
        assert!(outcome.record.is_none());
        let history_error = outcome.history_error.unwrap();
        assert!(matches!(history_error, HistoryError::Io(_)));
    }

    #[tokio::test]
    async fn test_anonymous_submission_has_no_owner() {
        let store = Arc::new(MemoryRecordStore::new());
        let submitter = Submitter::new(
            Arc::new(MockPredictor::returning(sample_prediction())),
            store.clone(),
            Arc::new(StaticIdentity::anonymous()),
        );

        let outcome = submitter.submit(&FeatureForm::sample()).await.unwrap();
        assert_eq!(outcome.record.unwrap().user_id, None);
        assert_eq!(store.for_user(None).await.unwrap().len(), 1);
    }
}
