//! Core library for the UPDRS severity prediction client.
//!
//! Implements the feature validation and submission pipeline: raw
//! user-entered strings become a validated numeric feature vector, the
//! vector goes to a remote predictor, and the result is reconciled with a
//! per-user history log. The remote predictor and the record store are
//! external collaborators behind the [`Predictor`] and [`RecordStore`]
//! traits; who is submitting comes from an [`IdentityProvider`].

pub mod config;
pub mod error;
pub mod features;
pub mod history;
pub mod identity;
pub mod predict;
pub mod submit;
pub mod validate;

pub use config::{load_config, AppConfig, GatewayConfig};
pub use error::{HistoryError, PredictError, SubmitError};
pub use features::{
    FeatureForm, FeatureKey, FeatureRecord, FeatureSpec, Prediction, FEATURES, FEATURE_GROUPS,
};
pub use history::{
    JsonlRecordStore, MemoryRecordStore, NewSubmission, RecordStore, SubmissionRecord,
};
pub use identity::{IdentityProvider, StaticIdentity};
pub use predict::{HttpPredictor, MockPredictor, Predictor};
pub use submit::{SubmissionOutcome, Submitter};
pub use validate::{validate, FieldErrors};
