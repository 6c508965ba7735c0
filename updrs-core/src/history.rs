//! Per-user append-only submission history.
//!
//! The [`RecordStore`] trait is the narrow interface over the external
//! document store: append one record with a store-assigned id and timestamp,
//! read back a user's records newest first. The in-memory implementation
//! backs tests; the JSONL implementation is the local persistence used by
//! the CLI.

use crate::error::HistoryError;
use crate::features::{FeatureRecord, Prediction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::Mutex;
use uuid::Uuid;

/// A submission waiting to be appended: the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub features: FeatureRecord,
    pub prediction: Prediction,
    /// Owner user id, or `None` for an unauthenticated submission.
    pub owner: Option<String>,
}

/// One stored submission: the feature values, the two scores, the owner,
/// and the store-assigned id and creation timestamp.
///
/// Immutable once appended; this system never deletes records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub features: FeatureRecord,
    #[serde(rename = "motor_UPDRS")]
    pub motor_updrs: f64,
    #[serde(rename = "total_UPDRS")]
    pub total_updrs: f64,
}

impl SubmissionRecord {
    fn assign(submission: NewSubmission) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: submission.owner,
            created_at: Utc::now(),
            features: submission.features,
            motor_updrs: submission.prediction.motor_updrs,
            total_updrs: submission.prediction.total_updrs,
        }
    }
}

/// Append-only record store, the external-collaborator seam.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append one record, assigning its id and creation timestamp.
    async fn append(&self, submission: NewSubmission) -> Result<SubmissionRecord, HistoryError>;

    /// All records owned by `owner`, newest first.
    ///
    /// `None` matches records appended without an owner. Timestamp ties are
    /// broken by record id so the order is deterministic.
    async fn for_user(&self, owner: Option<&str>) -> Result<Vec<SubmissionRecord>, HistoryError>;
}

fn sort_newest_first(records: &mut [SubmissionRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<SubmissionRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored records, all owners included.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn append(&self, submission: NewSubmission) -> Result<SubmissionRecord, HistoryError> {
        let record = SubmissionRecord::assign(submission);
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn for_user(&self, owner: Option<&str>) -> Result<Vec<SubmissionRecord>, HistoryError> {
        let records = self.records.lock().await;
        let mut matching: Vec<_> = records
            .iter()
            .filter(|r| r.user_id.as_deref() == owner)
            .cloned()
            .collect();
        sort_newest_first(&mut matching);
        Ok(matching)
    }
}

/// JSON-lines file store: one record per line, append-only.
///
/// Parent directories are created on demand. A line that no longer parses
/// surfaces as [`HistoryError::Corrupt`] on read rather than being silently
/// skipped.
pub struct JsonlRecordStore {
    path: PathBuf,
}

impl JsonlRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<SubmissionRecord>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let mut records = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record =
                serde_json::from_str(line).map_err(|e| HistoryError::Corrupt {
                    line: i + 1,
                    message: e.to_string(),
                })?;
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl RecordStore for JsonlRecordStore {
    async fn append(&self, submission: NewSubmission) -> Result<SubmissionRecord, HistoryError> {
        let record = SubmissionRecord::assign(submission);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        Ok(record)
    }

    async fn for_user(&self, owner: Option<&str>) -> Result<Vec<SubmissionRecord>, HistoryError> {
        let mut records = self.read_all()?;
        records.retain(|r| r.user_id.as_deref() == owner);
        sort_newest_first(&mut records);
        Ok(records)
    }
}
