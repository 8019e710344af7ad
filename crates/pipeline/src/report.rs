//! Run report written at the end of a pipeline run

use chrono::{DateTime, Utc};
use linkage_core::{EntryFailure, OperationOutcome};
use serde::Serialize;
use uuid::Uuid;

/// Outcome of one bundle file
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BundleStatus {
    /// Every patient was linked and the bundle was written
    Linked,
    /// Written, but some patients were skipped
    Partial,
    /// Nothing was written
    Failed,
}

/// A problem found while processing a bundle
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_index: Option<usize>,
    pub outcome: OperationOutcome,
}

impl From<&EntryFailure> for BundleIssue {
    fn from(failure: &EntryFailure) -> Self {
        Self {
            entry_index: Some(failure.entry_index),
            outcome: failure.error.to_outcome(),
        }
    }
}

/// Per-bundle section of the run report
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleReport {
    pub file: String,
    pub status: BundleStatus,
    pub patients_linked: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<BundleIssue>,
}

impl BundleReport {
    pub fn failed(file: String, entry_index: Option<usize>, outcome: OperationOutcome) -> Self {
        Self {
            file,
            status: BundleStatus::Failed,
            patients_linked: 0,
            issues: vec![BundleIssue {
                entry_index,
                outcome,
            }],
        }
    }
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub bundles: Vec<BundleReport>,
}

impl RunReport {
    pub fn patients_linked(&self) -> usize {
        self.bundles.iter().map(|b| b.patients_linked).sum()
    }

    pub fn count(&self, status: BundleStatus) -> usize {
        self.bundles.iter().filter(|b| b.status == status).count()
    }

    /// True when any bundle was rejected or partially linked
    pub fn has_failures(&self) -> bool {
        self.bundles.iter().any(|b| b.status != BundleStatus::Linked)
    }
}
