//! Bundle walker: canonicalize, digest and attach for every Patient entry

use crate::bundle::Bundle;
use crate::canonical::canonicalize;
use crate::digest::{HexDigest, Salt, digest};
use crate::error::LinkageError;
use crate::identifier::attach;
use crate::patient::Patient;
use crate::schema::validate_patient;
use thiserror::Error;

/// What to do when a patient in a bundle cannot be linked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Reject the whole bundle; no patient in it is modified.
    #[default]
    FailFast,
    /// Link every patient that can be linked and report the rest.
    SkipAndCollect,
}

/// Options for [`link_bundle`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkOptions {
    pub policy: FailurePolicy,
    /// Run the strict fhir-sdk schema check on each patient first.
    pub validate_schema: bool,
}

/// A patient entry that could not be linked
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Entry {entry_index}: {error}")]
pub struct EntryFailure {
    /// Index of the entry within `bundle.entry`
    pub entry_index: usize,
    #[source]
    pub error: LinkageError,
}

/// Result of linking one bundle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Number of patients that received an identifier
    pub linked: usize,
    /// Patients skipped under `SkipAndCollect`, in entry order
    pub failures: Vec<EntryFailure>,
}

impl LinkReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Compute the digest for a patient without modifying it.
///
/// Also checks that the identifier list exists, so a successful result
/// guarantees the following [`attach`] cannot fail.
fn prepare(patient: &Patient, salt: &Salt, options: &LinkOptions) -> Result<HexDigest, LinkageError> {
    if options.validate_schema {
        validate_patient(patient)?;
    }
    let linkage = canonicalize(patient)?;
    if patient.identifier.is_none() {
        return Err(LinkageError::missing("identifier"));
    }
    Ok(digest(&linkage, salt))
}

/// Link a single patient: canonicalize, digest, then append the identifier.
///
/// On error the patient is left unchanged.
pub fn link_patient(patient: &mut Patient, salt: &Salt) -> Result<HexDigest, LinkageError> {
    let hex = prepare(patient, salt, &LinkOptions::default())?;
    attach(patient, hex.clone())?;
    Ok(hex)
}

/// Link every Patient entry of a bundle, in entry order.
///
/// Non-patient entries are not touched, and no entry is added, removed or
/// reordered. Under [`FailurePolicy::FailFast`] all digests are computed
/// before the first identifier is appended, so an `Err` return means the
/// bundle is exactly as it was passed in. The error names the first entry
/// that could not be linked.
pub fn link_bundle(
    bundle: &mut Bundle,
    salt: &Salt,
    options: &LinkOptions,
) -> Result<LinkReport, EntryFailure> {
    let mut ready = Vec::new();
    let mut report = LinkReport::default();

    for (entry_index, entry) in bundle.entry.iter().enumerate() {
        let Some(patient) = entry.resource.as_patient() else {
            continue;
        };
        match prepare(patient, salt, options) {
            Ok(hex) => ready.push((entry_index, hex)),
            Err(error) => match options.policy {
                FailurePolicy::FailFast => return Err(EntryFailure { entry_index, error }),
                FailurePolicy::SkipAndCollect => {
                    report.failures.push(EntryFailure { entry_index, error })
                }
            },
        }
    }

    for (entry_index, hex) in ready {
        if let Some(patient) = bundle.entry[entry_index].resource.as_patient_mut() {
            attach(patient, hex).map_err(|error| EntryFailure { entry_index, error })?;
            report.linked += 1;
        }
    }

    Ok(report)
}
