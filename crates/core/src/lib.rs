//! linkage-core: patient identity linkage for FHIR bundles
//!
//! Derives a stable, salted identifier from the normalized demographic
//! fields of every Patient in a Bundle and appends it to the patient's
//! identifier list. Nothing in this crate performs I/O or logs.

pub mod bundle;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod identifier;
pub mod link;
pub mod outcome;
pub mod patient;
pub mod resource;
pub mod schema;

// Re-export our types
pub use bundle::{Bundle, BundleEntry, BundleLink, BundleType};
pub use canonical::{LinkageString, canonicalize};
pub use digest::{HexDigest, Salt, digest};
pub use error::LinkageError;
pub use identifier::{LINKAGE_IDENTIFIER_SYSTEM, LINKAGE_IDENTIFIER_USE, attach};
pub use link::{EntryFailure, FailurePolicy, LinkOptions, LinkReport, link_bundle, link_patient};
pub use outcome::{IssueSeverity, IssueType, OperationOutcome, OperationOutcomeIssue};
pub use patient::{Address, HumanName, Identifier, Patient};
pub use resource::Resource;
