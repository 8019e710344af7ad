use crate::outcome::{IssueType, OperationOutcome};
use thiserror::Error;

/// Identity linkage error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkageError {
    /// A field the linkage string or identifier list depends on is absent.
    #[error("Malformed patient record: {0}")]
    MalformedRecord(String),

    /// Text could not be turned into bytes for hashing.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

const SCHEMA_VIOLATION: &str = "schema violation";

impl LinkageError {
    pub(crate) fn missing(field: &str) -> Self {
        LinkageError::MalformedRecord(format!("missing required field `{}`", field))
    }

    /// The underlying serde message is dropped: it quotes field values.
    pub(crate) fn schema(_source: serde_json::Error) -> Self {
        LinkageError::MalformedRecord(format!(
            "{}: patient does not conform to the R4B Patient model",
            SCHEMA_VIOLATION
        ))
    }

    /// Render this error as an OperationOutcome for the caller's reporting.
    pub fn to_outcome(&self) -> OperationOutcome {
        match self {
            LinkageError::MalformedRecord(msg) if msg.starts_with(SCHEMA_VIOLATION) => {
                OperationOutcome::error(IssueType::Structure, &self.to_string())
            }
            LinkageError::MalformedRecord(_) => {
                OperationOutcome::error(IssueType::Required, &self.to_string())
            }
            LinkageError::Encoding(_) => {
                OperationOutcome::error(IssueType::Exception, &self.to_string())
            }
        }
    }
}
