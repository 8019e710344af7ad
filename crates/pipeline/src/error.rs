//! Application error handling

use std::path::PathBuf;

use linkage_core::{EntryFailure, IssueType, OperationOutcome};
use serde_json::error::Category;
use thiserror::Error;

use crate::config::ConfigError;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendered from the error category and position only; serde's own
    /// message can quote patient field values.
    #[error("Invalid bundle JSON: {} error at line {}, column {}", category(.0), .0.line(), .0.column())]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Rejected(#[from] EntryFailure),

    #[error("Worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Shutdown requested")]
    Interrupted,
}

impl AppError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// Bundle entry that caused the error, when there is one
    pub fn entry_index(&self) -> Option<usize> {
        match self {
            AppError::Rejected(failure) => Some(failure.entry_index),
            _ => None,
        }
    }

    /// Render this error as an OperationOutcome for the run report
    pub fn to_outcome(&self) -> OperationOutcome {
        match self {
            AppError::Rejected(failure) => failure.error.to_outcome(),
            AppError::Json(_) => OperationOutcome::invalid(&self.to_string()),
            _ => OperationOutcome::error(IssueType::Exception, &self.to_string()),
        }
    }
}

fn category(err: &serde_json::Error) -> &'static str {
    match err.classify() {
        Category::Io => "I/O",
        Category::Syntax => "syntax",
        Category::Data => "data",
        Category::Eof => "unexpected end of input",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkage_core::{Bundle, LinkageError};

    #[test]
    fn json_error_omits_field_values() {
        let raw = r#"{"resourceType": "Bundle", "type": "collection", "entry": [
            {"resource": {"resourceType": "Patient", "name": [{"given": "Jane"}]}}
        ]}"#;
        let err = AppError::from(serde_json::from_str::<Bundle>(raw).unwrap_err());

        let message = err.to_string();
        assert!(message.starts_with("Invalid bundle JSON: data error at line "));
        assert!(!message.contains("Jane"));
        assert_eq!(err.to_outcome().issue[0].code, IssueType::Invalid);
    }

    #[test]
    fn syntax_error_reports_position() {
        let err = AppError::from(serde_json::from_str::<Bundle>("{ not json").unwrap_err());
        assert!(err.to_string().starts_with("Invalid bundle JSON: syntax error at line 1, column "));
    }

    #[test]
    fn rejected_bundle_keeps_entry_index() {
        let err = AppError::from(EntryFailure {
            entry_index: 4,
            error: LinkageError::MalformedRecord("missing required field `birthDate`".into()),
        });
        assert_eq!(err.entry_index(), Some(4));
        assert_eq!(err.to_outcome().issue[0].code, IssueType::Required);
    }
}
