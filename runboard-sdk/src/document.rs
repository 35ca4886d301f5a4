//! Validation of user-edited run documents before they are submitted.

use serde_json::Value;
use thiserror::Error;

use crate::yaml;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunDocumentError {
    #[error("{kind} cannot be empty")]
    EmptyInput { kind: String },

    /// The parser's message, shown as-is.
    #[error("{0}")]
    Parse(String),

    #[error("Namespace cannot be empty")]
    MissingNamespace,
}

/// A parsed document that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunDocument {
    pub namespace: String,
    pub payload: Value,
}

/// Parses the document text without checking its namespace.
///
/// `kind` only labels the empty-input message ("PipelineRun cannot be empty").
pub fn parse_document(kind: &str, text: &str) -> Result<Value, RunDocumentError> {
    if text.is_empty() {
        return Err(RunDocumentError::EmptyInput { kind: kind.to_string() });
    }

    // A blank document holds no value at all.
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    yaml::from_str(text).map_err(|e| RunDocumentError::Parse(e.to_string()))
}

/// `metadata.namespace` of a parsed document, if it is a non-empty string.
pub fn document_namespace(payload: &Value) -> Result<&str, RunDocumentError> {
    payload.get("metadata")
        .and_then(|metadata| metadata.get("namespace"))
        .and_then(Value::as_str)
        .filter(|namespace| !namespace.is_empty())
        .ok_or(RunDocumentError::MissingNamespace)
}

/// Runs every check in order: empty text, YAML syntax, namespace.
pub fn parse_run_document(kind: &str, text: &str) -> Result<RunDocument, RunDocumentError> {
    let payload = parse_document(kind, text)?;
    let namespace = document_namespace(&payload)?.to_string();

    Ok(RunDocument { namespace, payload })
}
