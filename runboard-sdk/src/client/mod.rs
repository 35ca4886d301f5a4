pub mod http;
pub mod in_memory;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Namespace value meaning "every namespace".
pub const ALL_NAMESPACES: &str = "*";

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success response from the API server. Displays as the message
    /// shown to users when a submission fails.
    #[error("{}", submission_message(*status, body))]
    Api { status: u16, body: String },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid response: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub fn api_error(status: u16, body: impl Into<String>) -> Self {
        Self::Api { status, body: body.into() }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// `"<body> (error code <status>)"`, or `"error code <status>"` without a body.
pub fn submission_message(status: u16, body: &str) -> String {
    if body.is_empty() {
        format!("error code {}", status)
    } else {
        format!("{} (error code {})", body, status)
    }
}

/// A resource type served by the API, e.g. `tekton.dev/v1beta1` PipelineRuns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceKind {
    pub group: Option<String>,
    pub version: String,
    pub plural: String,
    pub kind: String,
}

impl ResourceKind {
    pub fn new(group: Option<&str>, version: &str, kind: &str) -> Self {
        Self {
            group: group.map(str::to_string),
            version: version.to_string(),
            plural: format!("{}s", kind.to_lowercase()),
            kind: kind.to_string(),
        }
    }

    fn tekton(kind: &str) -> Self {
        Self::new(Some("tekton.dev"), "v1beta1", kind)
    }

    fn core(kind: &str) -> Self {
        Self::new(None, "v1", kind)
    }

    pub fn pipeline_run() -> Self {
        Self::tekton("PipelineRun")
    }

    pub fn task_run() -> Self {
        Self::tekton("TaskRun")
    }

    /// Resolves a user-facing name such as `pipelinerun`, `prs` or `pvc`.
    pub fn from_alias(alias: &str) -> Option<Self> {
        let kind = match alias.to_lowercase().as_str() {
            "pipelinerun" | "pipelineruns" | "pr" | "prs" => Self::pipeline_run(),
            "taskrun" | "taskruns" | "tr" | "trs" => Self::task_run(),
            "pipeline" | "pipelines" | "p" => Self::tekton("Pipeline"),
            "task" | "tasks" | "t" => Self::tekton("Task"),
            "secret" | "secrets" => Self::core("Secret"),
            "configmap" | "configmaps" | "cm" => Self::core("ConfigMap"),
            "persistentvolumeclaim" | "persistentvolumeclaims" | "pvc" => Self::core("PersistentVolumeClaim"),
            _ => return None,
        };

        Some(kind)
    }

    /// Derives the kind from an object's `apiVersion` and `kind` fields.
    pub fn from_object(payload: &Value) -> ClientResult<Self> {
        let api_version = payload.get("apiVersion")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ClientError::InvalidPayload("missing apiVersion".to_string()))?;

        let kind = payload.get("kind")
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ClientError::InvalidPayload("missing kind".to_string()))?;

        Ok(match api_version.split_once('/') {
            Some((group, version)) => Self::new(Some(group), version, kind),
            None => Self::new(None, api_version, kind),
        })
    }

    pub fn api_version(&self) -> String {
        match &self.group {
            Some(group) => format!("{}/{}", group, self.version),
            None => self.version.clone(),
        }
    }

    /// Path of the collection, across all namespaces when `namespace` is
    /// `None` or [`ALL_NAMESPACES`].
    pub fn collection_path(&self, namespace: Option<&str>) -> String {
        let prefix = match &self.group {
            Some(group) => format!("/apis/{}/{}", group, self.version),
            None => format!("/api/{}", self.version),
        };

        match namespace.filter(|ns| *ns != ALL_NAMESPACES && !ns.is_empty()) {
            Some(namespace) => format!("{}/namespaces/{}/{}", prefix, namespace, self.plural),
            None => format!("{}/{}", prefix, self.plural),
        }
    }

    pub fn resource_path(&self, namespace: &str, name: &str) -> String {
        format!("{}/{}", self.collection_path(Some(namespace)), name)
    }
}

#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn get_resource(&self, kind: &ResourceKind, namespace: &str, name: &str) -> ClientResult<Value>;

    /// Lists a collection. Non-empty `filters` are `key=value` label
    /// selectors that all have to match.
    async fn list_resources(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        filters: &[String],
    ) -> ClientResult<Value>;

    /// Creates `payload` in `namespace`; the collection is derived from the
    /// payload's `apiVersion` and `kind`.
    async fn create_resource(&self, namespace: &str, payload: &Value) -> ClientResult<Value>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_submission_message() {
        assert_eq!(submission_message(404, "Whoops!"), "Whoops! (error code 404)");
        assert_eq!(submission_message(500, ""), "error code 500");
        assert_eq!(ClientError::api_error(409, "exists").to_string(), "exists (error code 409)");
    }

    #[test]
    fn test_paths() {
        let runs = ResourceKind::pipeline_run();
        assert_eq!(runs.collection_path(Some("ci")), "/apis/tekton.dev/v1beta1/namespaces/ci/pipelineruns");
        assert_eq!(runs.collection_path(Some(ALL_NAMESPACES)), "/apis/tekton.dev/v1beta1/pipelineruns");
        assert_eq!(runs.resource_path("ci", "build"), "/apis/tekton.dev/v1beta1/namespaces/ci/pipelineruns/build");

        let secrets = ResourceKind::from_alias("secrets").unwrap();
        assert_eq!(secrets.collection_path(None), "/api/v1/secrets");
        assert_eq!(ResourceKind::from_alias("PVC").unwrap().plural, "persistentvolumeclaims");
        assert_eq!(ResourceKind::from_alias("widgets"), None);
    }

    #[test]
    fn test_kind_from_object() {
        let kind = ResourceKind::from_object(&json!({ "apiVersion": "tekton.dev/v1", "kind": "TaskRun" })).unwrap();
        assert_eq!(kind.group.as_deref(), Some("tekton.dev"));
        assert_eq!(kind.version, "v1");
        assert_eq!(kind.plural, "taskruns");
        assert_eq!(kind.api_version(), "tekton.dev/v1");

        let core = ResourceKind::from_object(&json!({ "apiVersion": "v1", "kind": "ConfigMap" })).unwrap();
        assert_eq!(core.collection_path(Some("ci")), "/api/v1/namespaces/ci/configmaps");

        assert!(matches!(
            ResourceKind::from_object(&json!({ "kind": "PipelineRun" })),
            Err(ClientError::InvalidPayload(_))
        ));
    }
}
