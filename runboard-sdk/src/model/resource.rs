use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const LAST_APPLIED_CONFIGURATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// A Kubernetes-style object as returned by the cluster API.
///
/// Unknown top-level keys are kept in `extension_data` and serialized after
/// `spec`, in the order they were read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    #[serde(rename = "kind")]
    pub kind: String,

    pub metadata: ObjectMeta,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,

    #[serde(flatten)]
    pub extension_data: Map<String, Value>,
}

/// Object metadata.
///
/// Field declaration order is the serialization order, which is also the
/// order re-run documents are emitted in: `annotations`, `labels`,
/// `namespace`, `generateName`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ObjectMeta {
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "annotations", skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Map<String, Value>>,

    #[serde(rename = "labels", skip_serializing_if = "Option::is_none")]
    pub labels: Option<IndexMap<String, String>>,

    #[serde(rename = "namespace", skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(rename = "generateName", skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,

    #[serde(rename = "uid", skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(rename = "resourceVersion", skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,

    #[serde(rename = "creationTimestamp", skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,

    #[serde(flatten)]
    pub extension_data: Map<String, Value>,
}

impl Resource {
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// `namespace/name`, falling back to `generateName` for objects that
    /// have not been created yet.
    pub fn display_name(&self) -> String {
        let name = self.metadata.name.as_deref()
            .or(self.metadata.generate_name.as_deref())
            .unwrap_or("");

        match self.metadata.namespace.as_deref() {
            Some(namespace) => format!("{}/{}", namespace, name),
            None => name.to_string(),
        }
    }
}
