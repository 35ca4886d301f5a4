use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ClientError, ClientResult, ResourceClient, ResourceKind, ALL_NAMESPACES};

const NAME_SUFFIX_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";
const NAME_SUFFIX_LENGTH: usize = 5;

/// Resource client backed by a map, for tests and offline use.
///
/// Objects are keyed `{namespace}/{plural}/{name}`. Creation fills in the
/// server-side fields (`name` from `generateName`, `uid`, `resourceVersion`,
/// `creationTimestamp`) the way an API server would.
pub struct InMemoryResourceClient {
    data: RwLock<BTreeMap<String, Value>>,
    revision: AtomicU64,
}

impl Default for InMemoryResourceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryResourceClient {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            revision: AtomicU64::new(1),
        }
    }

    /// Stores an object as-is, replacing any object with the same key.
    pub async fn insert(&self, object: Value) -> ClientResult<()> {
        let kind = ResourceKind::from_object(&object)?;
        let namespace = metadata_str(&object, "namespace").unwrap_or_default().to_string();
        let name = metadata_str(&object, "name")
            .ok_or_else(|| ClientError::InvalidPayload("missing metadata.name".to_string()))?
            .to_string();

        let mut data = self.data.write().await;
        data.insert(store_key(&namespace, &kind.plural, &name), object);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    fn next_revision(&self) -> String {
        self.revision.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

fn store_key(namespace: &str, plural: &str, name: &str) -> String {
    format!("{}/{}/{}", namespace, plural, name)
}

fn metadata_str<'a>(object: &'a Value, field: &str) -> Option<&'a str> {
    object.get("metadata")?.get(field)?.as_str().filter(|s| !s.is_empty())
}

fn qualified_name(kind: &ResourceKind) -> String {
    match &kind.group {
        Some(group) => format!("{}.{}", kind.plural, group),
        None => kind.plural.clone(),
    }
}

fn random_suffix() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(NAME_SUFFIX_LENGTH)
        .map(|b| NAME_SUFFIX_ALPHABET[*b as usize % NAME_SUFFIX_ALPHABET.len()] as char)
        .collect()
}

/// Matches `key=value`, `key==value`, `key!=value` and bare `key` selectors.
fn matches_selector(object: &Value, selector: &str) -> bool {
    let labels = object.get("metadata").and_then(|m| m.get("labels"));
    let label = |key: &str| labels.and_then(|l| l.get(key.trim())).and_then(Value::as_str);

    if let Some((key, value)) = selector.split_once("!=") {
        return label(key) != Some(value.trim());
    }
    if let Some((key, value)) = selector.split_once('=') {
        let value = value.trim_start_matches('=').trim();
        return label(key) == Some(value);
    }

    label(selector).is_some()
}

#[async_trait]
impl ResourceClient for InMemoryResourceClient {
    async fn get_resource(&self, kind: &ResourceKind, namespace: &str, name: &str) -> ClientResult<Value> {
        let data = self.data.read().await;

        data.get(&store_key(namespace, &kind.plural, name))
            .cloned()
            .ok_or_else(|| ClientError::api_error(
                404,
                format!("{} \"{}\" not found", qualified_name(kind), name),
            ))
    }

    async fn list_resources(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        filters: &[String],
    ) -> ClientResult<Value> {
        let namespace = namespace.filter(|ns| *ns != ALL_NAMESPACES && !ns.is_empty());
        let data = self.data.read().await;

        let items = data.iter()
            .filter(|(key, _)| {
                let mut parts = key.splitn(3, '/');
                let key_namespace = parts.next().unwrap_or_default();
                let key_plural = parts.next().unwrap_or_default();
                key_plural == kind.plural && namespace.map_or(true, |ns| ns == key_namespace)
            })
            .map(|(_, object)| object)
            .filter(|object| filters.iter().all(|selector| matches_selector(object, selector)))
            .cloned()
            .collect::<Vec<_>>();

        Ok(json!({
            "apiVersion": kind.api_version(),
            "kind": format!("{}List", kind.kind),
            "items": items,
        }))
    }

    async fn create_resource(&self, namespace: &str, payload: &Value) -> ClientResult<Value> {
        let kind = ResourceKind::from_object(payload)?;
        let mut object = payload.clone();

        let metadata = object.as_object_mut()
            .ok_or_else(|| ClientError::InvalidPayload("object expected".to_string()))?
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| ClientError::InvalidPayload("metadata must be a mapping".to_string()))?;

        match metadata.get("namespace").and_then(Value::as_str) {
            Some(ns) if !ns.is_empty() && ns != namespace => {
                return Err(ClientError::api_error(
                    400,
                    "the namespace of the provided object does not match the namespace sent on the request",
                ));
            }
            _ => {
                metadata.insert("namespace".to_string(), Value::from(namespace));
            }
        }

        let name = match metadata.get("name").and_then(Value::as_str).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => {
                let prefix = metadata.get("generateName")
                    .and_then(Value::as_str)
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| ClientError::api_error(
                        422,
                        format!("{} is invalid: metadata.name: Required value: name or generateName is required", kind.kind),
                    ))?;
                let name = format!("{}{}", prefix, random_suffix());
                metadata.insert("name".to_string(), Value::from(name.as_str()));
                name
            }
        };

        metadata.insert("uid".to_string(), Value::from(Uuid::new_v4().to_string()));
        metadata.insert("resourceVersion".to_string(), Value::from(self.next_revision()));
        metadata.insert(
            "creationTimestamp".to_string(),
            Value::from(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
        );

        let key = store_key(namespace, &kind.plural, &name);
        let mut data = self.data.write().await;

        if data.contains_key(&key) {
            return Err(ClientError::api_error(
                409,
                format!("{} \"{}\" already exists", qualified_name(&kind), name),
            ));
        }

        tracing::debug!("Created {}", key);
        data.insert(key, object.clone());

        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn run(namespace: &str, name: &str, app: &str) -> Value {
        json!({
            "apiVersion": "tekton.dev/v1beta1",
            "kind": "PipelineRun",
            "metadata": { "name": name, "namespace": namespace, "labels": { "app": app } },
            "spec": { "pipelineRef": { "name": "simple" } }
        })
    }

    #[tokio::test]
    async fn test_get_and_not_found() {
        let client = InMemoryResourceClient::new();
        client.insert(run("ci", "build", "web")).await.unwrap();

        let found = client.get_resource(&ResourceKind::pipeline_run(), "ci", "build").await.unwrap();
        assert_eq!(found, run("ci", "build", "web"));

        let err = client.get_resource(&ResourceKind::pipeline_run(), "ci", "missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "pipelineruns.tekton.dev \"missing\" not found (error code 404)");
    }

    #[tokio::test]
    async fn test_list_by_namespace_and_labels() {
        let client = InMemoryResourceClient::new();
        client.insert(run("ci", "a", "web")).await.unwrap();
        client.insert(run("ci", "b", "api")).await.unwrap();
        client.insert(run("prod", "c", "web")).await.unwrap();

        let kind = ResourceKind::pipeline_run();

        let ci = client.list_resources(&kind, Some("ci"), &[]).await.unwrap();
        assert_eq!(ci["kind"], "PipelineRunList");
        assert_eq!(ci["items"].as_array().unwrap().len(), 2);

        let web = client.list_resources(&kind, Some(ALL_NAMESPACES), &["app=web".to_string()]).await.unwrap();
        let names: Vec<&str> = web["items"].as_array().unwrap()
            .iter()
            .map(|item| item["metadata"]["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a", "c"]);

        let not_web = client.list_resources(&kind, None, &["app!=web".to_string()]).await.unwrap();
        assert_eq!(not_web["items"].as_array().unwrap().len(), 1);

        let task_runs = client.list_resources(&ResourceKind::task_run(), None, &[]).await.unwrap();
        assert_eq!(task_runs["items"], json!([]));
    }

    #[tokio::test]
    async fn test_create_from_generate_name() {
        let client = InMemoryResourceClient::new();
        let payload = json!({
            "apiVersion": "tekton.dev/v1beta1",
            "kind": "PipelineRun",
            "metadata": { "generateName": "build-r-", "namespace": "ci" },
            "spec": {}
        });

        let created = client.create_resource("ci", &payload).await.unwrap();
        let name = created["metadata"]["name"].as_str().unwrap();

        assert!(name.starts_with("build-r-"));
        assert_eq!(name.len(), "build-r-".len() + NAME_SUFFIX_LENGTH);
        assert!(created["metadata"]["uid"].is_string());
        assert!(created["metadata"]["resourceVersion"].is_string());
        assert!(created["metadata"]["creationTimestamp"].is_string());

        let stored = client.get_resource(&ResourceKind::pipeline_run(), "ci", name).await.unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_create_sets_namespace_and_rejects_conflicts() {
        let client = InMemoryResourceClient::new();
        let payload = json!({ "apiVersion": "v1", "kind": "ConfigMap", "metadata": { "name": "settings" } });

        let created = client.create_resource("ci", &payload).await.unwrap();
        assert_eq!(created["metadata"]["namespace"], "ci");

        let err = client.create_resource("ci", &payload).await.unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.to_string(), "configmaps \"settings\" already exists (error code 409)");

        let mismatched = json!({ "apiVersion": "v1", "kind": "ConfigMap", "metadata": { "name": "x", "namespace": "prod" } });
        assert_eq!(client.create_resource("ci", &mismatched).await.unwrap_err().status(), Some(400));
    }

    #[tokio::test]
    async fn test_create_requires_a_name() {
        let client = InMemoryResourceClient::new();
        let payload = json!({ "apiVersion": "tekton.dev/v1beta1", "kind": "TaskRun", "metadata": {} });

        let err = client.create_resource("ci", &payload).await.unwrap_err();

        assert_eq!(err.status(), Some(422));
        assert!(client.is_empty().await);
    }
}
