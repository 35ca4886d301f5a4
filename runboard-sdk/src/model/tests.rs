use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use crate::model::resource::{ObjectMeta, Resource};

#[test]
fn test_resource_serialization() {
    let mut resource = Resource {
        api_version: "tekton.dev/v1beta1".to_string(),
        kind: "PipelineRun".to_string(),
        metadata: ObjectMeta {
            name: Some("build-main".to_string()),
            namespace: Some("ci".to_string()),
            uid: Some("123e4567-e89b-12d3-a456-426614174000".to_string()),
            resource_version: Some("4711".to_string()),
            creation_timestamp: Some("2024-05-01T10:00:00Z".to_string()),
            labels: Some(IndexMap::from([("app".to_string(), "web".to_string())])),
            annotations: Some(Map::from_iter([("owner".to_string(), json!("dev-team"))])),
            ..Default::default()
        },
        spec: Some(json!({ "pipelineRef": { "name": "build" } })),
        status: None,
        extension_data: Map::new(),
    };

    resource.metadata.extension_data.insert("finalizers".to_string(), json!(["cleanup"]));

    let serialized = serde_json::to_string_pretty(&resource).unwrap();

    let expected_json = json!({
        "apiVersion": "tekton.dev/v1beta1",
        "kind": "PipelineRun",
        "metadata": {
            "name": "build-main",
            "annotations": {
                "owner": "dev-team"
            },
            "labels": {
                "app": "web"
            },
            "namespace": "ci",
            "uid": "123e4567-e89b-12d3-a456-426614174000",
            "resourceVersion": "4711",
            "creationTimestamp": "2024-05-01T10:00:00Z",
            "finalizers": [
                "cleanup"
            ]
        },
        "spec": {
            "pipelineRef": { "name": "build" }
        }
    });

    println!("Serialized JSON: {}", serialized);

    let actual_json: Value = serde_json::from_str(&serialized).unwrap();

    assert_eq!(expected_json, actual_json);
}

#[test]
fn test_resource_keeps_unknown_fields_and_order() {
    let value = json!({
        "apiVersion": "tekton.dev/v1beta1",
        "kind": "TaskRun",
        "metadata": {
            "name": "unit",
            "labels": { "zeta": "1", "alpha": "2" },
            "ownerReferences": [{ "kind": "PipelineRun", "name": "parent" }]
        },
        "spec": { "taskRef": { "name": "unit-tests" } },
        "status": { "podName": "unit-pod" },
        "x-extra": true
    });

    let resource = Resource::from_value(value).unwrap();

    assert_eq!(resource.metadata.name.as_deref(), Some("unit"));
    assert_eq!(resource.status, Some(json!({ "podName": "unit-pod" })));
    assert!(resource.metadata.extension_data.contains_key("ownerReferences"));
    assert_eq!(resource.extension_data.get("x-extra"), Some(&json!(true)));

    let labels: Vec<&str> = resource.metadata.labels.as_ref().unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(labels, vec!["zeta", "alpha"]);

    let keys: Vec<String> = resource.to_value().unwrap()
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys, vec!["apiVersion", "kind", "metadata", "spec", "status", "x-extra"]);
}

#[test]
fn test_resource_requires_metadata() {
    let value = json!({
        "apiVersion": "tekton.dev/v1beta1",
        "kind": "PipelineRun",
        "spec": {}
    });

    assert!(Resource::from_value(value).is_err());
}

#[test]
fn test_display_name() {
    let mut resource = Resource::from_value(json!({
        "apiVersion": "tekton.dev/v1beta1",
        "kind": "PipelineRun",
        "metadata": { "generateName": "nightly-r-", "namespace": "ci" }
    })).unwrap();

    assert_eq!(resource.display_name(), "ci/nightly-r-");

    resource.metadata.name = Some("nightly-r-x7k2p".to_string());
    resource.metadata.namespace = None;
    assert_eq!(resource.display_name(), "nightly-r-x7k2p");
}
