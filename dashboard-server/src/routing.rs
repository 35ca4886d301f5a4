use serde::Serialize;

/// A resource path below `/api`: `namespaces/{ns}/{resource}[/{name}]` or
/// `{resource}[/{name}]` for cluster-wide access.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    pub namespace: Option<String>,
    pub resource: String,
    pub name: Option<String>,
}

impl ResourceDescriptor {
    pub fn parse<S: AsRef<str>>(path: S) -> anyhow::Result<Self> {
        let path = path.as_ref();

        // Remove /api or /api/
        let path = path
            .strip_prefix("/api/")
            .or_else(|| path.strip_prefix("/api"))
            .unwrap_or(path);

        let segments: Vec<&str> = path
            .split('/')
            .filter(|s| !s.trim().is_empty())
            .collect();

        let (namespace, rest) = match segments.as_slice() {
            ["namespaces", namespace, rest @ ..] => (Some(namespace.to_string()), rest),
            ["namespaces", ..] => anyhow::bail!("Path must name a namespace and a resource type."),
            rest => (None, rest),
        };

        match rest {
            [resource] => Ok(Self {
                namespace,
                resource: resource.to_string(),
                name: None,
            }),
            [resource, name] => Ok(Self {
                namespace,
                resource: resource.to_string(),
                name: Some(name.to_string()),
            }),
            [] => anyhow::bail!("Path must name a resource type."),
            _ => anyhow::bail!("Subresources are not supported."),
        }
    }
}
