use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde_json::Value;

use super::{ClientError, ClientResult, ResourceClient, ResourceKind};

/// Client for a Kubernetes-style API server.
#[derive(Debug, Clone)]
pub struct KubeApiClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl KubeApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Uses a preconfigured reqwest client, e.g. one with a timeout.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(header::ACCEPT, "application/json");

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn handle_response(&self, response: Response) -> ClientResult<Value> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::api_error(status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ResourceClient for KubeApiClient {
    async fn get_resource(&self, kind: &ResourceKind, namespace: &str, name: &str) -> ClientResult<Value> {
        let url = self.url(&kind.resource_path(namespace, name));
        tracing::debug!("GET {}", url);

        let response = self.prepare(self.client.get(&url)).send().await?;
        self.handle_response(response).await
    }

    async fn list_resources(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        filters: &[String],
    ) -> ClientResult<Value> {
        let url = self.url(&kind.collection_path(namespace));
        tracing::debug!("GET {} filters={:?}", url, filters);

        let mut request = self.client.get(&url);
        if !filters.is_empty() {
            request = request.query(&[("labelSelector", filters.join(","))]);
        }

        let response = self.prepare(request).send().await?;
        self.handle_response(response).await
    }

    async fn create_resource(&self, namespace: &str, payload: &Value) -> ClientResult<Value> {
        let kind = ResourceKind::from_object(payload)?;
        let url = self.url(&kind.collection_path(Some(namespace)));
        tracing::debug!("POST {}", url);

        let response = self.prepare(self.client.post(&url)).json(payload).send().await?;
        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_get_resource() {
        let server = MockServer::start().await;
        let run = json!({ "kind": "PipelineRun", "metadata": { "name": "build", "namespace": "ci" } });

        Mock::given(method("GET"))
            .and(path("/apis/tekton.dev/v1beta1/namespaces/ci/pipelineruns/build"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&run))
            .expect(1)
            .mount(&server)
            .await;

        let client = KubeApiClient::new(format!("{}/", server.uri())).with_token(Some("secret".to_string()));
        let result = client.get_resource(&ResourceKind::pipeline_run(), "ci", "build").await.unwrap();

        assert_eq!(result, run);
    }

    #[tokio::test]
    async fn test_list_resources_with_label_selector() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/apis/tekton.dev/v1beta1/taskruns"))
            .and(query_param("labelSelector", "app=web,tier=front"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client = KubeApiClient::new(server.uri());
        let filters = vec!["app=web".to_string(), "tier=front".to_string()];
        let result = client.list_resources(&ResourceKind::task_run(), Some("*"), &filters).await.unwrap();

        assert_eq!(result, json!({ "items": [] }));
    }

    #[tokio::test]
    async fn test_create_resource_posts_to_kind_collection() {
        let server = MockServer::start().await;
        let payload = json!({
            "apiVersion": "tekton.dev/v1beta1",
            "kind": "PipelineRun",
            "metadata": { "generateName": "build-r-", "namespace": "ci" }
        });

        Mock::given(method("POST"))
            .and(path("/apis/tekton.dev/v1beta1/namespaces/ci/pipelineruns"))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(201).set_body_json(&payload))
            .expect(1)
            .mount(&server)
            .await;

        let client = KubeApiClient::new(server.uri());
        let created = client.create_resource("ci", &payload).await.unwrap();

        assert_eq!(created, payload);
    }

    #[tokio::test]
    async fn test_api_error_keeps_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = KubeApiClient::new(server.uri());
        let payload = json!({ "apiVersion": "tekton.dev/v1beta1", "kind": "PipelineRun", "metadata": {} });
        let err = client.create_resource("ci", &payload).await.unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert_eq!(err.to_string(), "forbidden (error code 403)");
    }

    #[tokio::test]
    async fn test_create_without_kind_is_rejected_locally() {
        let client = KubeApiClient::new("http://127.0.0.1:9");
        let err = client.create_resource("ci", &json!({ "metadata": {} })).await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidPayload(_)));
    }
}
