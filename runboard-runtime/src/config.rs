use std::time::Duration;

use anyhow::Context;
use runboard_sdk::client::http::KubeApiClient;

/// Address `kubectl proxy` listens on by default.
pub const DEFAULT_API_SERVER: &str = "http://127.0.0.1:8001";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RunboardConfig {
    pub api_server: String,
    pub token: Option<String>,
    /// Used when a command carries no namespace. `*` means all namespaces.
    pub default_namespace: String,
    pub timeout: Duration,
}

impl Default for RunboardConfig {
    fn default() -> Self {
        Self {
            api_server: DEFAULT_API_SERVER.to_string(),
            token: None,
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RunboardConfig {
    pub fn api_client(&self) -> anyhow::Result<KubeApiClient> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(KubeApiClient::with_client(&self.api_server, client).with_token(self.token.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_uses_configured_server() {
        let config = RunboardConfig {
            api_server: "https://cluster.example:6443/".to_string(),
            ..Default::default()
        };

        let client = config.api_client().unwrap();

        assert_eq!(client.base_url(), "https://cluster.example:6443");
        assert_eq!(config.default_namespace, "default");
    }
}
