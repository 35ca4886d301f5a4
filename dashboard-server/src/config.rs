use std::time::Duration;

use clap::Parser;
use runboard_runtime::config::{DEFAULT_API_SERVER, DEFAULT_NAMESPACE};
use runboard_runtime::RunboardConfig;

#[derive(Parser, Debug)]
#[command(name = "dashboard-server", about = "Backend for editing and re-running pipeline runs")]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "RUNBOARD_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    #[arg(long, env = "RUNBOARD_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log filter, e.g. "info" or "dashboard_server=debug"
    #[arg(long, env = "RUNBOARD_LOG", default_value = "warn")]
    pub log: String,

    /// Base URL of the cluster API server
    #[arg(long, env = "RUNBOARD_API_SERVER", default_value = DEFAULT_API_SERVER)]
    pub api_server: String,

    #[arg(long, env = "RUNBOARD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Namespace used when a request names none; "*" selects all namespaces
    #[arg(long, env = "RUNBOARD_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Timeout for cluster API requests, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Worker threads; defaults to the number of available cores
    #[arg(long)]
    pub workers: Option<usize>,
}

impl ServerArgs {
    pub fn runboard_config(&self) -> RunboardConfig {
        RunboardConfig {
            api_server: self.api_server.clone(),
            token: self.token.clone(),
            default_namespace: self.namespace.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }
}
