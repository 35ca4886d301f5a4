use std::collections::HashMap;
use std::io::Read;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use runboard_runtime::config::DEFAULT_API_SERVER;
use runboard_sdk::client::ALL_NAMESPACES;
use runboard_sdk::command::{CommandContext, NAMESPACE_METADATA};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "rbctl", about = "Inspect and re-run pipeline runs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the cluster API server
    #[arg(long, global = true, env = "RUNBOARD_API_SERVER", default_value = DEFAULT_API_SERVER)]
    pub api_server: String,

    /// Bearer token sent to the API server
    #[arg(long, global = true, env = "RUNBOARD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Print output in pretty (indented) format
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Set the output format (standard, json, yaml), default is standard
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Standard)]
    pub output: OutputFormat,

    /// Print debug logs to stderr
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum OutputFormat {
    Standard,
    Json,
    Yaml
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a single resource
    Get(GetArgs),

    /// List resources, optionally filtered by label
    List(ListArgs),

    /// Print the document for running a pipeline run or task run again
    Rerun(RerunArgs),

    /// Validate a run document and submit it
    Create(CreateArgs),

    /// Print the runtime version
    Version,
}

#[derive(Args, Debug)]
pub struct NamespaceArgs {
    /// Namespace of the resource. Defaults to "default"
    #[arg(long = "namespace", short = 'n', value_name = "NAMESPACE", env = "RUNBOARD_NAMESPACE")]
    pub namespace: Option<String>,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Resource type (e.g., pipelinerun, taskrun, pr)
    pub resource: String,

    /// Name of the resource
    pub name: String,

    #[command(flatten)]
    pub namespace: NamespaceArgs,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Resource type (e.g., pipelineruns, taskruns, secrets)
    pub resource: String,

    #[command(flatten)]
    pub namespace: NamespaceArgs,

    /// List across all namespaces, overriding --namespace
    #[arg(long, short = 'A', default_value_t = false)]
    pub all_namespaces: bool,

    /// Label filters in key=value format
    #[arg(long = "label", short = 'l', value_parser = parse_key_val)]
    pub labels: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct RerunArgs {
    /// Name of the finished run
    pub name: String,

    #[command(flatten)]
    pub namespace: NamespaceArgs,

    /// Kind of run
    #[arg(long, default_value = "pipelinerun")]
    pub kind: String,

    /// Open the document in $EDITOR before printing or submitting it
    #[arg(long, default_value_t = false)]
    pub edit: bool,

    /// Submit the document instead of printing it
    #[arg(long, default_value_t = false)]
    pub submit: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Document to submit, or "-" to read standard input
    #[arg(long = "file", short = 'f', value_name = "FILE")]
    pub file: String,

    /// Kind named in validation messages
    #[arg(long, default_value = "pipelinerun")]
    pub kind: String,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 || parts[0].is_empty() {
        return Err(format!("Invalid key=value pair: {}", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

pub fn read_document(file: &str) -> anyhow::Result<String> {
    if file == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("Failed to read standard input")?;
        return Ok(text);
    }

    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))
}

/// Context for the `create` command submitting `document`.
pub fn create_context(kind: &str, document: String) -> CommandContext {
    CommandContext::new("create")
        .with_param("resource", kind)
        .with_param("document", document)
}

impl Command {
    pub fn into_context(self) -> anyhow::Result<CommandContext> {
        let mut parameters: HashMap<String, serde_json::Value> = HashMap::new();
        let mut metadata: HashMap<String, String> = HashMap::new();

        let verb = match self {
            Command::Get(args) => {
                parameters.insert("resource".to_string(), serde_json::json!(args.resource));
                parameters.insert("name".to_string(), serde_json::json!(args.name));
                if let Some(namespace) = args.namespace.namespace {
                    metadata.insert(NAMESPACE_METADATA.to_string(), namespace);
                }
                "get"
            },
            Command::List(args) => {
                let filters: Vec<String> = args.labels
                    .into_iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();

                parameters.insert("resource".to_string(), serde_json::json!(args.resource));
                parameters.insert("filters".to_string(), serde_json::json!(filters));

                let namespace = if args.all_namespaces {
                    Some(ALL_NAMESPACES.to_string())
                } else {
                    args.namespace.namespace
                };
                if let Some(namespace) = namespace {
                    metadata.insert(NAMESPACE_METADATA.to_string(), namespace);
                }
                "list"
            },
            Command::Rerun(args) => {
                parameters.insert("resource".to_string(), serde_json::json!(args.kind));
                parameters.insert("name".to_string(), serde_json::json!(args.name));
                if let Some(namespace) = args.namespace.namespace {
                    metadata.insert(NAMESPACE_METADATA.to_string(), namespace);
                }
                "rerun"
            },
            Command::Create(args) => {
                let document = read_document(&args.file)?;
                return Ok(create_context(&args.kind, document));
            },
            Command::Version => "version",
        };

        Ok(CommandContext {
            command_name: verb.to_string(),
            parameters,
            metadata,
            activity_id: Uuid::new_v4(),
            cancellation_token: CancellationToken::new(),
        })
    }
}
