use std::collections::HashMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Metadata key holding the namespace a command operates in.
pub const NAMESPACE_METADATA: &str = "namespace";

/// Parameter under which observers receive the result of the internal handler.
pub const RESULT_PARAMETER: &str = "result";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandContext {
    pub command_name: String,
    pub parameters: HashMap<String, serde_json::Value>,
    pub metadata: HashMap<String, String>,
    pub activity_id: Uuid,

    #[serde(skip)]
    pub cancellation_token: CancellationToken,
}

impl CommandContext {
    pub fn new(command_name: impl Into<String>) -> Self {
        Self {
            command_name: command_name.into(),
            parameters: HashMap::new(),
            metadata: HashMap::new(),
            activity_id: Uuid::new_v4(),
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metadata.insert(NAMESPACE_METADATA.to_string(), namespace.into());
        self
    }

    pub fn get_string_param(&self, name: &str) -> anyhow::Result<String> {
        self.parameters.get(name)
            .ok_or_else( || anyhow::anyhow!("Missing required parameter: {}", name))?
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| anyhow::anyhow!("Invalid type for parameter '{}'; expected string", name))
    }

    /// A string parameter that may be absent; present values of another type are an error.
    pub fn get_optional_string_param(&self, name: &str) -> anyhow::Result<Option<String>> {
        match self.parameters.get(name) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(_) => self.get_string_param(name).map(Some),
        }
    }

    pub fn get_param(&self, name: &str) -> anyhow::Result<&serde_json::Value> {
        self.parameters.get(name)
            .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {}", name))
    }

    /// The `namespace` metadata entry, if it is set and non-empty.
    pub fn namespace(&self) -> Option<&str> {
        self.metadata.get(NAMESPACE_METADATA)
            .map(String::as_str)
            .filter(|ns| !ns.is_empty())
    }
}

pub type CommandResult = anyhow::Result<Option<serde_json::Value>>;

#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    async fn dispatch(&self, ctx: &mut CommandContext) -> CommandResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// Mutator commands prepare the context, e.g. by parsing raw input into
    /// parameters. They are executed first in the command pipeline.
    Mutator,

    /// Validator commands check the prepared context and reject the command
    /// before anything is sent to the cluster.
    Validator,

    /// Internal commands do the actual work; the first internal result is the
    /// result of the command. Only the runtime registers them.
    Internal,

    /// Observer commands see the finished command, including its result.
    /// They are executed last in the command pipeline.
    Observer,
}

impl CommandType {
    pub fn priority(&self) -> u8 {
        match self {
            CommandType::Mutator => 0,
            CommandType::Validator => 1,
            CommandType::Internal => 2,
            CommandType::Observer => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Mutator => "mutator",
            CommandType::Validator => "validator",
            CommandType::Internal => "internal",
            CommandType::Observer => "observer",
        }
    }
}

#[async_trait]
pub trait ValidationCommand: Send + Sync {
    async fn validate(&self, ctx: &CommandContext) -> CommandResult;
}

#[async_trait]
pub trait MutationCommand: Send + Sync {
    async fn mutate(&self, ctx: &mut CommandContext) -> CommandResult;
}

#[async_trait]
pub trait ExecutableCommand: Send + Sync {
    async fn execute(&self, ctx: &CommandContext) -> CommandResult;
}

pub trait CommandHandler: Send + Sync {
    fn get_type(&self) -> CommandType;

    fn as_validator(&self) -> Option<&dyn ValidationCommand> {
        None
    }

    fn as_mutator(&self) -> Option<&dyn MutationCommand> {
        None
    }

    fn as_executable(&self) -> Option<&dyn ExecutableCommand> {
        None
    }
}
