pub mod command;
pub mod config;


use std::sync::Arc;

use command::{
    create::{CreateRun, NamespaceValidator, ParseRunDocument},
    rerun::RerunCommand,
    resources::{GetCommand, ListCommand},
    version::VersionCommand,
    CommandExecutor,
};
pub use config::RunboardConfig;
use runboard_sdk::{
    client::ResourceClient,
    command::{CommandContext, CommandDispatcher, CommandHandler, CommandResult, CommandType, NAMESPACE_METADATA},
};

pub struct RunboardRuntimeBuilder {
    config: RunboardConfig,
    executor: CommandExecutor,
}

impl RunboardRuntimeBuilder {
    pub fn new(client: Arc<dyn ResourceClient>, config: RunboardConfig) -> Self {
        let mut executor = CommandExecutor::new();
        executor.register_handler("version", Arc::new(VersionCommand));
        executor.register_handler("get", Arc::new(GetCommand::new(client.clone())));
        executor.register_handler("list", Arc::new(ListCommand::new(client.clone())));
        executor.register_handler("rerun", Arc::new(RerunCommand::new(client.clone())));
        executor.register_handler("create", Arc::new(ParseRunDocument));
        executor.register_handler("create", Arc::new(NamespaceValidator));
        executor.register_handler("create", Arc::new(CreateRun::new(client)));

        Self {
            config,
            executor
        }
    }

    /// Adds a mutator, validator or observer to an existing command.
    pub fn register_handler(
        &mut self,
        name: &str,
        handler: Arc<dyn CommandHandler>
    ) -> anyhow::Result<&mut Self>
    {
        if handler.get_type() == CommandType::Internal {
            anyhow::bail!("Cannot register internal command handler: {}", name);
        }

        if !self.executor.has_command(name) {
            anyhow::bail!("Unknown command: {}", name);
        }

        self.executor.register_handler(name, handler);

        Ok(self)
    }

    pub fn build(self) -> RunboardRuntime {
        RunboardRuntime {
            config: self.config,
            executor: Arc::new(self.executor),
        }
    }
}

pub struct RunboardRuntime {
    config: RunboardConfig,
    executor: Arc<CommandExecutor>,
}

impl RunboardRuntime {
    pub fn config(&self) -> &RunboardConfig {
        &self.config
    }

    /// Runs a command, filling in the default namespace when the context has none.
    pub async fn execute(&self, context: &mut CommandContext) -> CommandResult {
        if context.namespace().is_none() {
            context.metadata.insert(NAMESPACE_METADATA.to_string(), self.config.default_namespace.clone());
        }

        self.executor.dispatch(context).await
    }
}
