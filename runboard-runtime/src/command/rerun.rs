use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use runboard_sdk::{
    client::{ResourceClient, ResourceKind},
    command::{CommandContext, CommandHandler, CommandResult, CommandType, ExecutableCommand},
    model::resource::Resource,
    rerun::generate_new_run_yaml,
};

use super::resources::{required_namespace, resolve_kind};

/// Fetches a finished run and answers with the document for running it again.
pub struct RerunCommand {
    client: Arc<dyn ResourceClient>,
}

impl RerunCommand {
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self { client }
    }
}

impl CommandHandler for RerunCommand {
    fn get_type(&self) -> CommandType {
        CommandType::Internal
    }

    fn as_executable(&self) -> Option<&dyn ExecutableCommand> {
        Some(self)
    }
}

#[async_trait]
impl ExecutableCommand for RerunCommand {
    async fn execute(&self, ctx: &CommandContext) -> CommandResult {
        let kind = match ctx.get_optional_string_param("resource")? {
            Some(alias) => resolve_kind(&alias)?,
            None => ResourceKind::pipeline_run(),
        };
        let name = ctx.get_string_param("name")?;
        let namespace = required_namespace(ctx)?;

        let run = self.client.get_resource(&kind, namespace, &name).await?;
        let run = Resource::from_value(run)
            .with_context(|| format!("{} {}/{} is not a valid resource", kind.kind, namespace, name))?;

        let document = generate_new_run_yaml(&run)
            .context("Failed to serialize re-run document")?;

        tracing::debug!("Generated re-run document for {}", run.display_name());

        Ok(Some(serde_json::json!({
            "kind": kind.kind,
            "namespace": namespace,
            "document": document,
        })))
    }
}
