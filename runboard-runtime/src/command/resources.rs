use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use runboard_sdk::{
    client::{ResourceClient, ResourceKind, ALL_NAMESPACES},
    command::{CommandContext, CommandHandler, CommandResult, CommandType, ExecutableCommand},
};
use serde_json::Value;

pub(crate) fn resolve_kind(alias: &str) -> anyhow::Result<ResourceKind> {
    ResourceKind::from_alias(alias)
        .ok_or_else(|| anyhow::anyhow!("Unknown resource type: {}", alias))
}

pub(crate) fn required_namespace(ctx: &CommandContext) -> anyhow::Result<&str> {
    ctx.namespace()
        .filter(|ns| *ns != ALL_NAMESPACES)
        .context("Missing required parameter: namespace")
}

pub struct GetCommand {
    client: Arc<dyn ResourceClient>,
}

impl GetCommand {
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self { client }
    }
}

pub struct ListCommand {
    client: Arc<dyn ResourceClient>,
}

impl ListCommand {
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self { client }
    }
}

impl CommandHandler for GetCommand {
    fn get_type(&self) -> CommandType {
        CommandType::Internal
    }

    fn as_executable(&self) -> Option<&dyn ExecutableCommand> {
        Some(self)
    }
}

#[async_trait]
impl ExecutableCommand for GetCommand {
    async fn execute(&self, ctx: &CommandContext) -> CommandResult {
        let kind = resolve_kind(&ctx.get_string_param("resource")?)?;
        let name = ctx.get_string_param("name")?;
        let namespace = required_namespace(ctx)?;

        let resource = self.client.get_resource(&kind, namespace, &name).await?;

        Ok(Some(resource))
    }
}

impl CommandHandler for ListCommand {
    fn get_type(&self) -> CommandType {
        CommandType::Internal
    }

    fn as_executable(&self) -> Option<&dyn ExecutableCommand> {
        Some(self)
    }
}

#[async_trait]
impl ExecutableCommand for ListCommand {
    async fn execute(&self, ctx: &CommandContext) -> CommandResult {
        let kind = resolve_kind(&ctx.get_string_param("resource")?)?;

        let filters = match ctx.parameters.get("filters") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value::<Vec<String>>(value.clone())
                .context("Invalid type for parameter 'filters'; expected a list of strings")?,
        };

        let filters: Vec<String> = filters.into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();

        let list = self.client.list_resources(&kind, ctx.namespace(), &filters).await?;

        Ok(Some(list))
    }
}
