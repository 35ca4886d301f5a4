use std::sync::Arc;

use async_trait::async_trait;
use runboard_sdk::{
    client::{ResourceClient, ResourceKind},
    command::{
        CommandContext, CommandHandler, CommandResult, CommandType, ExecutableCommand, MutationCommand,
        ValidationCommand,
    },
    document::{document_namespace, parse_document},
};

/// Parameter holding the parsed document once `ParseRunDocument` has run.
pub const PAYLOAD_PARAMETER: &str = "payload";

const DEFAULT_KIND_LABEL: &str = "PipelineRun";

/// Kind name used in validation messages, e.g. "TaskRun cannot be empty".
fn kind_label(ctx: &CommandContext) -> anyhow::Result<String> {
    Ok(match ctx.get_optional_string_param("resource")? {
        Some(alias) => ResourceKind::from_alias(&alias).map(|kind| kind.kind).unwrap_or(alias),
        None => DEFAULT_KIND_LABEL.to_string(),
    })
}

/// Parses the `document` text into the `payload` parameter.
pub struct ParseRunDocument;

impl CommandHandler for ParseRunDocument {
    fn get_type(&self) -> CommandType {
        CommandType::Mutator
    }

    fn as_mutator(&self) -> Option<&dyn MutationCommand> {
        Some(self)
    }
}

#[async_trait]
impl MutationCommand for ParseRunDocument {
    async fn mutate(&self, ctx: &mut CommandContext) -> CommandResult {
        let kind = kind_label(ctx)?;
        let text = ctx.get_optional_string_param("document")?.unwrap_or_default();

        let payload = parse_document(&kind, &text)?;
        ctx.parameters.insert(PAYLOAD_PARAMETER.to_string(), payload);

        Ok(None)
    }
}

/// Rejects documents without a `metadata.namespace`.
pub struct NamespaceValidator;

impl CommandHandler for NamespaceValidator {
    fn get_type(&self) -> CommandType {
        CommandType::Validator
    }

    fn as_validator(&self) -> Option<&dyn ValidationCommand> {
        Some(self)
    }
}

#[async_trait]
impl ValidationCommand for NamespaceValidator {
    async fn validate(&self, ctx: &CommandContext) -> CommandResult {
        document_namespace(ctx.get_param(PAYLOAD_PARAMETER)?)?;

        Ok(None)
    }
}

/// Submits the validated payload to the cluster.
pub struct CreateRun {
    client: Arc<dyn ResourceClient>,
}

impl CreateRun {
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self { client }
    }
}

impl CommandHandler for CreateRun {
    fn get_type(&self) -> CommandType {
        CommandType::Internal
    }

    fn as_executable(&self) -> Option<&dyn ExecutableCommand> {
        Some(self)
    }
}

#[async_trait]
impl ExecutableCommand for CreateRun {
    async fn execute(&self, ctx: &CommandContext) -> CommandResult {
        let payload = ctx.get_param(PAYLOAD_PARAMETER)?;
        let namespace = document_namespace(payload)?;

        tracing::info!(activity_id = %ctx.activity_id, "Creating resource in namespace {}", namespace);

        let created = self.client.create_resource(namespace, payload).await?;

        Ok(Some(created))
    }
}
