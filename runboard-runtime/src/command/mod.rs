pub mod create;
pub mod rerun;
pub mod resources;
pub mod version;

use std::{collections::HashMap, sync::Arc};
use async_trait::async_trait;
use runboard_sdk::command::{CommandContext, CommandDispatcher, CommandHandler, CommandResult, CommandType, RESULT_PARAMETER};
use serde_json::Value;

#[derive(Default)]
pub struct CommandExecutor {
    handlers: HashMap<String, Vec<Arc<dyn CommandHandler>>>,
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    pub fn register_handler(
        &mut self,
        name: &str,
        handler: Arc<dyn CommandHandler>,
    ) {
        let handlers = self.handlers.entry(name.to_string()).or_default();
        handlers.push(handler);
        handlers.sort_by_key(|h| h.get_type().priority());
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    async fn execute_handler(
        &self,
        ctx: &mut CommandContext,
        handler: &Arc<dyn CommandHandler>,
    ) -> CommandResult {
        if let Some(validator) = handler.as_validator() {
            validator.validate(ctx).await?;

            return Ok(None);
        }

        if let Some(mutator) = handler.as_mutator() {
            mutator.mutate(ctx).await?;

            return Ok(None);
        }

        if let Some(executable) = handler.as_executable() {
            return executable.execute(ctx).await;
        }

        Err(anyhow::anyhow!(
            "Handler does not implement any command type: {}",
            handler.get_type().as_str()
        ))
    }
}

#[async_trait]
impl CommandDispatcher for CommandExecutor {
    async fn dispatch(&self, ctx: &mut CommandContext) -> CommandResult {
        let handlers = self.handlers.get(&ctx.command_name)
            .ok_or_else(|| anyhow::anyhow!("Command handler not found for: {}", ctx.command_name))?;

        let mut final_result: Option<Value> = None;
        let mut has_result = false;

        for handler in handlers {
            let handler_type = handler.get_type();

            if ctx.cancellation_token.is_cancelled() {
                anyhow::bail!("Command cancelled: {}", ctx.command_name);
            }

            // observers see what the internal handler produced
            if handler_type == CommandType::Observer && has_result {
                ctx.parameters.insert(
                    RESULT_PARAMETER.to_string(),
                    final_result.clone().unwrap_or(Value::Null),
                );
            }

            tracing::debug!(
                command = %ctx.command_name,
                activity_id = %ctx.activity_id,
                handler = handler_type.as_str(),
                "Executing handler"
            );

            let result = self.execute_handler(ctx, handler).await?;

            if !has_result && handler_type == CommandType::Internal {
                final_result = result;
                has_result = true;
            }
        }

        Ok(final_result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use runboard_sdk::command::{ExecutableCommand, MutationCommand, ValidationCommand};
    use serde_json::json;

    use super::*;

    struct Recorder {
        command_type: CommandType,
        log: Arc<Mutex<Vec<&'static str>>>,
        seen_result: Arc<Mutex<Option<Value>>>,
    }

    impl Recorder {
        fn new(command_type: CommandType, log: &Arc<Mutex<Vec<&'static str>>>) -> Arc<Self> {
            Arc::new(Self {
                command_type,
                log: log.clone(),
                seen_result: Arc::new(Mutex::new(None)),
            })
        }
    }

    impl CommandHandler for Recorder {
        fn get_type(&self) -> CommandType {
            self.command_type
        }

        fn as_validator(&self) -> Option<&dyn ValidationCommand> {
            (self.command_type == CommandType::Validator).then_some(self as &dyn ValidationCommand)
        }

        fn as_mutator(&self) -> Option<&dyn MutationCommand> {
            (self.command_type == CommandType::Mutator).then_some(self as &dyn MutationCommand)
        }

        fn as_executable(&self) -> Option<&dyn ExecutableCommand> {
            matches!(self.command_type, CommandType::Internal | CommandType::Observer)
                .then_some(self as &dyn ExecutableCommand)
        }
    }

    #[async_trait]
    impl ValidationCommand for Recorder {
        async fn validate(&self, ctx: &CommandContext) -> CommandResult {
            self.log.lock().unwrap().push("validator");
            if ctx.parameters.contains_key("reject") {
                anyhow::bail!("rejected");
            }
            Ok(None)
        }
    }

    #[async_trait]
    impl MutationCommand for Recorder {
        async fn mutate(&self, ctx: &mut CommandContext) -> CommandResult {
            self.log.lock().unwrap().push("mutator");
            ctx.parameters.insert("mutated".to_string(), json!(true));
            Ok(None)
        }
    }

    #[async_trait]
    impl ExecutableCommand for Recorder {
        async fn execute(&self, ctx: &CommandContext) -> CommandResult {
            if self.command_type == CommandType::Observer {
                self.log.lock().unwrap().push("observer");
                *self.seen_result.lock().unwrap() = ctx.parameters.get(RESULT_PARAMETER).cloned();
                return Ok(Some(json!("ignored")));
            }

            self.log.lock().unwrap().push("internal");
            Ok(Some(json!({ "mutated": ctx.parameters.get("mutated").cloned() })))
        }
    }

    fn executor(log: &Arc<Mutex<Vec<&'static str>>>) -> (CommandExecutor, Arc<Recorder>) {
        let observer = Recorder::new(CommandType::Observer, log);
        let mut executor = CommandExecutor::new();

        executor.register_handler("run", observer.clone());
        executor.register_handler("run", Recorder::new(CommandType::Internal, log));
        executor.register_handler("run", Recorder::new(CommandType::Validator, log));
        executor.register_handler("run", Recorder::new(CommandType::Mutator, log));

        (executor, observer)
    }

    #[tokio::test]
    async fn test_handlers_run_in_priority_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (executor, observer) = executor(&log);

        let mut ctx = CommandContext::new("run");
        let result = executor.dispatch(&mut ctx).await.unwrap();

        assert_eq!(result, Some(json!({ "mutated": true })));
        assert_eq!(*log.lock().unwrap(), vec!["mutator", "validator", "internal", "observer"]);
        assert_eq!(*observer.seen_result.lock().unwrap(), Some(json!({ "mutated": true })));
    }

    #[tokio::test]
    async fn test_validation_failure_stops_pipeline() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (executor, _) = executor(&log);

        let mut ctx = CommandContext::new("run").with_param("reject", true);
        let err = executor.dispatch(&mut ctx).await.unwrap_err();

        assert_eq!(err.to_string(), "rejected");
        assert_eq!(*log.lock().unwrap(), vec!["mutator", "validator"]);
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let executor = CommandExecutor::new();

        let err = executor.dispatch(&mut CommandContext::new("missing")).await.unwrap_err();

        assert_eq!(err.to_string(), "Command handler not found for: missing");
    }

    #[tokio::test]
    async fn test_cancelled_command_does_not_run() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (executor, _) = executor(&log);

        let mut ctx = CommandContext::new("run");
        ctx.cancellation_token.cancel();

        assert!(executor.dispatch(&mut ctx).await.is_err());
        assert!(log.lock().unwrap().is_empty());
    }
}
