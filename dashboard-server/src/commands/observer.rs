use anyhow::Context;
use async_trait::async_trait;
use runboard_sdk::command::{CommandContext, CommandHandler, CommandResult, CommandType, ExecutableCommand, RESULT_PARAMETER};
use serde_json::Value;

use crate::actors::models::ServerMessage;
use crate::SubscriberMap;

/// Broadcasts every successfully created resource to the WebSocket subscribers.
pub struct CreatedRunObserver {
    subscribers: SubscriberMap,
}

impl CreatedRunObserver {
    pub fn new(subscribers: SubscriberMap) -> Self {
        Self { subscribers }
    }
}

impl CommandHandler for CreatedRunObserver {
    fn get_type(&self) -> CommandType {
        CommandType::Observer
    }

    fn as_executable(&self) -> Option<&dyn ExecutableCommand> {
        Some(self)
    }
}

#[async_trait]
impl ExecutableCommand for CreatedRunObserver {
    async fn execute(&self, ctx: &CommandContext) -> CommandResult {
        let object = ctx.get_param(RESULT_PARAMETER)
            .context("Missing 'result' parameter")?;

        let field = |name: &str| object.get(name).and_then(Value::as_str).unwrap_or_default();
        let resource = format!("{}/{}", field("apiVersion"), field("kind"));
        let namespace = object.get("metadata")
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let message = ServerMessage::Event {
            resource,
            namespace,
            action: ctx.command_name.clone(),
            object: object.clone(),
        };

        // Removing while iterating would deadlock the shard
        let mut disconnected = Vec::new();
        for subscriber in self.subscribers.iter() {
            if subscriber.send(message.clone()).is_err() {
                disconnected.push(subscriber.key().clone());
            }
        }

        for client_id in disconnected {
            tracing::debug!("Dropping disconnected subscriber {}", client_id);
            self.subscribers.remove(&client_id);
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dashmap::DashMap;
    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn test_created_resource_is_broadcast() {
        let subscribers: SubscriberMap = Arc::new(DashMap::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (closed_tx, closed_rx) = mpsc::unbounded_channel();
        drop(closed_rx);

        subscribers.insert("live".to_string(), tx);
        subscribers.insert("gone".to_string(), closed_tx);

        let created = json!({
            "apiVersion": "tekton.dev/v1beta1",
            "kind": "PipelineRun",
            "metadata": { "name": "build-r-x7k2p", "namespace": "ci" }
        });
        let ctx = CommandContext::new("create").with_param(RESULT_PARAMETER, created.clone());

        CreatedRunObserver::new(subscribers.clone()).execute(&ctx).await.unwrap();

        match rx.try_recv().unwrap() {
            ServerMessage::Event { resource, namespace, action, object } => {
                assert_eq!(resource, "tekton.dev/v1beta1/PipelineRun");
                assert_eq!(namespace.as_deref(), Some("ci"));
                assert_eq!(action, "create");
                assert_eq!(object, created);
            }
            other => panic!("unexpected message {:?}", other),
        }

        assert!(subscribers.contains_key("live"));
        assert!(!subscribers.contains_key("gone"));
    }

    #[tokio::test]
    async fn test_missing_result_is_an_error() {
        let subscribers: SubscriberMap = Arc::new(DashMap::new());

        let err = CreatedRunObserver::new(subscribers)
            .execute(&CommandContext::new("create"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Missing 'result' parameter");
    }
}
