use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "ping")]
    Ping,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "event")]
    Event {
        resource: String,
        namespace: Option<String>,
        action: String,
        object: Value,
    },
    #[serde(rename = "pong")]
    Pong,
    #[serde(rename = "hello")]
    Hello {
        client_id: String,
        message: String,
    },
    #[serde(rename = "error")]
    Error {
        message: String,
    },
}

impl ServerMessage {
    /// Reply to a text frame sent by a client.
    pub fn reply_to(text: &str) -> Self {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::Ping) => ServerMessage::Pong,
            Err(e) => ServerMessage::Error {
                message: format!("Invalid message: {}", e),
            },
        }
    }
}
