pub mod models;

use actix_web::{web, HttpRequest, HttpResponse};
use actix_ws::Message;
use futures_util::TryStreamExt;
use models::ServerMessage;
use tokio::sync::mpsc;

use crate::SubscriberMap;

/// WebSocket feed of resources created through the dashboard.
pub async fn ws_handler(
    req: HttpRequest,
    body: web::Payload,
    subscribers: web::Data<SubscriberMap>,
) -> actix_web::Result<HttpResponse> {
    let (res, mut session, mut stream) = actix_ws::handle(&req, body)?;

    // Outbound messages for this client, fed by the created-run observer
    let (tx, mut rx) = mpsc::unbounded_channel();

    let client_id = uuid::Uuid::new_v4().to_string();
    subscribers.insert(client_id.clone(), tx.clone());

    actix_web::rt::spawn({
        let subscribers = subscribers.clone();

        async move {
            tracing::debug!("Client {} connected", client_id);

            if tx.send(ServerMessage::Hello {
                client_id: client_id.clone(),
                message: "Hello from server!".to_string(),
            }).is_err() {
                tracing::warn!("Failed to send hello message to client {}", client_id);
            }

            loop {
                tokio::select! {
                    // Outbound messages
                    Some(msg) = rx.recv() => {
                        let text = match serde_json::to_string(&msg) {
                            Ok(text) => text,
                            Err(e) => {
                                tracing::error!("Failed to serialize message for {}: {}", client_id, e);
                                continue;
                            }
                        };

                        if session.text(text).await.is_err() {
                            break;
                        }
                    }
                    // Inbound messages
                    Ok(Some(msg)) = stream.try_next() => {
                        match msg {
                            Message::Text(txt) => {
                                if tx.send(ServerMessage::reply_to(&txt)).is_err() {
                                    break;
                                }
                            }
                            Message::Ping(bytes) => {
                                if session.pong(&bytes).await.is_err() {
                                    break;
                                }
                            }
                            Message::Close(_) => break,
                            _ => {}
                        }
                    }
                    else => break,
                }
            }

            // Unregister client on disconnect
            subscribers.remove(&client_id);
            let _ = session.close(None).await;

            tracing::debug!("Client {} disconnected", client_id);
        }
    });

    Ok(res)
}
