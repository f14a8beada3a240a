/**
 * WebSocket Transport
 *
 * The `GET /ws` endpoint upgrades to a WebSocket and drives one
 * `MessageSession` for the lifetime of the socket.
 *
 * # Connection protocol
 *
 * - `username` query parameter: the authenticated identity, injected by the
 *   auth layer in front of this service (token validation is not this
 *   core's concern).
 * - `user` query parameter: the peer whose conversation the client is
 *   opening.
 *
 * Outbound events flow through a per-connection unbounded channel; the
 * socket task owns the receiver and pumps events onto the sink. Inbound
 * text frames are parsed as `ClientCommand`s. Whatever way the socket ends -
 * clean close, protocol error, transport failure - the session's
 * `disconnect` runs before the task exits, so presence and group membership
 * are always released.
 */
use crate::backend::hub::MessageSession;
use crate::backend::server::state::Hub;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::{ClientCommand, ServerEvent};

/// Query parameters accepted by `GET /ws`
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    /// Authenticated username, resolved upstream
    #[serde(default)]
    pub username: String,
    /// Peer whose conversation is being opened
    #[serde(default)]
    pub user: String,
}

/// Handle the WebSocket upgrade (GET /ws)
pub async fn ws_handler(
    State(hub): State<Hub>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub, params))
}

async fn handle_socket(socket: WebSocket, hub: Hub, params: ConnectParams) {
    let connection_id = Uuid::new_v4().to_string();
    tracing::debug!(
        "[Realtime] Socket open: connection {connection_id}, user {:?}, peer {:?}",
        params.username,
        params.user
    );

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerEvent>();
    hub.clients.register(&connection_id, outbound_tx);

    let (mut sink, mut stream) = socket.split();

    // Pump outbound events onto the socket until the channel or sink closes.
    let forward = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[Realtime] Failed to serialize event: {e}");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut session = MessageSession::new(hub.clone(), connection_id.clone());
    match session.connect(&params.username, &params.user).await {
        Ok(()) => {
            read_commands(&mut stream, &session, &hub).await;
        }
        Err(e) => {
            tracing::warn!("[Realtime] Connect rejected for {connection_id}: {e}");
            send_error(&hub, &connection_id, &e);
        }
    }

    // Unconditional teardown, on every exit path. Unregistering drops the
    // outbound sender, so the pump drains queued events and exits on its
    // own; awaiting it lets a final error event reach the client.
    hub.clients.unregister(&connection_id);
    session.disconnect().await;
    let _ = forward.await;
    tracing::debug!("[Realtime] Socket closed: connection {connection_id}");
}

async fn read_commands(
    stream: &mut futures_util::stream::SplitStream<WebSocket>,
    session: &MessageSession,
    hub: &Hub,
) {
    while let Some(message) = stream.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(
                    "[Realtime] Transport error on {}: {e}",
                    session.connection_id()
                );
                break;
            }
        };

        match message {
            Message::Text(text) => match serde_json::from_str::<ClientCommand>(&text) {
                Ok(ClientCommand::SendMessage {
                    recipient_username,
                    content,
                }) => {
                    if let Err(e) = session.send_message(&recipient_username, &content).await {
                        send_error(hub, session.connection_id(), &e);
                    }
                }
                Err(e) => {
                    send_error(
                        hub,
                        session.connection_id(),
                        &crate::backend::error::HubError::invalid_request(format!(
                            "unrecognized command: {e}"
                        )),
                    );
                }
            },
            Message::Close(_) => break,
            // Pings are answered by axum; binary frames are not part of the
            // protocol.
            _ => {}
        }
    }
}

fn send_error(hub: &Hub, connection_id: &str, error: &crate::backend::error::HubError) {
    hub.clients.send_to(
        connection_id,
        ServerEvent::Error {
            code: error.code().to_string(),
            message: error.to_string(),
        },
    );
}
