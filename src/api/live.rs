//! WebSocket entry point for live co-editing sessions.
//!
//! A peer connects with `?shareId=` (snippet sessions) or `?projectId=`
//! (project sessions); the two namespaces share the relay but are keyed
//! apart. On connect the peer receives an `init` frame with the current
//! room blob, then every `content-update` it sends is relayed to all
//! other peers in the room.

use crate::api::{ApiResponse, state::AppState};
use crate::live::{LiveHub, LiveMessage};
use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveQuery {
    pub share_id: Option<String>,
    pub project_id: Option<String>,
}

impl LiveQuery {
    fn room_key(&self) -> Option<String> {
        if let Some(share_id) = self.share_id.as_deref().filter(|s| !s.is_empty()) {
            return Some(format!("share:{share_id}"));
        }
        if let Some(project_id) = self.project_id.as_deref().filter(|p| !p.is_empty()) {
            return Some(format!("project:{project_id}"));
        }
        None
    }
}

// GET /api/live
pub async fn live_handler(
    State(core): State<AppState>,
    Query(query): Query<LiveQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(room_key) = query.room_key() else {
        return ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "shareId or projectId is required",
        )
        .into_response();
    };

    let hub = core.live.clone();
    ws.on_upgrade(move |socket| relay(socket, hub, room_key))
}

async fn relay(mut socket: WebSocket, hub: Arc<LiveHub>, room_key: String) {
    let conn_id = Uuid::new_v4();
    let (snapshot, mut updates) = hub.join(&room_key);
    tracing::debug!(room = %room_key, conn = %conn_id, "live peer connected");

    let init = LiveMessage::Init { content: snapshot };
    if let Ok(frame) = serde_json::to_string(&init)
        && socket.send(Message::Text(frame.into())).await.is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        // Unknown or malformed frames are dropped silently.
                        if let Ok(LiveMessage::ContentUpdate { content }) =
                            serde_json::from_str::<LiveMessage>(&text)
                        {
                            hub.publish(&room_key, conn_id, content);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
            update = updates.recv() => {
                match update {
                    Ok(update) => {
                        if update.from == conn_id {
                            continue;
                        }
                        let frame = LiveMessage::ContentUpdate {
                            content: update.content,
                        };
                        let Ok(frame) = serde_json::to_string(&frame) else {
                            continue;
                        };
                        if socket.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    // Skip the backlog and carry on with fresh updates;
                    // last write wins anyway.
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    drop(updates);
    hub.prune(&room_key);
    tracing::debug!(room = %room_key, conn = %conn_id, "live peer disconnected");
}
