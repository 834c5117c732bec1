//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument, warn};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic::*;
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "teks_tutor", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "teks_tutor", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "teks_tutor", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => {
            warn!(target: "teks_tutor", payload = %trunc_for_log(&txt, 256), error = %e, "WS message rejected");
            ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }
          }
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "teks_tutor", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "teks_tutor", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
pub async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::NextItem { teks, seed } => {
      let item = next_item(state, teks.as_deref(), seed).await;
      info!(target: "item", id = %item.id, "WS next_item served");
      ServerWsMessage::Item { item }
    }

    ClientWsMessage::SubmitAttempt { item_id, response } => match submit_attempt(state, &item_id, &response).await {
      Some(out) => {
        info!(target: "grading", id = %item_id, correct = out.correct, "WS submit_attempt graded");
        ServerWsMessage::AttemptResult(out)
      }
      None => ServerWsMessage::Error { message: format!("Unknown item_id: {}", item_id) },
    },

    ClientWsMessage::Hint { item_id, index } => match get_hint(state, &item_id, index).await {
      Some(hint) => ServerWsMessage::Hint(hint),
      None => ServerWsMessage::Error { message: format!("No hint: unknown item {}", item_id) },
    },
  }
}
