//! TEKS Grade-6 Tutor Backend
//!
//! - Axum HTTP + WebSocket API
//! - Deterministic item generation from templates under `content/templates`
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT               : u16 (default 3000)
//!   TEMPLATES_DIR      : template directory (default "content/templates")
//!   TUTOR_CONFIG_PATH  : path to TOML config (generation, grading, mastery, moderation)
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use teks_tutor::routes::build_router;
use teks_tutor::state::AppState;
use teks_tutor::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (templates, factory, learner stores).
  let state = Arc::new(AppState::new()?);

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "teks_tutor", %addr, templates = state.factory.templates().len(), "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
