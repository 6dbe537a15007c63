//! Stateless health responder.
//!
//! `GET /health` returns a fixed success indicator; every other path
//! returns a fixed greeting. No request body parsing, no state.

use axum::routing::get;
use axum::Router;

async fn health() -> &'static str {
    "ok"
}

async fn greeting() -> &'static str {
    "Hello from AI-integrated CI/CD + MCP + Terraform + K8s!\n"
}

pub fn router() -> Router {
    Router::new().route("/health", get(health)).fallback(greeting)
}

/// Serve the health responder on `port` until the process exits.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "health responder listening");
    axum::serve(listener, router()).await?;
    Ok(())
}
