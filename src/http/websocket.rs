//! WebSocket socket handler registered on every connector.
//!
//! # Responsibilities
//! - Complete the upgrade handshake with the client
//! - Enforce the configured maximum message size
//! - Hand frames to the application layer (currently: log and drop)

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct SocketSettings {
    max_message_size: usize,
}

/// Router exposing the WebSocket endpoint at `/`.
pub fn socket_router(max_message_size: usize) -> Router {
    Router::new()
        .route("/", get(upgrade))
        .with_state(SocketSettings { max_message_size })
        .layer(TraceLayer::new_for_http())
}

async fn upgrade(State(settings): State<SocketSettings>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.max_message_size(settings.max_message_size)
        .on_upgrade(handle_socket)
}

async fn handle_socket(mut socket: WebSocket) {
    let session = Uuid::new_v4();
    tracing::debug!(%session, "Socket opened");

    while let Some(frame) = socket.recv().await {
        match frame {
            Ok(Message::Text(text)) => tracing::trace!(%session, len = text.len(), "Text frame"),
            Ok(Message::Binary(data)) => tracing::trace!(%session, len = data.len(), "Binary frame"),
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(%session, error = %e, "Socket error");
                break;
            }
        }
    }

    tracing::debug!(%session, "Socket closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{AxumBinder, Binder, BoundServer, ConnectorSpec};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn plain_get_without_upgrade_is_rejected() {
        let binder = AxumBinder::new(socket_router(1024), Duration::from_millis(100));
        let server = binder.bind(&[ConnectorSpec::plaintext(0)], None).await.unwrap();
        let port = server.local_addrs()[0].port();

        let stop = CancellationToken::new();
        let task = tokio::spawn(server.serve(stop.clone()));

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let res = client
            .get(format!("http://127.0.0.1:{port}/"))
            .send()
            .await
            .unwrap();
        assert!(res.status().is_client_error());

        stop.cancel();
        task.await.unwrap().unwrap();
    }
}
