//! Relay client for integration tests
//!
//! Speaks the JSON envelope protocol over a real WebSocket and returns
//! envelopes as `serde_json::Value` so tests assert on the wire shape.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// How long to wait before deciding no envelope is coming
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Open a connection without logging in
    pub async fn connect(addr: SocketAddr) -> Self {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
            .await
            .expect("Failed to connect");
        Self { ws }
    }

    /// Connect and log in, returns the client and its session ID
    pub async fn login(addr: SocketAddr, username: &str) -> (Self, String) {
        let mut client = Self::connect(addr).await;
        client
            .send_json(json!({"cmd": "request-login", "username": username}))
            .await;
        let response = client.expect("login-succeeded").await;
        let session_id = response["sessionId"].as_str().unwrap().to_string();
        (client, session_id)
    }

    pub async fn request_logout(&mut self) {
        self.send_json(json!({"cmd": "request-logout"})).await;
    }

    pub async fn request_rename(&mut self, username: &str) {
        self.send_json(json!({"cmd": "request-rename", "username": username}))
            .await;
    }

    /// Request the directory, returns the clients-arrived envelope
    pub async fn fetch_clients(&mut self) -> Value {
        self.send_json(json!({"cmd": "fetch-clients"})).await;
        self.expect("clients-arrived").await
    }

    pub async fn send_text(&mut self, receiver: &str, text: &str) {
        self.send_json(json!({"cmd": "send-text", "receiver": receiver, "text": text}))
            .await;
    }

    pub async fn send_json(&mut self, envelope: Value) {
        self.send_raw(&envelope.to_string()).await;
    }

    /// Send an arbitrary text frame
    pub async fn send_raw(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.to_string().into()))
            .await
            .unwrap();
    }

    pub async fn send_binary(&mut self, data: &[u8]) {
        self.ws
            .send(Message::Binary(data.to_vec().into()))
            .await
            .unwrap();
    }

    /// Send a close frame
    pub async fn close(&mut self) {
        let _ = self.ws.close(None).await;
    }

    /// Receive the next envelope, asserting its command
    pub async fn expect(&mut self, cmd: &str) -> Value {
        let msg = self
            .next_envelope()
            .await
            .unwrap_or_else(|| panic!("Connection closed while waiting for {}", cmd));
        assert_eq!(msg["cmd"], cmd, "Expected {} but got: {}", cmd, msg);
        msg
    }

    /// Assert no envelope arrives within `duration`
    pub async fn expect_no_message(&mut self, duration: Duration) {
        if let Ok(Some(msg)) = tokio::time::timeout(duration, self.next_envelope()).await {
            panic!("Expected no message but received: {}", msg);
        }
    }

    /// Next text frame as JSON; None once the connection is gone
    async fn next_envelope(&mut self) -> Option<Value> {
        loop {
            match self.ws.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(&text).expect("Failed to parse JSON"));
                }
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }
}
