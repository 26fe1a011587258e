//! Wire envelopes exchanged with chat clients
//!
//! Every envelope is a JSON object whose `cmd` field names the command.
//! Field names are camelCase, command names are kebab-case.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Directory entry returned by `fetch-clients`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub session_id: String,
    pub username: String,
}

/// Messages sent from client to server
///
/// A `sessionId` field sent by older clients is accepted and ignored; the
/// router always acts on the session bound to the sending connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Log in under a display name
    RequestLogin {
        /// Requested display name
        username: String,
    },

    /// Log out, keeping the connection open
    RequestLogout,

    /// Change the display name of the current session
    RequestRename {
        /// New display name
        username: String,
    },

    /// List every other logged-in session
    FetchClients,

    /// Send a text message to one session
    SendText {
        /// Receiving session ID
        receiver: String,
        /// Message body
        text: String,
    },

    /// Any `cmd` value this server does not understand
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Decode an envelope from raw frame bytes
    pub fn parse(raw: &[u8]) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Wire name of the command
    pub fn command(&self) -> &'static str {
        match self {
            ClientMessage::RequestLogin { .. } => "request-login",
            ClientMessage::RequestLogout => "request-logout",
            ClientMessage::RequestRename { .. } => "request-rename",
            ClientMessage::FetchClients => "fetch-clients",
            ClientMessage::SendText { .. } => "send-text",
            ClientMessage::Unknown => "unknown",
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Login accepted (response to RequestLogin)
    LoginSucceeded {
        /// Session ID assigned to the connection
        session_id: String,
    },

    /// Directory listing (response to FetchClients)
    ClientsArrived { clients: Vec<ClientInfo> },

    /// Acknowledgement echoed to the sender of a text
    SendText {
        receiver: String,
        text: String,
        /// Server receipt time, Unix epoch milliseconds
        time: i64,
    },

    /// Text delivered to its receiver
    ReceiveText {
        sender: String,
        text: String,
        /// Server receipt time, Unix epoch milliseconds
        time: i64,
    },

    /// Broadcast when a session logs in
    SomeoneEntered { session_id: String, username: String },

    /// Broadcast when a session changes its display name
    SomeoneRenamed { session_id: String, username: String },

    /// Broadcast when a session logs out or disconnects
    SomeoneLeft { session_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==================== ClientMessage Tests ====================

    #[test]
    fn parse_request_login() {
        let msg = ClientMessage::parse(br#"{"cmd":"request-login","username":"alice"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::RequestLogin {
                username: "alice".to_string()
            }
        );
        assert_eq!(msg.command(), "request-login");
    }

    #[test]
    fn parse_send_text_ignores_client_session_id() {
        let raw = br#"{"cmd":"send-text","sessionId":"spoofed","receiver":"B1","text":"hi"}"#;
        let msg = ClientMessage::parse(raw).unwrap();
        assert_eq!(
            msg,
            ClientMessage::SendText {
                receiver: "B1".to_string(),
                text: "hi".to_string(),
            }
        );
    }

    #[test]
    fn parse_unit_commands_with_extra_fields() {
        let logout = ClientMessage::parse(br#"{"cmd":"request-logout","sessionId":"A1"}"#).unwrap();
        assert_eq!(logout, ClientMessage::RequestLogout);

        let fetch = ClientMessage::parse(br#"{"cmd":"fetch-clients"}"#).unwrap();
        assert_eq!(fetch, ClientMessage::FetchClients);
    }

    #[test]
    fn parse_unknown_command() {
        let msg = ClientMessage::parse(br#"{"cmd":"dance","moves":3}"#).unwrap();
        assert_eq!(msg, ClientMessage::Unknown);
    }

    #[test]
    fn parse_rejects_invalid_json() {
        let err = ClientMessage::parse(b"not json").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedEnvelope(_)));
    }

    #[test]
    fn parse_rejects_missing_cmd() {
        let err = ClientMessage::parse(br#"{"username":"alice"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedEnvelope(_)));
    }

    #[test]
    fn parse_rejects_login_without_username() {
        let err = ClientMessage::parse(br#"{"cmd":"request-login"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedEnvelope(_)));
    }

    // ==================== ServerMessage Tests ====================

    #[test]
    fn login_succeeded_wire_format() {
        let msg = ServerMessage::LoginSucceeded {
            session_id: "A1".to_string(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"cmd": "login-succeeded", "sessionId": "A1"}));
    }

    #[test]
    fn clients_arrived_wire_format() {
        let msg = ServerMessage::ClientsArrived {
            clients: vec![ClientInfo {
                session_id: "B1".to_string(),
                username: "bob".to_string(),
            }],
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "cmd": "clients-arrived",
                "clients": [{"sessionId": "B1", "username": "bob"}]
            })
        );
    }

    #[test]
    fn text_messages_wire_format() {
        let ack = ServerMessage::SendText {
            receiver: "B1".to_string(),
            text: "hi".to_string(),
            time: 1_700_000_000_000,
        };
        assert_eq!(
            serde_json::to_value(&ack).unwrap(),
            json!({"cmd": "send-text", "receiver": "B1", "text": "hi", "time": 1_700_000_000_000i64})
        );

        let delivery = ServerMessage::ReceiveText {
            sender: "A1".to_string(),
            text: "hi".to_string(),
            time: 1_700_000_000_000,
        };
        assert_eq!(
            serde_json::to_value(&delivery).unwrap(),
            json!({"cmd": "receive-text", "sender": "A1", "text": "hi", "time": 1_700_000_000_000i64})
        );
    }

    #[test]
    fn presence_messages_wire_format() {
        let entered = ServerMessage::SomeoneEntered {
            session_id: "A1".to_string(),
            username: "alice".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&entered).unwrap(),
            json!({"cmd": "someone-entered", "sessionId": "A1", "username": "alice"})
        );

        let left = ServerMessage::SomeoneLeft {
            session_id: "A1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&left).unwrap(),
            json!({"cmd": "someone-left", "sessionId": "A1"})
        );
    }
}
