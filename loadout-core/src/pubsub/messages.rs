// File: loadout-core/src/pubsub/messages.rs
//
// Wire frames for the pub/sub service. Everything is `{type, data}` JSON;
// frames that require authentication get the token stamped into `data`
// right before serialization.

use serde_json::{Value, json};

use crate::Error;

/// Outbound frames the client can send.
#[derive(Debug, Clone)]
pub enum OutboundFrame {
    Ping,
    Pong,
    /// Subscribe to topics; requires the auth token.
    Listen {
        topics: Vec<String>,
    },
}

impl OutboundFrame {
    /// Serialize, stamping `auth_token` where the frame requires it.
    pub fn to_json(&self, auth_token: &str) -> Value {
        match self {
            OutboundFrame::Ping => json!({ "type": "PING" }),
            OutboundFrame::Pong => json!({ "type": "PONG" }),
            OutboundFrame::Listen { topics } => json!({
                "type": "LISTEN",
                "data": {
                    "topics": topics,
                    "auth_token": auth_token,
                }
            }),
        }
    }
}

/// A parsed inbound frame. Control types (`PING`, `PONG`, `RECONNECT`,
/// `AUTH_REVOKED`, `RESPONSE`) are consumed by the client; anything else is
/// forwarded on the event bus as `(type, data)`.
#[derive(Debug, Clone)]
pub struct InboundFrame {
    pub msg_type: String,
    pub error: Option<String>,
    pub data: Option<Value>,
}

impl InboundFrame {
    pub fn parse(text: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(text)?;
        let msg_type = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| Error::Parse("pub/sub frame missing 'type'".to_string()))?
            .to_string();

        Ok(Self {
            msg_type,
            error: value
                .get("error")
                .and_then(|e| e.as_str())
                .map(str::to_string),
            data: value.get("data").cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_frame_is_stamped_with_token() {
        let frame = OutboundFrame::Listen {
            topics: vec!["channel-ext-v1.123".to_string()],
        };
        let json = frame.to_json("secret-token");
        assert_eq!(json["type"], "LISTEN");
        assert_eq!(json["data"]["auth_token"], "secret-token");
        assert_eq!(json["data"]["topics"][0], "channel-ext-v1.123");
    }

    #[test]
    fn ping_frame_carries_no_token() {
        let json = OutboundFrame::Ping.to_json("secret-token");
        assert_eq!(json, json!({ "type": "PING" }));
    }

    #[test]
    fn inbound_frame_requires_type() {
        assert!(InboundFrame::parse(r#"{"data":{}}"#).is_err());
        assert!(InboundFrame::parse("not json at all").is_err());

        let frame = InboundFrame::parse(r#"{"type":"RESPONSE","error":"ERR_BADAUTH"}"#).unwrap();
        assert_eq!(frame.msg_type, "RESPONSE");
        assert_eq!(frame.error.as_deref(), Some("ERR_BADAUTH"));
    }
}
