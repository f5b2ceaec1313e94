use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::ids::{RunId, SessionId, UserId};

/// Actions carried by events pushed to clients over the delivery channel.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutboundAction {
    LlmNewToken,
    Heartbeat,
    FinalResponse,
    Error,
}

/// One incremental token relayed mid-run. Sequence numbers come from the
/// process-wide [`SequenceCounter`](crate::sequence::SequenceCounter) and
/// are strictly increasing within any single run's observed stream.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenEvent {
    pub run_id: RunId,
    pub sequence_number: u64,
    pub value: String,
}

/// One event pushed to a client. Constructed, sent once, discarded; the
/// core never persists these.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEvent {
    /// Always `"text"` in the current envelope format.
    #[serde(rename = "type")]
    pub kind: String,
    pub action: OutboundAction,
    pub user_id: UserId,
    /// Unix seconds as a string, the precision the envelope format carries.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    pub data: Value,
}

impl OutboundEvent {
    fn text(action: OutboundAction, user_id: &UserId, data: Value) -> Self {
        Self {
            kind: "text".to_string(),
            action,
            user_id: user_id.clone(),
            timestamp: unix_now_string(),
            direction: None,
            data,
        }
    }

    pub fn llm_new_token(user_id: &UserId, session_id: &SessionId, token: TokenEvent) -> Self {
        Self::text(
            OutboundAction::LlmNewToken,
            user_id,
            json!({ "sessionId": session_id, "token": token }),
        )
    }

    pub fn heartbeat(user_id: &UserId, session_id: &SessionId) -> Self {
        Self::text(
            OutboundAction::Heartbeat,
            user_id,
            json!({ "sessionId": session_id }),
        )
    }

    /// Final response payload is provider/model specific and opaque here.
    pub fn final_response(user_id: &UserId, data: Value) -> Self {
        Self::text(OutboundAction::FinalResponse, user_id, data)
    }

    /// Error notification. `session_id` may be empty when the failed record
    /// did not carry one recoverably.
    pub fn error(user_id: &UserId, session_id: &str, content: &str) -> Self {
        let mut event = Self::text(
            OutboundAction::Error,
            user_id,
            json!({ "sessionId": session_id, "content": content, "type": "text" }),
        );
        event.direction = Some("OUT".to_string());
        event
    }
}

fn unix_now_string() -> String {
    Utc::now().timestamp().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_event_wire_shape() {
        let token = TokenEvent {
            run_id: RunId::from_raw("run_1"),
            sequence_number: 7,
            value: "hello".into(),
        };
        let event =
            OutboundEvent::llm_new_token(&UserId::from_raw("alice"), &SessionId::from_raw("s1"), token);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["action"], "llm_new_token");
        assert_eq!(json["userId"], "alice");
        assert_eq!(json["data"]["sessionId"], "s1");
        assert_eq!(json["data"]["token"]["runId"], "run_1");
        assert_eq!(json["data"]["token"]["sequenceNumber"], 7);
        assert_eq!(json["data"]["token"]["value"], "hello");
        assert!(json.get("direction").is_none());
    }

    #[test]
    fn heartbeat_wire_shape() {
        let event = OutboundEvent::heartbeat(&UserId::from_raw("bob"), &SessionId::from_raw("s9"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "heartbeat");
        assert_eq!(json["data"]["sessionId"], "s9");
    }

    #[test]
    fn error_event_carries_direction_out() {
        let event = OutboundEvent::error(&UserId::from_raw("carol"), "", "execution failed: boom");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "error");
        assert_eq!(json["direction"], "OUT");
        assert_eq!(json["data"]["sessionId"], "");
        assert_eq!(json["data"]["content"], "execution failed: boom");
        assert_eq!(json["data"]["type"], "text");
    }

    #[test]
    fn timestamp_is_unix_seconds_string() {
        let event = OutboundEvent::heartbeat(&UserId::from_raw("u"), &SessionId::from_raw("s"));
        let seconds: i64 = event.timestamp.parse().unwrap();
        assert!(seconds > 1_700_000_000);
    }

    #[test]
    fn action_serde_roundtrip() {
        for action in [
            OutboundAction::LlmNewToken,
            OutboundAction::Heartbeat,
            OutboundAction::FinalResponse,
            OutboundAction::Error,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            let parsed: OutboundAction = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, action);
        }
    }
}
