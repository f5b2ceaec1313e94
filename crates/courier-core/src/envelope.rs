use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DispatchError;
use crate::ids::{SessionId, UserId, WorkspaceId};

/// One opaque record lifted off the queue. The `message_id` is whatever
/// identity the queue infrastructure assigned; it is echoed back in the
/// batch report so the infra can redeliver only the failed subset.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub body: String,
}

impl RawRecord {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            message_id: None,
            body: body.into(),
        }
    }

    pub fn with_message_id(message_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            body: body.into(),
        }
    }
}

/// Payload of a `run` request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPayload {
    pub provider: String,
    pub model_id: String,
    pub mode: String,
    pub text: String,
    #[serde(default)]
    pub workspace_id: Option<WorkspaceId>,
    /// Generated once at execution time when absent; stable for the run.
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub model_kwargs: serde_json::Map<String, Value>,
}

/// Payload of a `heartbeat` request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatPayload {
    pub session_id: SessionId,
}

/// What a decoded record asks for. Unrecognized actions decode successfully
/// so the coordinator can no-op them without treating them as errors.
#[derive(Clone, Debug)]
pub enum RequestKind {
    Run(RunPayload),
    Heartbeat(HeartbeatPayload),
    Unrecognized { action: String },
}

/// Structured request descriptor produced from one batch record.
/// Immutable once decoded; consumed exactly once by the coordinator.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    pub user_id: UserId,
    pub kind: RequestKind,
}

#[derive(Deserialize)]
struct OuterEnvelope {
    #[serde(rename = "Message")]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InnerEnvelope {
    action: String,
    user_id: String,
    #[serde(default)]
    data: Value,
}

/// Unwrap a transport record into a request descriptor.
///
/// The body parses to `{ "Message": <string> }`; the inner string parses to
/// `{ action, userId, data }`. Any parse failure or absent required field is
/// a [`DispatchError::MalformedEnvelope`]. No side effects.
pub fn decode(record: &RawRecord) -> Result<RequestDescriptor, DispatchError> {
    let outer: OuterEnvelope = serde_json::from_str(&record.body)
        .map_err(|e| DispatchError::malformed(format!("outer payload: {e}")))?;
    let inner: InnerEnvelope = serde_json::from_str(&outer.message)
        .map_err(|e| DispatchError::malformed(format!("inner payload: {e}")))?;

    if inner.user_id.is_empty() {
        return Err(DispatchError::malformed("userId is empty"));
    }

    let kind = match inner.action.as_str() {
        "run" => RequestKind::Run(
            serde_json::from_value(inner.data)
                .map_err(|e| DispatchError::malformed(format!("run payload: {e}")))?,
        ),
        "heartbeat" => RequestKind::Heartbeat(
            serde_json::from_value(inner.data)
                .map_err(|e| DispatchError::malformed(format!("heartbeat payload: {e}")))?,
        ),
        other => RequestKind::Unrecognized {
            action: other.to_string(),
        },
    };

    Ok(RequestDescriptor {
        user_id: UserId::from_raw(inner.user_id),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wrap(inner: Value) -> RawRecord {
        RawRecord::new(json!({ "Message": inner.to_string() }).to_string())
    }

    #[test]
    fn decodes_run_request() {
        let record = wrap(json!({
            "action": "run",
            "userId": "alice",
            "data": {
                "provider": "bedrock",
                "modelId": "anthropic.claude-3-sonnet-20240229-v1:0",
                "mode": "chain",
                "text": "hello there",
                "workspaceId": "ws_docs",
                "sessionId": "sess_abc",
                "modelKwargs": { "temperature": 0.2 }
            }
        }));

        let descriptor = decode(&record).unwrap();
        assert_eq!(descriptor.user_id.as_str(), "alice");
        let RequestKind::Run(payload) = descriptor.kind else {
            panic!("expected run");
        };
        assert_eq!(payload.provider, "bedrock");
        assert_eq!(payload.model_id, "anthropic.claude-3-sonnet-20240229-v1:0");
        assert_eq!(payload.mode, "chain");
        assert_eq!(payload.text, "hello there");
        assert_eq!(payload.workspace_id.unwrap().as_str(), "ws_docs");
        assert_eq!(payload.session_id.unwrap().as_str(), "sess_abc");
        assert_eq!(payload.model_kwargs["temperature"], json!(0.2));
    }

    #[test]
    fn run_optional_fields_default() {
        let record = wrap(json!({
            "action": "run",
            "userId": "alice",
            "data": {
                "provider": "local",
                "modelId": "echo",
                "mode": "chain",
                "text": "hi"
            }
        }));

        let descriptor = decode(&record).unwrap();
        let RequestKind::Run(payload) = descriptor.kind else {
            panic!("expected run");
        };
        assert!(payload.workspace_id.is_none());
        assert!(payload.session_id.is_none());
        assert!(payload.model_kwargs.is_empty());
    }

    #[test]
    fn decodes_heartbeat_request() {
        let record = wrap(json!({
            "action": "heartbeat",
            "userId": "bob",
            "data": { "sessionId": "sess_9" }
        }));

        let descriptor = decode(&record).unwrap();
        let RequestKind::Heartbeat(payload) = descriptor.kind else {
            panic!("expected heartbeat");
        };
        assert_eq!(payload.session_id.as_str(), "sess_9");
    }

    #[test]
    fn unknown_action_decodes_as_unrecognized() {
        let record = wrap(json!({
            "action": "resubscribe",
            "userId": "carol",
            "data": {}
        }));

        let descriptor = decode(&record).unwrap();
        let RequestKind::Unrecognized { action } = descriptor.kind else {
            panic!("expected unrecognized");
        };
        assert_eq!(action, "resubscribe");
    }

    #[test]
    fn rejects_unparseable_outer_body() {
        let record = RawRecord::new("not json at all");
        let err = decode(&record).unwrap_err();
        assert_eq!(err.error_kind(), "malformed_envelope");
    }

    #[test]
    fn rejects_unparseable_inner_message() {
        let record = RawRecord::new(json!({ "Message": "{truncated" }).to_string());
        let err = decode(&record).unwrap_err();
        assert_eq!(err.error_kind(), "malformed_envelope");
    }

    #[test]
    fn rejects_missing_action() {
        let record = wrap(json!({ "userId": "alice", "data": {} }));
        assert!(decode(&record).is_err());
    }

    #[test]
    fn rejects_missing_user_id() {
        let record = wrap(json!({ "action": "run", "data": {} }));
        assert!(decode(&record).is_err());
    }

    #[test]
    fn rejects_run_with_incomplete_payload() {
        let record = wrap(json!({
            "action": "run",
            "userId": "alice",
            "data": { "provider": "bedrock" }
        }));
        let err = decode(&record).unwrap_err();
        assert!(err.to_string().contains("run payload"));
    }

    #[test]
    fn raw_record_serde_keeps_message_id() {
        let record = RawRecord::with_message_id("m-1", "{}");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["messageId"], "m-1");
        let parsed: RawRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }
}
