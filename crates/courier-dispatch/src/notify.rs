use std::sync::Arc;

use serde_json::Value;

use courier_core::channel::DeliveryChannel;
use courier_core::envelope::RawRecord;
use courier_core::errors::DispatchError;
use courier_core::events::OutboundEvent;
use courier_core::ids::UserId;

/// Converts failed records into user-facing error events.
///
/// Everything here is best-effort: the original record is partially
/// re-decoded just far enough to address the notification, and any failure
/// along the way (including delivery) is swallowed. A failure notification
/// must never throw.
pub struct FailureNotifier {
    channel: Arc<dyn DeliveryChannel>,
}

impl FailureNotifier {
    pub fn new(channel: Arc<dyn DeliveryChannel>) -> Self {
        Self { channel }
    }

    /// Emit one error event per failed record.
    pub fn notify_failures<'a>(
        &self,
        failed: impl Iterator<Item = (&'a DispatchError, &'a RawRecord)>,
    ) {
        for (error, record) in failed {
            match recover_identity(record) {
                Some((user_id, session_id)) => {
                    let event = OutboundEvent::error(&user_id, &session_id, &error.to_string());
                    if let Err(error) = self.channel.send(&event) {
                        tracing::debug!(%error, "error notification dropped");
                    }
                }
                None => {
                    tracing::warn!(
                        message_id = ?record.message_id,
                        "failed record is unaddressable, skipping error notification"
                    );
                }
            }
        }
    }
}

/// Best-effort partial decode: just the user id and (optionally) the session
/// id, tolerating any other damage to the envelope. The session id falls
/// back to empty when unrecoverable.
fn recover_identity(record: &RawRecord) -> Option<(UserId, String)> {
    let outer: Value = serde_json::from_str(&record.body).ok()?;
    let inner: Value = serde_json::from_str(outer.get("Message")?.as_str()?).ok()?;

    let user_id = inner.get("userId")?.as_str().filter(|u| !u.is_empty())?;
    let session_id = inner
        .get("data")
        .and_then(|data| data.get("sessionId"))
        .and_then(Value::as_str)
        .unwrap_or("");

    Some((UserId::from_raw(user_id), session_id.to_string()))
}
