use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::DeliveryError;
use crate::events::OutboundEvent;

/// Side channel that pushes an event to the originating client.
///
/// Fire-and-forget: the caller provides ordering via sequence numbers, the
/// channel guarantees nothing beyond attempting the send, and every caller
/// in the core treats a failure as best-effort (logged, never retried,
/// never failing the owning operation).
pub trait DeliveryChannel: Send + Sync {
    fn send(&self, event: &OutboundEvent) -> Result<(), DeliveryError>;
}

/// In-memory channel that records every event it is given. Used by tests
/// across the workspace and as a stand-in when no real transport is wired.
#[derive(Default)]
pub struct BufferChannel {
    events: Mutex<Vec<OutboundEvent>>,
    failing: AtomicBool,
}

impl BufferChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far.
    pub fn events(&self) -> Vec<OutboundEvent> {
        self.events.lock().clone()
    }

    /// Drain recorded events.
    pub fn take(&self) -> Vec<OutboundEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// When failing, every send returns `ChannelClosed` and records nothing.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }
}

impl DeliveryChannel for BufferChannel {
    fn send(&self, event: &OutboundEvent) -> Result<(), DeliveryError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(DeliveryError::ChannelClosed);
        }
        self.events.lock().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{SessionId, UserId};

    #[test]
    fn records_sent_events_in_order() {
        let channel = BufferChannel::new();
        let user = UserId::from_raw("u");
        channel
            .send(&OutboundEvent::heartbeat(&user, &SessionId::from_raw("a")))
            .unwrap();
        channel
            .send(&OutboundEvent::heartbeat(&user, &SessionId::from_raw("b")))
            .unwrap();

        let events = channel.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data["sessionId"], "a");
        assert_eq!(events[1].data["sessionId"], "b");
    }

    #[test]
    fn failing_mode_rejects_and_records_nothing() {
        let channel = BufferChannel::new();
        channel.set_failing(true);
        let result = channel.send(&OutboundEvent::heartbeat(
            &UserId::from_raw("u"),
            &SessionId::from_raw("s"),
        ));
        assert!(matches!(result, Err(DeliveryError::ChannelClosed)));
        assert!(channel.events().is_empty());

        channel.set_failing(false);
        channel
            .send(&OutboundEvent::heartbeat(
                &UserId::from_raw("u"),
                &SessionId::from_raw("s"),
            ))
            .unwrap();
        assert_eq!(channel.events().len(), 1);
    }

    #[test]
    fn take_drains() {
        let channel = BufferChannel::new();
        channel
            .send(&OutboundEvent::heartbeat(
                &UserId::from_raw("u"),
                &SessionId::from_raw("s"),
            ))
            .unwrap();
        assert_eq!(channel.take().len(), 1);
        assert!(channel.events().is_empty());
    }
}
