use std::sync::Arc;

use courier_core::channel::DeliveryChannel;
use courier_core::events::{OutboundEvent, TokenEvent};
use courier_core::ids::{RunId, SessionId, UserId};
use courier_core::sequence::SequenceCounter;
use courier_core::strategy::TokenSink;

/// Per-run token relay.
///
/// Bound once to the requesting user and session at construction; turns raw
/// incremental tokens into ordered `llm_new_token` events. The sequence
/// counter is the process-wide one, shared with every other concurrent run,
/// so ordering is guaranteed only within this run's observed stream.
pub struct TokenRelay {
    user_id: UserId,
    session_id: SessionId,
    sequence: Arc<SequenceCounter>,
    channel: Arc<dyn DeliveryChannel>,
}

impl TokenRelay {
    pub fn new(
        user_id: UserId,
        session_id: SessionId,
        sequence: Arc<SequenceCounter>,
        channel: Arc<dyn DeliveryChannel>,
    ) -> Self {
        Self {
            user_id,
            session_id,
            sequence,
            channel,
        }
    }
}

impl TokenSink for TokenRelay {
    fn on_token(&self, token: Option<&str>, run_id: &RunId) {
        // Empty or absent tokens are dropped without touching the counter.
        let Some(value) = token.filter(|t| !t.is_empty()) else {
            return;
        };

        let event = OutboundEvent::llm_new_token(
            &self.user_id,
            &self.session_id,
            TokenEvent {
                run_id: run_id.clone(),
                sequence_number: self.sequence.next(),
                value: value.to_string(),
            },
        );

        // Delivery failures are the channel's concern, not the relay's.
        if let Err(error) = self.channel.send(&event) {
            tracing::debug!(%error, run_id = %run_id, "token delivery dropped");
        }
    }
}
