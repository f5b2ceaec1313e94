use std::sync::Arc;

use courier_core::channel::DeliveryChannel;
use courier_core::envelope::RunPayload;
use courier_core::errors::DispatchError;
use courier_core::events::OutboundEvent;
use courier_core::ids::{RunId, SessionId, UserId};
use courier_core::sequence::SequenceCounter;
use courier_core::strategy::AdapterParams;

use crate::relay::TokenRelay;
use crate::resolver::AdapterResolver;

/// Orchestrates one run end-to-end: session resolution, adapter resolution,
/// relay binding, strategy execution, final response emission.
pub struct RunExecutor {
    resolver: AdapterResolver,
    sequence: Arc<SequenceCounter>,
    channel: Arc<dyn DeliveryChannel>,
}

impl RunExecutor {
    pub fn new(
        resolver: AdapterResolver,
        sequence: Arc<SequenceCounter>,
        channel: Arc<dyn DeliveryChannel>,
    ) -> Self {
        Self {
            resolver,
            sequence,
            channel,
        }
    }

    /// Any failure before the final response propagates to the coordinator
    /// as a single-record failure. A failure delivering the final response
    /// is logged and swallowed, never retried.
    pub async fn execute(&self, user_id: &UserId, payload: RunPayload) -> Result<(), DispatchError> {
        // Generated once when absent; stable for the lifetime of the run.
        let session_id = payload.session_id.clone().unwrap_or_else(SessionId::new);

        let (factory, effective_model_id) = self
            .resolver
            .resolve(
                &payload.provider,
                &payload.model_id,
                &session_id,
                user_id,
                &payload.text,
            )
            .await?;

        let run_id = RunId::new();
        let relay = Arc::new(TokenRelay::new(
            user_id.clone(),
            session_id.clone(),
            Arc::clone(&self.sequence),
            Arc::clone(&self.channel),
        ));

        let strategy = factory.construct(
            AdapterParams {
                run_id: run_id.clone(),
                model_id: effective_model_id,
                mode: payload.mode.clone(),
                session_id: session_id.clone(),
                user_id: user_id.clone(),
                model_kwargs: payload.model_kwargs.clone(),
            },
            relay,
        );

        let response = strategy
            .execute(&payload.text, payload.workspace_id.as_ref())
            .await?;
        tracing::info!(session_id = %session_id, run_id = %run_id, "run completed");

        let event = OutboundEvent::final_response(user_id, response);
        if let Err(error) = self.channel.send(&event) {
            tracing::warn!(%error, session_id = %session_id, "final response delivery dropped");
        }

        Ok(())
    }
}
