use std::sync::Arc;

use courier_core::channel::DeliveryChannel;
use courier_core::errors::DeliveryError;
use courier_core::events::OutboundEvent;

use crate::client::ClientRegistry;

/// [`DeliveryChannel`] that fans an event out to every connected WebSocket
/// client of the addressed user. Callers already treat delivery as
/// best-effort; `NoRecipient` just tells them nobody was listening.
pub struct WsDelivery {
    registry: Arc<ClientRegistry>,
}

impl WsDelivery {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }
}

impl DeliveryChannel for WsDelivery {
    fn send(&self, event: &OutboundEvent) -> Result<(), DeliveryError> {
        let json =
            serde_json::to_string(event).map_err(|e| DeliveryError::Serialize(e.to_string()))?;

        let delivered = self.registry.broadcast_to_user(&event.user_id, &json);
        if delivered == 0 {
            return Err(DeliveryError::NoRecipient);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::ids::{SessionId, UserId};

    #[test]
    fn delivers_serialized_event_to_user_clients() {
        let registry = Arc::new(ClientRegistry::new(32));
        let alice = UserId::from_raw("alice");
        let (_id, mut rx) = registry.register(alice.clone());

        let channel = WsDelivery::new(registry);
        channel
            .send(&OutboundEvent::heartbeat(&alice, &SessionId::from_raw("s1")))
            .unwrap();

        let raw = rx.try_recv().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["action"], "heartbeat");
        assert_eq!(value["userId"], "alice");
        assert_eq!(value["data"]["sessionId"], "s1");
    }

    #[test]
    fn no_connected_client_reports_no_recipient() {
        let registry = Arc::new(ClientRegistry::new(32));
        let channel = WsDelivery::new(registry);

        let result = channel.send(&OutboundEvent::heartbeat(
            &UserId::from_raw("ghost"),
            &SessionId::from_raw("s"),
        ));
        assert!(matches!(result, Err(DeliveryError::NoRecipient)));
    }
}
