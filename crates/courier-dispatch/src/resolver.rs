use std::sync::Arc;

use courier_adapters::{AdapterRegistry, DEFAULT_FALLBACK_MODEL_ID, META_MODEL_SENTINEL};
use courier_core::errors::DispatchError;
use courier_core::ids::{SessionId, UserId};
use courier_core::routing::RoutingKey;
use courier_core::strategy::{AdapterFactory, SuggesterFactory};

/// Maps a `(provider, modelId)` pair to a registered adapter factory.
///
/// When the model id is the meta-routing sentinel, a suggester bound to the
/// requesting session and user is consulted first and the model id is
/// rewritten before the routing key is built. The suggestion call is never
/// retried here; a failed call surfaces as a single-record failure.
pub struct AdapterResolver {
    registry: Arc<AdapterRegistry>,
    suggesters: Arc<dyn SuggesterFactory>,
    fallback_model_id: String,
}

impl AdapterResolver {
    pub fn new(registry: Arc<AdapterRegistry>, suggesters: Arc<dyn SuggesterFactory>) -> Self {
        Self {
            registry,
            suggesters,
            fallback_model_id: DEFAULT_FALLBACK_MODEL_ID.to_string(),
        }
    }

    /// Override the model id substituted when the suggester has no opinion.
    pub fn with_fallback(mut self, model_id: impl Into<String>) -> Self {
        self.fallback_model_id = model_id.into();
        self
    }

    /// Resolve the factory and the effective model id for one run.
    pub async fn resolve(
        &self,
        provider: &str,
        model_id: &str,
        session_id: &SessionId,
        user_id: &UserId,
        prompt: &str,
    ) -> Result<(Arc<dyn AdapterFactory>, String), DispatchError> {
        let effective = if model_id == META_MODEL_SENTINEL {
            let suggester = self.suggesters.bind(session_id, user_id);
            match suggester.suggest(prompt).await? {
                Some(suggested) => {
                    tracing::info!(model_id = %suggested, "meta model suggested");
                    suggested
                }
                None => {
                    tracing::error!(
                        fallback = %self.fallback_model_id,
                        "meta model produced no suggestion, substituting fallback"
                    );
                    self.fallback_model_id.clone()
                }
            }
        } else {
            model_id.to_string()
        };

        let key = RoutingKey::new(provider, &effective);
        match self.registry.get(&key) {
            Some(factory) => Ok((factory, effective)),
            None => Err(DispatchError::UnknownAdapter { key }),
        }
    }
}
