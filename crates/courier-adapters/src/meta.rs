use std::sync::Arc;

use async_trait::async_trait;
use courier_core::errors::DispatchError;
use courier_core::ids::{SessionId, UserId};
use courier_core::strategy::{ModelSuggester, SuggesterFactory};

/// Reserved model id that triggers the meta-routing suggestion step before
/// normal routing-key resolution.
pub const META_MODEL_SENTINEL: &str = "meta_model_as_db_supersecret_id";

/// Substituted when the suggester produces no suggestion. Kept as a named
/// constant; the resolver accepts an override for deployments that want a
/// different default.
pub const DEFAULT_FALLBACK_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

/// Suggester that never has an opinion; resolution always falls through to
/// the fallback model id. The default wiring until a real meta model adapter
/// is registered.
pub struct NoSuggestion;

#[async_trait]
impl ModelSuggester for NoSuggestion {
    async fn suggest(&self, _prompt: &str) -> Result<Option<String>, DispatchError> {
        Ok(None)
    }
}

pub struct NoSuggestionFactory;

impl SuggesterFactory for NoSuggestionFactory {
    fn bind(&self, _session_id: &SessionId, _user_id: &UserId) -> Arc<dyn ModelSuggester> {
        Arc::new(NoSuggestion)
    }
}
