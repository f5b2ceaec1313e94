use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::DispatchError;
use crate::ids::{RunId, SessionId, UserId, WorkspaceId};

/// Fixed callback shape for incremental model output.
///
/// The sink is bound once per run at construction time; strategies invoke it
/// an unbounded number of times while executing. Absent and empty tokens are
/// no-ops at the sink. Implementations never return errors and never panic;
/// whatever happens downstream of a token is not the strategy's concern.
pub trait TokenSink: Send + Sync {
    fn on_token(&self, token: Option<&str>, run_id: &RunId);
}

/// Run-scoped parameters handed to a factory when constructing a strategy.
#[derive(Clone, Debug)]
pub struct AdapterParams {
    pub run_id: RunId,
    pub model_id: String,
    pub mode: String,
    pub session_id: SessionId,
    pub user_id: UserId,
    pub model_kwargs: serde_json::Map<String, Value>,
}

/// One model/provider invocation, bound to a single run.
///
/// Execution is synchronous from the coordinator's perspective: it is awaited
/// to completion, no cancellation is offered mid-run, and no retries happen
/// at this layer. The final payload is provider/model specific and opaque to
/// the core beyond being serializable.
#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    async fn execute(
        &self,
        prompt: &str,
        workspace_id: Option<&WorkspaceId>,
    ) -> Result<Value, DispatchError>;
}

/// Constructs run-scoped execution strategies.
///
/// The token sink is a constructor-time dependency: a strategy is fully
/// configured when built and never mutated afterwards.
pub trait AdapterFactory: Send + Sync {
    fn construct(&self, params: AdapterParams, tokens: Arc<dyn TokenSink>)
        -> Arc<dyn ExecutionStrategy>;
}

/// Meta-routing: picks a concrete model id on behalf of the caller.
///
/// `Ok(None)` means "no opinion": the resolver substitutes the fallback
/// model id. `Err` means the suggestion call itself failed; it surfaces as a
/// [`DispatchError::MetaSuggestion`] single-record failure and is never
/// retried here.
#[async_trait]
pub trait ModelSuggester: Send + Sync {
    async fn suggest(&self, prompt: &str) -> Result<Option<String>, DispatchError>;
}

/// Builds a suggester bound to the requesting session and user.
pub trait SuggesterFactory: Send + Sync {
    fn bind(&self, session_id: &SessionId, user_id: &UserId) -> Arc<dyn ModelSuggester>;
}
