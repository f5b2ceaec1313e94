use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use courier_core::errors::DispatchError;
use courier_core::ids::{RunId, SessionId, UserId};
use courier_core::strategy::{
    AdapterFactory, AdapterParams, ExecutionStrategy, ModelSuggester, SuggesterFactory, TokenSink,
};

/// Token sink that discards everything. For tests that only care about the
/// final payload.
pub struct NullSink;

impl TokenSink for NullSink {
    fn on_token(&self, _token: Option<&str>, _run_id: &RunId) {}
}

/// Run-scoped params with throwaway ids, for tests constructing strategies
/// directly.
pub fn test_params(model_id: &str) -> AdapterParams {
    AdapterParams {
        run_id: RunId::new(),
        model_id: model_id.to_string(),
        mode: "chain".to_string(),
        session_id: SessionId::new(),
        user_id: UserId::from_raw("test-user"),
        model_kwargs: serde_json::Map::new(),
    }
}

/// What a [`MockAdapterFactory`]'s strategies do when executed.
#[derive(Clone)]
pub enum MockBehavior {
    /// Push each token through the sink, then return the payload.
    Respond {
        tokens: Vec<Option<String>>,
        payload: Value,
    },
    /// Fail execution with this message.
    Fail(String),
}

/// Pre-programmed adapter factory for deterministic tests without any model
/// calls. Records every set of construction params for assertions.
pub struct MockAdapterFactory {
    behavior: MockBehavior,
    constructed: Mutex<Vec<AdapterParams>>,
}

impl MockAdapterFactory {
    /// Convenience: emit these (non-empty) tokens, then return the payload.
    pub fn respond(tokens: &[&str], payload: Value) -> Arc<Self> {
        Self::respond_raw(
            tokens.iter().map(|t| Some((*t).to_string())).collect(),
            payload,
        )
    }

    /// Full control over the token stream, including absent/empty entries.
    pub fn respond_raw(tokens: Vec<Option<String>>, payload: Value) -> Arc<Self> {
        Arc::new(Self {
            behavior: MockBehavior::Respond { tokens, payload },
            constructed: Mutex::new(Vec::new()),
        })
    }

    /// Convenience: every execution fails.
    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior: MockBehavior::Fail(message.to_string()),
            constructed: Mutex::new(Vec::new()),
        })
    }

    /// Params of every strategy constructed so far, in order.
    pub fn constructed(&self) -> Vec<AdapterParams> {
        self.constructed.lock().clone()
    }
}

impl AdapterFactory for MockAdapterFactory {
    fn construct(
        &self,
        params: AdapterParams,
        tokens: Arc<dyn TokenSink>,
    ) -> Arc<dyn ExecutionStrategy> {
        self.constructed.lock().push(params.clone());
        Arc::new(MockStrategy {
            behavior: self.behavior.clone(),
            params,
            tokens,
        })
    }
}

struct MockStrategy {
    behavior: MockBehavior,
    params: AdapterParams,
    tokens: Arc<dyn TokenSink>,
}

#[async_trait]
impl ExecutionStrategy for MockStrategy {
    async fn execute(
        &self,
        _prompt: &str,
        _workspace_id: Option<&courier_core::ids::WorkspaceId>,
    ) -> Result<Value, DispatchError> {
        match &self.behavior {
            MockBehavior::Respond { tokens, payload } => {
                for token in tokens {
                    self.tokens.on_token(token.as_deref(), &self.params.run_id);
                }
                Ok(payload.clone())
            }
            MockBehavior::Fail(message) => Err(DispatchError::Execution(message.clone())),
        }
    }
}

/// What a [`MockSuggesterFactory`]'s suggesters answer.
#[derive(Clone)]
pub enum SuggestOutcome {
    Suggest(String),
    Nothing,
    Fail(String),
}

/// Pre-programmed suggester factory. Records each `(session, user)` binding.
pub struct MockSuggesterFactory {
    outcome: SuggestOutcome,
    bound: Mutex<Vec<(SessionId, UserId)>>,
}

impl MockSuggesterFactory {
    pub fn suggesting(model_id: &str) -> Arc<Self> {
        Self::with_outcome(SuggestOutcome::Suggest(model_id.to_string()))
    }

    pub fn empty() -> Arc<Self> {
        Self::with_outcome(SuggestOutcome::Nothing)
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::with_outcome(SuggestOutcome::Fail(message.to_string()))
    }

    pub fn with_outcome(outcome: SuggestOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            bound: Mutex::new(Vec::new()),
        })
    }

    pub fn bound(&self) -> Vec<(SessionId, UserId)> {
        self.bound.lock().clone()
    }
}

impl SuggesterFactory for MockSuggesterFactory {
    fn bind(&self, session_id: &SessionId, user_id: &UserId) -> Arc<dyn ModelSuggester> {
        self.bound.lock().push((session_id.clone(), user_id.clone()));
        Arc::new(MockSuggester {
            outcome: self.outcome.clone(),
        })
    }
}

struct MockSuggester {
    outcome: SuggestOutcome,
}

#[async_trait]
impl ModelSuggester for MockSuggester {
    async fn suggest(&self, _prompt: &str) -> Result<Option<String>, DispatchError> {
        match &self.outcome {
            SuggestOutcome::Suggest(model_id) => Ok(Some(model_id.clone())),
            SuggestOutcome::Nothing => Ok(None),
            SuggestOutcome::Fail(message) => Err(DispatchError::MetaSuggestion(message.clone())),
        }
    }
}
