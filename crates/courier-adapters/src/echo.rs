use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use courier_core::errors::DispatchError;
use courier_core::ids::WorkspaceId;
use courier_core::strategy::{AdapterFactory, AdapterParams, ExecutionStrategy, TokenSink};

/// Local development adapter: streams the prompt back one whitespace-split
/// token at a time, then returns a final payload echoing what it saw. Lets
/// the whole dispatch path be exercised without any model provider.
pub struct EchoAdapterFactory;

impl AdapterFactory for EchoAdapterFactory {
    fn construct(
        &self,
        params: AdapterParams,
        tokens: Arc<dyn TokenSink>,
    ) -> Arc<dyn ExecutionStrategy> {
        Arc::new(EchoAdapter { params, tokens })
    }
}

struct EchoAdapter {
    params: AdapterParams,
    tokens: Arc<dyn TokenSink>,
}

#[async_trait]
impl ExecutionStrategy for EchoAdapter {
    async fn execute(
        &self,
        prompt: &str,
        workspace_id: Option<&WorkspaceId>,
    ) -> Result<Value, DispatchError> {
        for word in prompt.split_whitespace() {
            self.tokens.on_token(Some(word), &self.params.run_id);
        }

        Ok(json!({
            "sessionId": &self.params.session_id,
            "content": prompt,
            "metadata": {
                "modelId": &self.params.model_id,
                "mode": &self.params.mode,
                "workspaceId": workspace_id,
                "modelKwargs": &self.params.model_kwargs,
            }
        }))
    }
}
