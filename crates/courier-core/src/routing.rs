use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite key selecting an execution strategy from the adapter registry.
/// Rendered as `provider.modelId` on the wire and in logs, but always built
/// and compared as a typed pair, never by string concatenation.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingKey {
    pub provider: String,
    pub model_id: String,
}

impl RoutingKey {
    pub fn new(provider: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model_id: model_id.into(),
        }
    }
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.provider, self.model_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn display_is_provider_dot_model() {
        let key = RoutingKey::new("bedrock", "anthropic.claude-3-sonnet-20240229-v1:0");
        assert_eq!(
            key.to_string(),
            "bedrock.anthropic.claude-3-sonnet-20240229-v1:0"
        );
    }

    #[test]
    fn usable_as_map_key() {
        let mut map = HashMap::new();
        map.insert(RoutingKey::new("openai", "gpt-4"), 1);
        assert_eq!(map.get(&RoutingKey::new("openai", "gpt-4")), Some(&1));
        assert_eq!(map.get(&RoutingKey::new("openai", "gpt-3.5")), None);
    }

    #[test]
    fn provider_and_model_both_distinguish() {
        assert_ne!(
            RoutingKey::new("a", "x.y"),
            RoutingKey::new("a.x", "y"),
        );
    }
}
