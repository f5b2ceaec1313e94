use std::collections::HashMap;
use std::sync::Arc;

use courier_core::routing::RoutingKey;
use courier_core::strategy::AdapterFactory;

/// Immutable lookup table from routing key to adapter factory.
///
/// Built once before batch processing starts; lookups are plain reads with
/// no locking. Registration happens through the builder so a constructed
/// registry can never change underneath a running batch.
pub struct AdapterRegistry {
    factories: HashMap<RoutingKey, Arc<dyn AdapterFactory>>,
}

impl AdapterRegistry {
    pub fn builder() -> AdapterRegistryBuilder {
        AdapterRegistryBuilder {
            factories: HashMap::new(),
        }
    }

    pub fn get(&self, key: &RoutingKey) -> Option<Arc<dyn AdapterFactory>> {
        self.factories.get(key).map(Arc::clone)
    }

    pub fn contains(&self, key: &RoutingKey) -> bool {
        self.factories.contains_key(key)
    }

    /// Registered routing keys, sorted for stable logging.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.factories.keys().map(ToString::to_string).collect();
        keys.sort();
        keys
    }

    pub fn count(&self) -> usize {
        self.factories.len()
    }
}

pub struct AdapterRegistryBuilder {
    factories: HashMap<RoutingKey, Arc<dyn AdapterFactory>>,
}

impl AdapterRegistryBuilder {
    /// Register a factory. Later registrations for the same key win.
    pub fn register(mut self, key: RoutingKey, factory: Arc<dyn AdapterFactory>) -> Self {
        self.factories.insert(key, factory);
        self
    }

    pub fn build(self) -> AdapterRegistry {
        AdapterRegistry {
            factories: self.factories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockAdapterFactory;
    use serde_json::json;

    #[test]
    fn lookup_by_typed_key() {
        let registry = AdapterRegistry::builder()
            .register(
                RoutingKey::new("bedrock", "claude-x"),
                MockAdapterFactory::respond(&[], json!({})),
            )
            .build();

        assert!(registry.get(&RoutingKey::new("bedrock", "claude-x")).is_some());
        assert!(registry.get(&RoutingKey::new("bedrock", "claude-y")).is_none());
        assert!(registry.get(&RoutingKey::new("openai", "claude-x")).is_none());
    }

    #[tokio::test]
    async fn later_registration_wins() {
        let key = RoutingKey::new("local", "echo");
        let registry = AdapterRegistry::builder()
            .register(key.clone(), MockAdapterFactory::respond(&[], json!({"n": 1})))
            .register(key.clone(), MockAdapterFactory::respond(&[], json!({"n": 2})))
            .build();

        assert_eq!(registry.count(), 1);
        let strategy = registry
            .get(&key)
            .unwrap()
            .construct(crate::mock::test_params("echo"), Arc::new(crate::mock::NullSink));
        let payload = strategy.execute("hi", None).await.unwrap();
        assert_eq!(payload["n"], 2);
    }

    #[test]
    fn keys_sorted() {
        let registry = AdapterRegistry::builder()
            .register(
                RoutingKey::new("openai", "gpt-4"),
                MockAdapterFactory::respond(&[], json!({})),
            )
            .register(
                RoutingKey::new("bedrock", "claude-x"),
                MockAdapterFactory::respond(&[], json!({})),
            )
            .build();

        assert_eq!(registry.keys(), vec!["bedrock.claude-x", "openai.gpt-4"]);
    }
}
