//! In-memory configuration store
//!
//! Backs the admin API in single-process deployments and every test
//! that needs a store. Enforces the same validation contract any
//! remote implementation must: invalid pipes are rejected at upsert,
//! never at evaluation time.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use pipestorm_routing::{Pipe, RoutingRule};

use crate::error::{Result, StoreError};
use crate::ConfigStore;

/// In-process rule store keyed by source topic
#[derive(Debug, Default)]
pub struct MemoryStore {
    rules: RwLock<HashMap<String, RoutingRule>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rules
    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    /// Whether the store holds no rules
    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn list(&self) -> Result<Vec<RoutingRule>> {
        let mut rules: Vec<RoutingRule> = self.rules.read().values().cloned().collect();
        rules.sort_by(|a, b| a.source_topic.cmp(&b.source_topic));
        Ok(rules)
    }

    async fn get(&self, source_topic: &str) -> Result<Option<RoutingRule>> {
        Ok(self.rules.read().get(source_topic).cloned())
    }

    async fn upsert(
        &self,
        source_topic: &str,
        pipes: Vec<Pipe>,
        parse_as_json: bool,
    ) -> Result<RoutingRule> {
        if pipes.is_empty() {
            return Err(StoreError::NoPipes {
                source_topic: source_topic.to_string(),
            });
        }

        let rule = RoutingRule {
            source_topic: source_topic.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
            parse_as_json,
            pipes,
        };
        rule.validate()?;

        self.rules
            .write()
            .insert(source_topic.to_string(), rule.clone());

        tracing::debug!(source_topic, pipes = rule.pipes.len(), "rule upserted");
        Ok(rule)
    }

    async fn delete(&self, source_topic: &str) -> Result<()> {
        self.rules.write().remove(source_topic);
        Ok(())
    }
}
