//! Pipestorm - Store
//!
//! The configuration store holds routing rules outside the process;
//! the pipeline only ever observes it through the periodic table
//! poller. The admin API mutates it.
//!
//! # Design
//!
//! - `ConfigStore` is the collaborator boundary: the core only calls
//!   `list()`; the admin surface uses the full CRUD contract.
//! - `MemoryStore` is the in-process implementation, validating every
//!   pipe at upsert time so invalid filters never reach the table.
//! - `TablePoller` refreshes the routing table on a fixed interval,
//!   keeps the previous snapshot on store failure
//!   (stale-but-available) and signals topic-set changes over a
//!   channel.

mod error;
mod memory;
mod poller;

#[cfg(test)]
mod poller_test;

use async_trait::async_trait;

use pipestorm_routing::{Pipe, RoutingRule};

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use poller::{TableEvent, TablePoller};

/// External store of routing rules, keyed by source topic
///
/// Implementations must enforce source-topic uniqueness. All calls are
/// expected to carry a bounded timeout internally.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// List all routing rules
    async fn list(&self) -> Result<Vec<RoutingRule>>;

    /// Get the rule for one source topic
    async fn get(&self, source_topic: &str) -> Result<Option<RoutingRule>>;

    /// Create or replace the rule for a source topic
    ///
    /// # Errors
    ///
    /// Fails when the pipe list is empty or any pipe is invalid.
    async fn upsert(
        &self,
        source_topic: &str,
        pipes: Vec<Pipe>,
        parse_as_json: bool,
    ) -> Result<RoutingRule>;

    /// Delete the rule for a source topic (idempotent)
    async fn delete(&self, source_topic: &str) -> Result<()>;
}
