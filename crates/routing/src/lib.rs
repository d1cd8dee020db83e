//! Pipestorm - Routing
//!
//! Routing rules map one source topic to zero or more delivery pipes.
//! The routing table holds the current rule set as an immutable,
//! atomically-swapped snapshot so lookups on the hot path never block
//! the refresh path.
//!
//! # Design
//!
//! - Rules are validated at construction time, not at evaluation time:
//!   a filter that cannot compile is rejected before any message is
//!   ever evaluated against it.
//! - `RoutingTable::lookup` reads the current snapshot only; it never
//!   triggers a refresh. Refreshing is the table poller's job.
//! - The topic-set fingerprint cheaply detects drift between polls so
//!   subscription changes are only signalled when the topic set
//!   actually changed.

mod error;
mod filter;
mod fingerprint;
mod rule;
mod table;

#[cfg(test)]
mod filter_test;

pub use error::{Result, RoutingError};
pub use filter::Predicate;
pub use fingerprint::Fingerprint;
pub use rule::{Pipe, RoutingRule};
pub use table::{RoutingTable, TableSnapshot};
