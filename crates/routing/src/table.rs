//! Hot-swappable routing table
//!
//! The table holds the current rule set as an immutable snapshot that
//! is replaced by whole-value swap on every poll. Readers clone an
//! `Arc` to the snapshot and can never observe a partially-applied
//! update.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::fingerprint::Fingerprint;
use crate::rule::RoutingRule;

/// Immutable view of the rule set from one poll
///
/// Always a fully-formed prior poll result - never partially updated.
#[derive(Debug)]
pub struct TableSnapshot {
    rules: HashMap<String, Arc<RoutingRule>>,
    fingerprint: Fingerprint,
}

impl TableSnapshot {
    fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            fingerprint: Fingerprint::empty(),
        }
    }

    fn from_rules(rules: Vec<RoutingRule>) -> Self {
        let fingerprint = Fingerprint::of_topics(rules.iter().map(|r| r.source_topic.as_str()));

        // last rule wins on duplicate source topics; the store enforces
        // uniqueness so this only matters for hand-built rule lists
        let rules = rules
            .into_iter()
            .map(|rule| (rule.source_topic.clone(), Arc::new(rule)))
            .collect();

        Self { rules, fingerprint }
    }

    /// Look up the rule for a source topic
    pub fn get(&self, topic: &str) -> Option<&Arc<RoutingRule>> {
        self.rules.get(topic)
    }

    /// Fingerprint of this snapshot's topic set
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Number of rules in this snapshot
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Sorted source-topic names in this snapshot
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.rules.keys().cloned().collect();
        topics.sort();
        topics
    }
}

/// The shared routing table
///
/// The only structure shared between the polling refresh path and the
/// routing read path. `lookup` is non-blocking and never triggers a
/// refresh itself.
#[derive(Debug)]
pub struct RoutingTable {
    current: RwLock<Arc<TableSnapshot>>,
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingTable {
    /// Create a table with an empty snapshot
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(TableSnapshot::empty())),
        }
    }

    /// Resolve the routing rule for a topic from the current snapshot
    #[inline]
    pub fn lookup(&self, topic: &str) -> Option<Arc<RoutingRule>> {
        self.current.read().get(topic).cloned()
    }

    /// Get the current snapshot
    pub fn snapshot(&self) -> Arc<TableSnapshot> {
        self.current.read().clone()
    }

    /// Replace the snapshot with a freshly polled rule set
    ///
    /// The snapshot is swapped unconditionally - rule contents may
    /// change without the topic set changing, and readers must still
    /// see the new pipes. Returns the sorted topic list when the
    /// topic-set fingerprint changed, signalling that the broker
    /// subscription needs adjusting.
    pub fn apply(&self, rules: Vec<RoutingRule>) -> Option<Vec<String>> {
        let next = Arc::new(TableSnapshot::from_rules(rules));

        let previous_fingerprint = {
            let mut current = self.current.write();
            let previous = current.fingerprint();
            *current = next.clone();
            previous
        };

        if next.fingerprint() != previous_fingerprint {
            Some(next.topics())
        } else {
            None
        }
    }

    /// Number of rules in the current snapshot
    pub fn rule_count(&self) -> usize {
        self.current.read().rule_count()
    }
}
