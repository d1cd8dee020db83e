//! Topic-set fingerprinting
//!
//! A fixed-width hash over the sorted distinct source-topic names,
//! used to cheaply detect routing-table drift between polls.

use std::fmt;

use sha2::{Digest, Sha256};

/// Fixed-width fingerprint of a topic-name set
///
/// Deterministic and stable: insertion order and duplicates do not
/// affect the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute the fingerprint of a set of topic names
    pub fn of_topics<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = topics
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        names.sort();
        names.dedup();

        let mut hasher = Sha256::new();
        for name in &names {
            hasher.update(name.as_bytes());
            hasher.update(b"\n");
        }

        Self(hasher.finalize().into())
    }

    /// Fingerprint of the empty topic set
    pub fn empty() -> Self {
        Self::of_topics(std::iter::empty::<&str>())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_and_order_insensitive() {
        let a = Fingerprint::of_topics(["orders", "payments"]);
        let b = Fingerprint::of_topics(["payments", "orders"]);
        let c = Fingerprint::of_topics(["orders", "payments"]);

        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_duplicates_do_not_change_fingerprint() {
        let a = Fingerprint::of_topics(["orders", "orders", "payments"]);
        let b = Fingerprint::of_topics(["orders", "payments"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_sets_differ() {
        let a = Fingerprint::of_topics(["orders"]);
        let b = Fingerprint::of_topics(["payments"]);
        assert_ne!(a, b);
        assert_ne!(a, Fingerprint::empty());
    }

    #[test]
    fn test_separator_prevents_concatenation_collisions() {
        let a = Fingerprint::of_topics(["ab", "c"]);
        let b = Fingerprint::of_topics(["a", "bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_is_hex() {
        let rendered = Fingerprint::empty().to_string();
        assert_eq!(rendered.len(), 64);
        assert!(rendered.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
