// Plant record id generation
// The store takes an IdGenerator so tests can supply deterministic ids.

use std::sync::atomic::{AtomicU64, Ordering};
use rand::Rng;

use crate::constants::ID_RANDOM_SUFFIX_LEN;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs. Default for new stores.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Millisecond timestamp followed by a random base36 suffix,
/// e.g. `1718035200123k3j9x0a2b`. Matches ids already written by earlier app versions.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampIdGenerator;

impl IdGenerator for TimestampIdGenerator {
    fn next_id(&self) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_RANDOM_SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        format!("{}{}", millis, suffix)
    }
}

/// Deterministic `<prefix><n>` ids starting at 1.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("plant-")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_timestamp_id_shape() {
        let id = TimestampIdGenerator.next_id();
        let (millis, suffix) = id.split_at(id.len() - ID_RANDOM_SUFFIX_LEN);

        assert!(millis.parse::<i64>().is_ok(), "prefix should be decimal millis: {}", id);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)), "suffix should be base36: {}", id);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new("p");
        assert_eq!(ids.next_id(), "p1");
        assert_eq!(ids.next_id(), "p2");
        assert_eq!(ids.next_id(), "p3");
    }

    #[test]
    fn test_uuid_ids_unique() {
        let ids: HashSet<String> = (0..500).map(|_| UuidGenerator.next_id()).collect();
        assert_eq!(ids.len(), 500);
    }
}
