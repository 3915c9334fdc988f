//! Notification identifier generation

use std::sync::atomic::{AtomicU64, Ordering};

use crate::notifications::notification::NotificationId;

/// Source of fresh notification identifiers
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> NotificationId;
}

/// Random v4 UUIDs backed by the operating system's secure RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> NotificationId {
        NotificationId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Monotonic counter rendered as a decimal string, wrapping at `u64::MAX`
///
/// Unique within one generator; useful where ids should be predictable.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    count: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting after `start`
    pub fn starting_after(start: u64) -> Self {
        Self {
            count: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> NotificationId {
        let next = self.count.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        NotificationId::new(next.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_ids_are_unique() {
        let generator = RandomIdGenerator;
        let ids: HashSet<_> = (0..1000).map(|_| generator.next_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_random_ids_are_uuids() {
        let id = RandomIdGenerator.next_id();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_sequential_ids_count_from_one() {
        let generator = SequentialIdGenerator::new();
        assert_eq!(generator.next_id().as_str(), "1");
        assert_eq!(generator.next_id().as_str(), "2");
        assert_eq!(generator.next_id().as_str(), "3");
    }

    #[test]
    fn test_sequential_ids_wrap() {
        let generator = SequentialIdGenerator::starting_after(u64::MAX - 1);
        assert_eq!(generator.next_id().as_str(), u64::MAX.to_string());
        assert_eq!(generator.next_id().as_str(), "0");
    }
}
