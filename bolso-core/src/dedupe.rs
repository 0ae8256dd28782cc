//! Duplicate-message suppression.
//!
//! Chat transports redeliver: the same message can arrive twice within a few
//! seconds. Each processed message key is remembered with its arrival
//! timestamp and expired lazily on access — an explicit session store instead
//! of fire-and-forget deletion timers.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug)]
pub struct RecentMessages {
    ttl: TimeDelta,
    seen: HashMap<String, DateTime<Utc>>,
}

impl Default for RecentMessages {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(30))
    }
}

impl RecentMessages {
    pub fn new(ttl: TimeDelta) -> Self {
        Self { ttl, seen: HashMap::new() }
    }

    /// Record one message key. Returns true when the key was already seen
    /// inside the TTL window (i.e. the message is a duplicate and should be
    /// dropped). An expired entry counts as unseen and is re-stamped.
    pub fn observe(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        if let Some(&seen_at) = self.seen.get(key) {
            if now - seen_at <= self.ttl {
                return true;
            }
        }
        self.seen.insert(key.to_string(), now);
        false
    }

    /// Drop every expired entry. Cheap enough to call per message.
    pub fn purge(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.seen.retain(|_, &mut seen_at| now - seen_at <= ttl);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn repeat_within_ttl_is_duplicate() {
        let mut recent = RecentMessages::default();
        let now = t0();

        assert!(!recent.observe("u1-m1", now));
        assert!(recent.observe("u1-m1", now + TimeDelta::seconds(5)));
    }

    #[test]
    fn repeat_after_ttl_is_fresh() {
        let mut recent = RecentMessages::default();
        let now = t0();

        assert!(!recent.observe("u1-m1", now));
        assert!(!recent.observe("u1-m1", now + TimeDelta::seconds(31)));
    }

    #[test]
    fn distinct_keys_do_not_collide() {
        let mut recent = RecentMessages::default();
        let now = t0();

        assert!(!recent.observe("u1-m1", now));
        assert!(!recent.observe("u1-m2", now));
        assert!(!recent.observe("u2-m1", now));
    }

    #[test]
    fn purge_drops_only_expired_entries() {
        let mut recent = RecentMessages::default();
        let now = t0();

        recent.observe("old", now);
        recent.observe("new", now + TimeDelta::seconds(25));
        recent.purge(now + TimeDelta::seconds(35));

        assert_eq!(recent.len(), 1);
        assert!(recent.observe("new", now + TimeDelta::seconds(36)));
    }
}
