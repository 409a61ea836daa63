//! Per-conversation history for the prompt layer
//!
//! A [`SessionStore`] is owned by the caller and passed to whatever builds
//! prompts. Each session keeps at most `max_turns` recent exchanges. The
//! store holds at most `capacity` sessions, dropping the least recently
//! active one when full, and [`SessionStore::evict_idle`] drops sessions
//! that have been quiet for longer than `idle_timeout`.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Session store limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of live sessions
    pub capacity: usize,
    /// Exchanges remembered per session
    pub max_turns: usize,
    /// Seconds of inactivity after which a session may be evicted
    pub idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            max_turns: 5,
            idle_timeout_secs: 3600,
        }
    }
}

/// One question and the answer given to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

impl Turn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Debug)]
struct Session {
    turns: VecDeque<Turn>,
    last_active: Instant,
    /// Monotonic activity stamp, breaks ties between equal `Instant`s
    tick: u64,
}

/// Bounded map from session key to recent conversation turns.
#[derive(Debug)]
pub struct SessionStore<K> {
    sessions: HashMap<K, Session>,
    capacity: usize,
    max_turns: usize,
    idle_timeout: Duration,
    tick: u64,
}

impl<K: Eq + Hash + Clone> SessionStore<K> {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            capacity: config.capacity.max(1),
            max_turns: config.max_turns,
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
            tick: 0,
        }
    }

    /// Append a turn to `key`'s history, creating the session if needed.
    pub fn record(&mut self, key: K, turn: Turn) {
        self.record_at(key, turn, Instant::now());
    }

    /// [`record`](Self::record) with an explicit timestamp.
    pub fn record_at(&mut self, key: K, turn: Turn, now: Instant) {
        self.tick += 1;

        if !self.sessions.contains_key(&key) && self.sessions.len() >= self.capacity {
            self.evict_least_recent();
        }

        let session = self.sessions.entry(key).or_insert_with(|| Session {
            turns: VecDeque::new(),
            last_active: now,
            tick: 0,
        });
        session.turns.push_back(turn);
        while session.turns.len() > self.max_turns {
            session.turns.pop_front();
        }
        session.last_active = now;
        session.tick = self.tick;
    }

    /// Recent turns for `key`, oldest first. Empty for unknown keys.
    #[must_use]
    pub fn history(&self, key: &K) -> Vec<Turn> {
        self.sessions
            .get(key)
            .map(|s| s.turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Forget `key`'s history.
    pub fn clear(&mut self, key: &K) {
        self.sessions.remove(key);
    }

    /// Drop every session idle for longer than the configured timeout.
    /// Returns how many were dropped.
    pub fn evict_idle(&mut self, now: Instant) -> usize {
        let before = self.sessions.len();
        let timeout = self.idle_timeout;
        self.sessions
            .retain(|_, s| now.saturating_duration_since(s.last_active) <= timeout);
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.sessions.len(), "evicted idle sessions");
        }
        evicted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|(_, s)| s.tick)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            self.sessions.remove(&key);
        }
    }
}

impl<K: Eq + Hash + Clone> Default for SessionStore<K> {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(capacity: usize, max_turns: usize, idle_timeout_secs: u64) -> SessionStore<u64> {
        SessionStore::new(&SessionConfig {
            capacity,
            max_turns,
            idle_timeout_secs,
        })
    }

    #[test]
    fn test_history_keeps_last_turns() {
        let mut sessions = store(10, 2, 60);
        sessions.record(1, Turn::new("q1", "a1"));
        sessions.record(1, Turn::new("q2", "a2"));
        sessions.record(1, Turn::new("q3", "a3"));

        let history = sessions.history(&1);
        assert_eq!(history, vec![Turn::new("q2", "a2"), Turn::new("q3", "a3")]);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut sessions = store(10, 5, 60);
        sessions.record(1, Turn::new("mine", "a"));
        sessions.record(2, Turn::new("yours", "b"));

        assert_eq!(sessions.history(&1)[0].question, "mine");
        assert_eq!(sessions.history(&2)[0].question, "yours");
        assert!(sessions.history(&3).is_empty());
    }

    #[test]
    fn test_capacity_evicts_least_recently_active() {
        let mut sessions = store(2, 5, 60);
        sessions.record(1, Turn::new("q", "a"));
        sessions.record(2, Turn::new("q", "a"));
        // touch 1 so 2 becomes the oldest
        sessions.record(1, Turn::new("q", "a"));
        sessions.record(3, Turn::new("q", "a"));

        assert_eq!(sessions.len(), 2);
        assert!(sessions.history(&2).is_empty());
        assert_eq!(sessions.history(&1).len(), 2);
        assert_eq!(sessions.history(&3).len(), 1);
    }

    #[test]
    fn test_evict_idle() {
        let mut sessions = store(10, 5, 60);
        let start = Instant::now();
        sessions.record_at(1, Turn::new("q", "a"), start);
        sessions.record_at(2, Turn::new("q", "a"), start + Duration::from_secs(100));

        let evicted = sessions.evict_idle(start + Duration::from_secs(120));
        assert_eq!(evicted, 1);
        assert!(sessions.history(&1).is_empty());
        assert_eq!(sessions.history(&2).len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut sessions = store(10, 5, 60);
        sessions.record(7, Turn::new("q", "a"));
        sessions.clear(&7);
        assert!(sessions.is_empty());
    }
}
