//! Bounded per-session conversation history
//!
//! The store exclusively owns `Session` values. Adapters hold only a session
//! key and go through `get`/`append`/`evict`; both return detached copies of
//! the history, never live references.
//!
//! Concurrency: the map is sharded (`DashMap`), so operations on distinct
//! keys proceed in parallel while two appends to the same key serialize on
//! the entry. History order within a session is therefore always consistent.
//!
//! Sessions are only removed by explicit `evict`; long-running deployments
//! are expected to drive eviction from their own TTL policy.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default maximum exchanges retained per session.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Who produced one history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
}

/// One (role, text) entry in a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub role: Role,
    pub text: String,
}

impl Exchange {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            text: text.into(),
        }
    }
}

/// Conversation state for one session key.
#[derive(Debug, Clone)]
pub struct Session {
    pub key: String,
    history: VecDeque<Exchange>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            history: VecDeque::new(),
            last_seen: Utc::now(),
        }
    }

    fn push(&mut self, exchange: Exchange, limit: usize) {
        while self.history.len() >= limit {
            self.history.pop_front();
        }
        self.history.push_back(exchange);
        self.last_seen = Utc::now();
    }

    pub fn history(&self) -> Vec<Exchange> {
        self.history.iter().cloned().collect()
    }
}

/// Shared store mapping session keys to bounded histories.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    limit: usize,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            limit: limit.max(1),
        }
    }

    /// History for `key`, or `None` if the session does not exist.
    pub fn get(&self, key: &str) -> Option<Vec<Exchange>> {
        self.sessions.get(key).map(|session| session.history())
    }

    /// Appends one exchange, creating the session on first use, and returns
    /// a copy of the resulting history. Exchanges past the limit are
    /// evicted oldest-first.
    pub fn append(&self, key: &str, exchange: Exchange) -> Vec<Exchange> {
        let mut entry = self.sessions.entry(key.to_string()).or_insert_with(|| {
            debug!(session_key = %key, "created session");
            Session::new(key)
        });
        entry.push(exchange, self.limit);
        entry.history()
    }

    /// Removes the session entirely. Returns whether it existed.
    pub fn evict(&self, key: &str) -> bool {
        let existed = self.sessions.remove(key).is_some();
        if existed {
            debug!(session_key = %key, "evicted session");
        }
        existed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
