//! # Summary Result Cache
//!
//! Bounded cache of derived per-token facts that can no longer change.
//!
//! ## Policy
//!
//! | Fact | Stored when | Effect on later reads |
//! |------|-------------|-----------------------|
//! | Terminal proposal status | Derivation hit a terminal status | Served without backend I/O |
//! | Approved vote status | Derivation hit Active, Closed or Completed | Only billing history is re-read |
//!
//! Eviction is FIFO by first insertion, not LRU: reads never reorder, and
//! updating an existing token keeps its place. The lock covers only map and
//! queue manipulation and is never held across backend calls.

use super::value_objects::{ProposalStatus, Token, VoteStatus};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

/// Default number of tokens kept in the cache.
pub const DEFAULT_CACHE_LIMIT: usize = 1000;

/// Cached facts for one token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheEntry {
    /// Terminal proposal status
    pub proposal_status: Option<ProposalStatus>,
    /// Vote status, only ever `Approved`
    pub vote_status: Option<VoteStatus>,
}

/// Cache counters. Observational only.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    /// Lookups that found an entry.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that found nothing.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Entries dropped for capacity.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    data: HashMap<Token, CacheEntry>,
    /// Tokens in first-insertion order, oldest at the front.
    order: VecDeque<Token>,
}

/// Bounded FIFO cache of derived proposal facts.
#[derive(Debug)]
pub struct ResultCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
    stats: CacheStats,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` tokens.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner {
                data: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
            }),
            stats: CacheStats::default(),
        }
    }

    /// Look up the cached facts for a token.
    pub fn get(&self, token: &Token) -> Option<CacheEntry> {
        let entry = self.inner.lock().data.get(token).copied();
        match entry {
            Some(_) => self.stats.hits.fetch_add(1, Ordering::Relaxed),
            None => self.stats.misses.fetch_add(1, Ordering::Relaxed),
        };
        entry
    }

    /// Cache a terminal proposal status.
    ///
    /// Returns `false` and stores nothing for non-terminal statuses.
    pub fn set_proposal_status(&self, token: Token, status: ProposalStatus) -> bool {
        if !status.is_terminal() {
            tracing::warn!(%token, %status, "Refusing to cache non-terminal proposal status");
            return false;
        }
        self.upsert(token, |entry| entry.proposal_status = Some(status))
    }

    /// Cache an approved vote status.
    ///
    /// Returns `false` and stores nothing for any other vote status.
    pub fn set_vote_status(&self, token: Token, status: VoteStatus) -> bool {
        if status != VoteStatus::Approved {
            tracing::warn!(%token, %status, "Refusing to cache non-approved vote status");
            return false;
        }
        self.upsert(token, |entry| entry.vote_status = Some(status))
    }

    fn upsert(&self, token: Token, apply: impl FnOnce(&mut CacheEntry)) -> bool {
        if self.capacity == 0 {
            return false;
        }

        let mut inner = self.inner.lock();

        // Existing entries are updated in place and keep their position.
        if let Some(entry) = inner.data.get_mut(&token) {
            apply(entry);
            return true;
        }

        if inner.order.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.data.remove(&oldest);
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(token = %oldest, "Evicted summary cache entry");
            }
        }

        let mut entry = CacheEntry::default();
        apply(&mut entry);
        inner.order.push_back(token);
        inner.data.insert(token, entry);
        true
    }

    /// Whether a token has an entry.
    pub fn contains(&self, token: &Token) -> bool {
        self.inner.lock().data.contains_key(token)
    }

    /// Number of cached tokens.
    pub fn len(&self) -> usize {
        self.inner.lock().data.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached tokens.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cache counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_LIMIT)
    }
}
