//! Query cache with in-flight de-duplication and coarse invalidation.
//!
//! # Design
//! The cache maps `(operation, params)` keys to the last successful result
//! plus a staleness flag. It does no I/O itself: `begin` either answers from
//! a fresh entry or registers the caller's fetch future as in flight, and
//! `finish` records the outcome.
//!
//! Ordering is by dispatch sequence number. A completion never replaces an
//! entry written by a later dispatch, so a slow old response cannot clobber
//! a newer one. Invalidation bumps a generation counter: entries present at
//! that moment become stale, in-flight requests from an older generation are
//! no longer joined, and their results are stored already stale.
//!
//! Stale and expired entries are pruned whenever a new result is stored,
//! unless their key is being refetched, so the map holds at most the fresh
//! entries plus one per in-flight key.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use log::debug;
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::pagination::PageWindow;
use crate::types::Todo;

/// A fetch future that any number of callers can await.
pub type SharedFetch = Shared<BoxFuture<'static, Result<CachedValue, ApiError>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Page(PageWindow),
    Todo(i64),
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    Page(Vec<Todo>),
    Todo(Todo),
    Count(u64),
}

impl CachedValue {
    fn kind(&self) -> &'static str {
        match self {
            CachedValue::Page(_) => "page",
            CachedValue::Todo(_) => "todo",
            CachedValue::Count(_) => "count",
        }
    }

    pub fn into_page(self) -> Result<Vec<Todo>, ApiError> {
        match self {
            CachedValue::Page(todos) => Ok(todos),
            other => Err(unexpected("page", &other)),
        }
    }

    pub fn into_todo(self) -> Result<Todo, ApiError> {
        match self {
            CachedValue::Todo(todo) => Ok(todo),
            other => Err(unexpected("todo", &other)),
        }
    }

    pub fn into_count(self) -> Result<u64, ApiError> {
        match self {
            CachedValue::Count(count) => Ok(count),
            other => Err(unexpected("count", &other)),
        }
    }
}

fn unexpected(wanted: &str, got: &CachedValue) -> ApiError {
    ApiError::Deserialization(format!("expected cached {wanted}, found {}", got.kind()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheConfig {
    /// Entries older than this are refetched. `None` keeps them until the
    /// next invalidation.
    pub max_age: Option<Duration>,
}

/// Identifies one dispatched fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    generation: u64,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Outcome of `QueryCache::begin`.
pub enum Begin {
    /// A fresh entry answered the query.
    Hit(CachedValue),
    /// The caller must await `fetch` and report back with `finish`.
    Fetch {
        ticket: Ticket,
        fetch: SharedFetch,
        /// True when the caller joined a request someone else dispatched.
        joined: bool,
    },
}

struct Entry {
    value: CachedValue,
    seq: u64,
    stale: bool,
    fetched_at: Instant,
}

struct InFlight {
    ticket: Ticket,
    fetch: SharedFetch,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, Entry>,
    in_flight: HashMap<QueryKey, InFlight>,
    next_seq: u64,
    generation: u64,
}

pub struct QueryCache {
    config: CacheConfig,
    state: RwLock<CacheState>,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: RwLock::new(CacheState::default()),
        }
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        if entry.stale {
            return false;
        }
        match self.config.max_age {
            Some(max_age) => entry.fetched_at.elapsed() < max_age,
            None => true,
        }
    }

    /// Answer `key` from cache, join its in-flight request, or dispatch the
    /// future built by `dispatch`. Only the last case calls `dispatch`.
    pub async fn begin<F>(&self, key: QueryKey, dispatch: F) -> Begin
    where
        F: FnOnce() -> BoxFuture<'static, Result<CachedValue, ApiError>>,
    {
        let mut state = self.state.write().await;

        if let Some(entry) = state.entries.get(&key) {
            if self.is_fresh(entry) {
                debug!("cache hit for {key:?} (seq {})", entry.seq);
                return Begin::Hit(entry.value.clone());
            }
        }

        if let Some(in_flight) = state.in_flight.get(&key) {
            if in_flight.ticket.generation == state.generation {
                debug!("joining in-flight fetch for {key:?} (seq {})", in_flight.ticket.seq);
                return Begin::Fetch {
                    ticket: in_flight.ticket,
                    fetch: in_flight.fetch.clone(),
                    joined: true,
                };
            }
        }

        state.next_seq += 1;
        let ticket = Ticket {
            seq: state.next_seq,
            generation: state.generation,
        };
        let fetch = dispatch().shared();
        debug!("dispatching fetch for {key:?} (seq {})", ticket.seq);
        state.in_flight.insert(
            key,
            InFlight {
                ticket,
                fetch: fetch.clone(),
            },
        );
        Begin::Fetch {
            ticket,
            fetch,
            joined: false,
        }
    }

    /// Record the outcome of the fetch identified by `ticket`.
    ///
    /// Safe to call once per awaiting caller; repeated reports of the same
    /// ticket are ignored. Failures never touch stored entries. Storing a
    /// result evicts entries that can no longer answer a query.
    pub async fn finish(&self, key: QueryKey, ticket: Ticket, result: &Result<CachedValue, ApiError>) {
        let mut state = self.state.write().await;

        if state.in_flight.get(&key).map(|f| f.ticket.seq) == Some(ticket.seq) {
            state.in_flight.remove(&key);
        }

        let value = match result {
            Ok(value) => value,
            Err(e) => {
                debug!("fetch for {key:?} (seq {}) failed: {e}", ticket.seq);
                return;
            }
        };

        if let Some(existing) = state.entries.get(&key) {
            if existing.seq >= ticket.seq {
                if existing.seq > ticket.seq {
                    debug!(
                        "dropping result for {key:?} (seq {}); seq {} already stored",
                        ticket.seq, existing.seq
                    );
                }
                return;
            }
        }

        let CacheState { entries, in_flight, .. } = &mut *state;
        let before = entries.len();
        entries.retain(|k, e| *k == key || in_flight.contains_key(k) || self.is_fresh(e));
        let pruned = before - entries.len();
        if pruned > 0 {
            debug!("pruned {pruned} stale cached queries");
        }

        let stale = ticket.generation < state.generation;
        state.entries.insert(
            key,
            Entry {
                value: value.clone(),
                seq: ticket.seq,
                stale,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Mark every entry stale and stop new callers from joining requests
    /// dispatched before now. Returns how many entries were marked.
    pub async fn invalidate_all(&self) -> usize {
        let mut state = self.state.write().await;
        state.generation += 1;
        let mut marked = 0;
        for entry in state.entries.values_mut() {
            if !entry.stale {
                entry.stale = true;
                marked += 1;
            }
        }
        debug!("invalidated {marked} cached queries (generation {})", state.generation);
        marked
    }

    /// Last stored value for `key`, fresh or not.
    pub async fn peek(&self, key: &QueryKey) -> Option<CachedValue> {
        let state = self.state.read().await;
        state.entries.get(key).map(|e| e.value.clone())
    }

    /// `None` when nothing is stored for `key`.
    pub async fn is_stale(&self, key: &QueryKey) -> Option<bool> {
        let state = self.state.read().await;
        state.entries.get(key).map(|e| !self.is_fresh(e))
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn in_flight(&self) -> usize {
        self.state.read().await.in_flight.len()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
