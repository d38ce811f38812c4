//! Observable request status.
//!
//! One `StatusTracker` per invocation. It starts `Idle`, becomes `Pending`
//! when the tracked future starts and settles on `Succeeded` or `Failed`
//! when it resolves. `track` consumes the tracker, so each invocation moves
//! through those states exactly once. Receivers keep the settled status
//! after the tracker is gone.

use std::fmt::Display;
use std::future::Future;

use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

impl QueryStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryStatus::Pending)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, QueryStatus::Succeeded | QueryStatus::Failed(_))
    }
}

#[derive(Debug)]
pub struct StatusTracker {
    tx: watch::Sender<QueryStatus>,
}

impl StatusTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(QueryStatus::Idle);
        Self { tx }
    }

    /// A receiver that reports `Idle` forever, for views that have not
    /// issued a request yet.
    pub fn idle() -> watch::Receiver<QueryStatus> {
        Self::new().subscribe()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryStatus> {
        self.tx.subscribe()
    }

    /// Drive `fut` to completion, publishing its progress.
    pub async fn track<T, E, F>(self, fut: F) -> Result<T, E>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        self.tx.send_replace(QueryStatus::Pending);
        let result = fut.await;
        let settled = match &result {
            Ok(_) => QueryStatus::Succeeded,
            Err(e) => QueryStatus::Failed(e.to_string()),
        };
        self.tx.send_replace(settled);
        result
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}
