//! Task creation form.
//!
//! Holds the unsaved title and user id. A blank title is never submitted.
//! After a successful submission the form resets; after a failed one the
//! input is kept so the user can try again.

use std::fmt;

use log::warn;
use tokio::sync::watch;
use todo_core::{CreateTodo, QueryError, QueryStatus, StatusTracker, Todo, TodoService};

pub const DEFAULT_USER_ID: i64 = 1;
pub const ADDED: &str = "Task added successfully!";
pub const ADD_FAILED: &str = "Failed to add task. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to submit, or a submission is already running.
    Skipped,
    Created(Todo),
    Failed(QueryError),
}

pub struct TodoForm {
    title: String,
    user_id: i64,
    status: watch::Receiver<QueryStatus>,
}

impl TodoForm {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            user_id: DEFAULT_USER_ID,
            status: StatusTracker::idle(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn set_user_id(&mut self, user_id: i64) {
        self.user_id = user_id;
    }

    pub fn status(&self) -> QueryStatus {
        self.status.borrow().clone()
    }

    pub fn can_submit(&self) -> bool {
        !self.title.trim().is_empty() && !self.status.borrow().is_pending()
    }

    pub async fn submit(&mut self, service: &TodoService) -> SubmitOutcome {
        if !self.can_submit() {
            return SubmitOutcome::Skipped;
        }
        let input = CreateTodo::new(self.user_id, self.title.trim());
        let tracker = StatusTracker::new();
        self.status = tracker.subscribe();
        match tracker.track(service.create_todo(&input)).await {
            Ok(todo) => {
                self.title.clear();
                self.user_id = DEFAULT_USER_ID;
                SubmitOutcome::Created(todo)
            }
            Err(e) => {
                warn!("failed to create todo: {e}");
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Notice for the last submission, if it settled.
    pub fn message(&self) -> Option<&'static str> {
        match *self.status.borrow() {
            QueryStatus::Succeeded => Some(ADDED),
            QueryStatus::Failed(_) => Some(ADD_FAILED),
            _ => None,
        }
    }
}

impl Default for TodoForm {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.title.is_empty() {
            "What needs to be done?"
        } else {
            self.title.as_str()
        };
        let action = if self.status.borrow().is_pending() {
            "Adding..."
        } else {
            "Add Task"
        };
        writeln!(f, "User {:<4} | {title}  [{action}]", self.user_id)?;
        if let Some(message) = self.message() {
            writeln!(f, "{message}")?;
        }
        Ok(())
    }
}
