//! Terminal rendering of the task list and the creation form.

pub mod form;
pub mod list;

pub use form::{SubmitOutcome, TodoForm};
pub use list::{ListBody, ListFrame, TodoListView};
