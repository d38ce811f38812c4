//! Paginated task list.
//!
//! The view keeps the last records it loaded, whatever page they came from,
//! and falls back to the first-paint records until something loads. A
//! failed load replaces the whole list with a fixed notice; there is no
//! retry until the user navigates or reloads.

use std::fmt;

use log::warn;
use tokio::sync::watch;
use todo_core::pagination::{PageInfo, PaginationError};
use todo_core::{QueryError, QueryStatus, StatusTracker, Todo, TodoService};

pub const LOAD_FAILED: &str = "Unable to load tasks";
pub const EMPTY: &str = "No tasks found";
pub const LOADING: &str = "Loading...";

pub struct TodoListView {
    page: PageInfo,
    initial: Option<Vec<Todo>>,
    todos: Option<Vec<Todo>>,
    status: watch::Receiver<QueryStatus>,
}

/// What the list shows in place of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListBody {
    Loading,
    Failed,
    Empty,
    Rows(Vec<TodoRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub summary: String,
    pub buttons: Vec<u64>,
    pub current: u64,
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

/// One rendering of the list: body plus, when rows are shown, page controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFrame {
    pub body: ListBody,
    pub footer: Option<Footer>,
}

impl TodoListView {
    /// A `page` past the last one opens on the last page instead.
    pub fn new(
        page: u64,
        items_per_page: u64,
        total_items: u64,
        initial: Option<Vec<Todo>>,
    ) -> Result<Self, PaginationError> {
        Ok(Self {
            page: PageInfo::new(page, items_per_page, total_items)?.clamped(),
            initial,
            todos: None,
            status: StatusTracker::idle(),
        })
    }

    pub fn page(&self) -> &PageInfo {
        &self.page
    }

    pub fn status(&self) -> QueryStatus {
        self.status.borrow().clone()
    }

    /// Move to `page`. Pages outside the known range are refused and the
    /// current page is kept.
    pub fn go_to_page(&mut self, page: u64) -> Result<(), PaginationError> {
        self.page.page = self.page.check_page(page)?;
        Ok(())
    }

    pub fn next_page(&mut self) -> Result<(), PaginationError> {
        self.go_to_page(self.page.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Result<(), PaginationError> {
        self.go_to_page(self.page.page.saturating_sub(1))
    }

    /// Fetch the current page through the service.
    pub async fn load(&mut self, service: &TodoService) -> Result<(), QueryError> {
        let tracker = StatusTracker::new();
        self.status = tracker.subscribe();
        let window = self.page.window();
        match tracker.track(service.fetch_page(window)).await {
            Ok(todos) => {
                self.todos = Some(todos);
                Ok(())
            }
            Err(e) => {
                warn!("loading {window} failed: {e}");
                Err(e)
            }
        }
    }

    fn displayed(&self) -> Option<&[Todo]> {
        self.todos.as_deref().or(self.initial.as_deref())
    }

    pub fn frame(&self) -> ListFrame {
        if matches!(*self.status.borrow(), QueryStatus::Failed(_)) {
            return ListFrame {
                body: ListBody::Failed,
                footer: None,
            };
        }
        match self.displayed() {
            None if self.status.borrow().is_pending() => ListFrame {
                body: ListBody::Loading,
                footer: None,
            },
            Some(todos) if !todos.is_empty() => ListFrame {
                body: ListBody::Rows(todos.iter().map(TodoRow::from).collect()),
                footer: Some(Footer {
                    summary: self.page.to_string(),
                    buttons: self.page.buttons(),
                    current: self.page.page,
                    previous_enabled: self.page.has_previous(),
                    next_enabled: self.page.has_next(),
                }),
            },
            _ => ListFrame {
                body: ListBody::Empty,
                footer: None,
            },
        }
    }
}

impl From<&Todo> for TodoRow {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            user_id: todo.user_id,
            title: todo.title.clone(),
            completed: todo.completed,
        }
    }
}

impl fmt::Display for TodoRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (mark, badge) = if self.completed {
            ("[x]", "Completed")
        } else {
            ("[ ]", "Pending")
        };
        write!(
            f,
            "{mark} {}  #{} · User {} · {badge}",
            self.title, self.id, self.user_id
        )
    }
}

impl fmt::Display for Footer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}    ", self.summary)?;
        write!(f, "{}", if self.previous_enabled { "<" } else { "-" })?;
        for page in &self.buttons {
            if *page == self.current {
                write!(f, " [{page}]")?;
            } else {
                write!(f, " {page}")?;
            }
        }
        write!(f, " {}", if self.next_enabled { ">" } else { "-" })
    }
}

impl fmt::Display for ListFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            ListBody::Loading => writeln!(f, "{LOADING}")?,
            ListBody::Failed => writeln!(f, "{LOAD_FAILED}")?,
            ListBody::Empty => writeln!(f, "{EMPTY}")?,
            ListBody::Rows(rows) => {
                for row in rows {
                    writeln!(f, "{row}")?;
                }
            }
        }
        if let Some(footer) = &self.footer {
            writeln!(f)?;
            writeln!(f, "{footer}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use todo_core::testing::StubTransport;
    use todo_core::{CacheConfig, QueryCache, TodoClient};

    use super::*;

    fn service(stub: &Arc<StubTransport>) -> TodoService {
        let transport: Arc<dyn todo_core::Transport> = stub.clone();
        let cache = Arc::new(QueryCache::new(CacheConfig::default()));
        TodoService::new(TodoClient::new("http://todos.test"), transport, cache)
    }

    fn rows(frame: &ListFrame) -> &[TodoRow] {
        match &frame.body {
            ListBody::Rows(rows) => rows,
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_page_renders_ten_rows_in_order() {
        let stub = Arc::new(StubTransport::todos(200));
        let mut view = TodoListView::new(1, 10, 200, None).unwrap();
        view.load(&service(&stub)).await.unwrap();

        let frame = view.frame();
        let ids: Vec<i64> = rows(&frame).iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());

        let text = frame.to_string();
        assert!(text.contains("[x] task 3  #3 · User 1 · Completed"));
        assert!(text.contains("[ ] task 1  #1 · User 1 · Pending"));
        let footer = frame.footer.unwrap();
        assert_eq!(footer.summary, "Showing 1 to 10 of 200 results");
        assert_eq!(footer.buttons, vec![1, 2, 3, 4, 5]);
        assert!(!footer.previous_enabled);
        assert!(footer.next_enabled);
        assert!(footer.to_string().ends_with("- [1] 2 3 4 5 >"));
    }

    #[tokio::test]
    async fn last_page_disables_next() {
        let stub = Arc::new(StubTransport::todos(200));
        let mut view = TodoListView::new(20, 10, 200, None).unwrap();
        assert_eq!(view.page().window().start, 190);
        view.load(&service(&stub)).await.unwrap();

        let footer = view.frame().footer.unwrap();
        assert_eq!(footer.summary, "Showing 191 to 200 of 200 results");
        assert!(!footer.next_enabled);
        assert!(footer.previous_enabled);
        assert_eq!(footer.buttons, vec![16, 17, 18, 19, 20]);
    }

    #[tokio::test]
    async fn failure_replaces_list_with_notice() {
        let stub = Arc::new(StubTransport::unreachable());
        let mut view = TodoListView::new(1, 10, 200, Some(todo_core::testing::fixture_todos(10))).unwrap();
        assert!(view.load(&service(&stub)).await.is_err());

        let frame = view.frame();
        assert_eq!(frame.body, ListBody::Failed);
        assert!(frame.footer.is_none());
        assert_eq!(frame.to_string(), "Unable to load tasks\n");
        assert_eq!(stub.request_count(), 1);
    }

    #[test]
    fn initial_records_show_before_any_load() {
        let view = TodoListView::new(1, 10, 200, Some(todo_core::testing::fixture_todos(3))).unwrap();
        assert_eq!(rows(&view.frame()).len(), 3);
    }

    #[test]
    fn nothing_loaded_renders_empty_state() {
        let view = TodoListView::new(1, 10, 200, Some(Vec::new())).unwrap();
        assert_eq!(view.frame().body, ListBody::Empty);
        assert_eq!(view.frame().to_string(), "No tasks found\n");
    }

    #[test]
    fn navigation_outside_range_is_refused() {
        let mut view = TodoListView::new(20, 10, 200, None).unwrap();
        assert!(matches!(
            view.next_page(),
            Err(PaginationError::OutOfRange { page: 21, total_pages: 20 })
        ));
        assert_eq!(view.page().page, 20);

        let mut view = TodoListView::new(1, 10, 200, None).unwrap();
        assert!(view.previous_page().is_err());
        assert_eq!(view.page().page, 1);
        view.go_to_page(7).unwrap();
        assert_eq!(view.page().window().start, 60);
    }

    #[test]
    fn page_past_the_end_opens_on_last_page() {
        let mut view = TodoListView::new(25, 10, 200, None).unwrap();
        assert_eq!(view.page().page, 20);
        assert_eq!(view.page().window().start, 190);
        assert!(!view.page().has_next());
        view.previous_page().unwrap();
        assert_eq!(view.page().page, 19);
    }

    #[test]
    fn empty_record_set_opens_on_page_one() {
        let mut view = TodoListView::new(3, 10, 0, Some(Vec::new())).unwrap();
        assert_eq!(view.page().page, 1);
        assert_eq!(view.frame().body, ListBody::Empty);
        assert!(view.next_page().is_err());
        assert!(view.previous_page().is_err());
        assert_eq!(view.page().page, 1);
    }
}
