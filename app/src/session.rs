//! One user's session: the form, the list and the commands that drive them.
//!
//! The first page is fetched straight from the service for a quick first
//! paint, bypassing the cache. From then on every read goes through the
//! `TodoService`, which owns the cache.

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use thiserror::Error;
use todo_core::pagination::{PageInfo, PageWindow, PaginationError, ASSUMED_TOTAL_TODOS};
use todo_core::{Todo, TodoService};

use crate::view::{SubmitOutcome, TodoForm, TodoListView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub page: u64,
    pub items_per_page: u64,
    /// Count records through the service instead of assuming the demo total.
    pub live_total: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Page(u64),
    Add(String),
    User(i64),
    Reload,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("unknown command {0:?}")]
    Unknown(String),

    #[error("{0:?} needs an argument")]
    MissingArgument(&'static str),

    #[error("not a number: {0:?}")]
    NotANumber(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word {
            "" | "r" | "reload" => Ok(Command::Reload),
            "n" | "next" => Ok(Command::Next),
            "p" | "prev" => Ok(Command::Previous),
            "q" | "quit" => Ok(Command::Quit),
            "a" | "add" => Ok(Command::Add(rest.to_string())),
            "u" | "user" => {
                if rest.is_empty() {
                    return Err(ParseCommandError::MissingArgument("user"));
                }
                rest.parse()
                    .map(Command::User)
                    .map_err(|_| ParseCommandError::NotANumber(rest.to_string()))
            }
            other => other
                .parse()
                .map(Command::Page)
                .map_err(|_| ParseCommandError::Unknown(other.to_string())),
        }
    }
}

pub const HELP: &str = "n next · p previous · <number> go to page · a [title] add (blank resubmits) · u <id> set user · r reload · q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Fetch `window` without the cache. Any failure yields an empty list.
pub async fn first_paint(service: &TodoService, window: PageWindow) -> Vec<Todo> {
    let client = service.client();
    let result = match service.transport().execute(client.build_list_todos(window)).await {
        Ok(response) => client.parse_list_todos(response),
        Err(e) => Err(e),
    };
    result.unwrap_or_else(|e| {
        warn!("first paint of {window} failed: {e}");
        Vec::new()
    })
}

pub struct Session {
    service: TodoService,
    form: TodoForm,
    list: TodoListView,
    notice: Option<String>,
}

impl Session {
    /// A start page past the last one opens the last page; with no records
    /// at all that is page 1.
    pub async fn open(service: TodoService, settings: SessionSettings) -> Result<Self, PaginationError> {
        let requested = PageInfo::new(settings.page, settings.items_per_page, ASSUMED_TOTAL_TODOS)?;

        let mut total = requested.total_items;
        if settings.live_total {
            match service.count_todos().await {
                Ok(count) => total = count,
                Err(e) => warn!("counting todos failed, assuming {total}: {e}"),
            }
        }

        let page = PageInfo { total_items: total, ..requested }.clamped();
        if page.page != settings.page {
            warn!(
                "page {} is past the last page, opening page {}",
                settings.page, page.page
            );
        }
        let initial = first_paint(&service, page.window()).await;

        let list = TodoListView::new(page.page, page.items_per_page, total, Some(initial))?;
        Ok(Self {
            service,
            form: TodoForm::new(),
            list,
            notice: None,
        })
    }

    pub fn service(&self) -> &TodoService {
        &self.service
    }

    pub fn list(&self) -> &TodoListView {
        &self.list
    }

    pub fn form(&self) -> &TodoForm {
        &self.form
    }

    /// Load the current page. Failures are rendered, not returned.
    pub async fn refresh(&mut self) {
        let _ = self.list.load(&self.service).await;
    }

    /// Submit the form. A blank `title` resubmits whatever the form kept
    /// from a failed attempt.
    pub async fn submit(&mut self, title: &str) -> SubmitOutcome {
        if !title.trim().is_empty() {
            self.form.set_title(title);
        }
        let outcome = self.form.submit(&self.service).await;
        if let SubmitOutcome::Created(todo) = &outcome {
            debug!("todo {} created, reloading page {}", todo.id, self.list.page().page);
            self.refresh().await;
        }
        outcome
    }

    pub async fn handle(&mut self, command: Command) -> Flow {
        self.notice = None;
        let moved = match command {
            Command::Quit => return Flow::Quit,
            Command::Next => self.list.next_page(),
            Command::Previous => self.list.previous_page(),
            Command::Page(page) => self.list.go_to_page(page),
            Command::Reload => Ok(()),
            Command::User(id) => {
                self.form.set_user_id(id);
                return Flow::Continue;
            }
            Command::Add(title) => {
                self.submit(&title).await;
                return Flow::Continue;
            }
        };
        match moved {
            Ok(()) => self.refresh().await,
            Err(e) => self.notice = Some(e.to_string()),
        }
        Flow::Continue
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tasks")?;
        writeln!(f)?;
        write!(f, "{}", self.form)?;
        writeln!(f)?;
        write!(f, "{}", self.list.frame())?;
        if let Some(notice) = &self.notice {
            writeln!(f, "{notice}")?;
        }
        writeln!(f, "Page {}", self.list.page().page)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use todo_core::testing::{fixture_todos, json_response, StubTransport};
    use todo_core::{CacheConfig, HttpMethod, QueryCache, QueryKey, TodoClient, Transport};

    use super::*;
    use crate::view::ListBody;

    fn service(stub: &Arc<StubTransport>) -> TodoService {
        let transport: Arc<dyn Transport> = stub.clone();
        let cache = Arc::new(QueryCache::new(CacheConfig::default()));
        TodoService::new(TodoClient::new("http://todos.test"), transport, cache)
    }

    fn settings(page: u64) -> SessionSettings {
        SessionSettings {
            page,
            items_per_page: 10,
            live_total: false,
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!("n".parse::<Command>(), Ok(Command::Next));
        assert_eq!(" prev ".parse::<Command>(), Ok(Command::Previous));
        assert_eq!("7".parse::<Command>(), Ok(Command::Page(7)));
        assert_eq!("a Walk the dog".parse::<Command>(), Ok(Command::Add("Walk the dog".to_string())));
        assert_eq!("u 3".parse::<Command>(), Ok(Command::User(3)));
        assert_eq!("".parse::<Command>(), Ok(Command::Reload));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
        assert_eq!("u".parse::<Command>(), Err(ParseCommandError::MissingArgument("user")));
        assert_eq!("u x".parse::<Command>(), Err(ParseCommandError::NotANumber("x".to_string())));
        assert_eq!("zap".parse::<Command>(), Err(ParseCommandError::Unknown("zap".to_string())));
    }

    #[tokio::test]
    async fn first_paint_bypasses_cache() {
        let stub = Arc::new(StubTransport::todos(200));
        let session = Session::open(service(&stub), settings(2)).await.unwrap();
        assert_eq!(stub.request_count(), 1);
        assert!(session.service().cache().is_empty().await);
        assert!(matches!(session.list().frame().body, ListBody::Rows(ref rows) if rows[0].id == 11));
    }

    #[tokio::test]
    async fn first_paint_failure_is_an_empty_list() {
        let stub = Arc::new(StubTransport::unreachable());
        let session = Session::open(service(&stub), settings(1)).await.unwrap();
        assert_eq!(session.list().frame().body, ListBody::Empty);
    }

    #[tokio::test]
    async fn page_changes_go_through_cache() {
        let stub = Arc::new(StubTransport::todos(200));
        let mut session = Session::open(service(&stub), settings(1)).await.unwrap();
        session.refresh().await;
        session.handle(Command::Next).await;
        session.handle(Command::Previous).await;
        // first paint, page 1, page 2; page 1 again is cached
        assert_eq!(stub.request_count(), 3);
        assert_eq!(session.list().page().page, 1);
    }

    #[tokio::test]
    async fn out_of_range_page_is_refused_without_fetching() {
        let stub = Arc::new(StubTransport::todos(200));
        let mut session = Session::open(service(&stub), settings(20)).await.unwrap();
        assert_eq!(session.handle(Command::Next).await, Flow::Continue);
        assert_eq!(session.handle(Command::Page(0)).await, Flow::Continue);
        assert_eq!(stub.request_count(), 1);
        assert_eq!(session.list().page().page, 20);
        assert!(session.to_string().contains("page 0 is outside 1..=20"));
    }

    #[tokio::test]
    async fn creating_refetches_current_page() {
        let stub = Arc::new(StubTransport::todos(200));
        let mut session = Session::open(service(&stub), settings(1)).await.unwrap();
        session.refresh().await;
        assert_eq!(stub.request_count(), 2);

        session.handle(Command::User(4)).await;
        session.handle(Command::Add("Walk dog".to_string())).await;
        // POST plus a fresh GET of the invalidated page
        assert_eq!(stub.request_count(), 4);
        let window = session.list().page().window();
        assert_eq!(session.service().cache().is_stale(&QueryKey::Page(window)).await, Some(false));
        assert!(session.to_string().contains("Task added successfully!"));
    }

    #[tokio::test]
    async fn empty_add_is_ignored() {
        let stub = Arc::new(StubTransport::todos(200));
        let mut session = Session::open(service(&stub), settings(1)).await.unwrap();
        session.handle(Command::Add(String::new())).await;
        assert_eq!(stub.request_count(), 1);
        assert_eq!(session.form().message(), None);
    }

    #[tokio::test]
    async fn blank_add_resubmits_kept_title() {
        let stub = Arc::new(StubTransport::todos(200));
        let mut session = Session::open(service(&stub), settings(1)).await.unwrap();

        stub.set_handler(|_| Ok(json_response(500, &serde_json::json!({}))));
        session.handle(Command::Add("Kept title".to_string())).await;
        assert_eq!(session.form().title(), "Kept title");
        assert!(session.to_string().contains("Failed to add task. Please try again."));

        session.handle(Command::Add(String::new())).await;
        assert_eq!(session.form().title(), "Kept title");

        stub.set_handler(|request| {
            Ok(match request.method {
                HttpMethod::Post => json_response(201, &fixture_todos(201)[200]),
                HttpMethod::Get => json_response(200, &fixture_todos(10)),
            })
        });
        session.handle(Command::Add("  ".to_string())).await;
        let posts: Vec<_> = stub
            .requests()
            .into_iter()
            .filter(|r| r.method == HttpMethod::Post)
            .collect();
        assert_eq!(posts.len(), 3);
        assert!(posts.iter().all(|r| r.body.as_deref().unwrap_or_default().contains("Kept title")));
        assert_eq!(session.form().title(), "");
        assert_eq!(session.form().message(), Some("Task added successfully!"));
    }

    #[tokio::test]
    async fn start_page_past_the_end_opens_last_page() {
        let stub = Arc::new(StubTransport::todos(200));
        let mut session = Session::open(service(&stub), settings(25)).await.unwrap();
        assert_eq!(session.list().page().page, 20);
        assert!(stub.requests()[0].path.ends_with("?_start=190&_limit=10"));

        let frame = session.list().frame();
        assert!(matches!(frame.body, ListBody::Rows(ref rows) if rows[0].id == 191));
        let footer = frame.footer.unwrap();
        assert_eq!(footer.summary, "Showing 191 to 200 of 200 results");
        assert!(!footer.next_enabled);

        session.handle(Command::Previous).await;
        assert_eq!(session.list().page().page, 19);
    }

    #[tokio::test]
    async fn no_records_opens_empty_first_page() {
        let stub = Arc::new(StubTransport::todos(0));
        let mut session = Session::open(
            service(&stub),
            SessionSettings {
                page: 3,
                items_per_page: 10,
                live_total: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(session.list().page().page, 1);
        assert_eq!(session.list().frame().body, ListBody::Empty);

        session.handle(Command::Next).await;
        assert_eq!(session.list().page().page, 1);
        assert!(session.to_string().contains("page 2 is outside 1..=1"));
    }

    #[tokio::test]
    async fn quit_stops_the_loop() {
        let stub = Arc::new(StubTransport::todos(10));
        let mut session = Session::open(service(&stub), settings(1)).await.unwrap();
        assert_eq!(session.handle(Command::Quit).await, Flow::Quit);
    }

    #[tokio::test]
    async fn live_total_uses_count() {
        let stub = Arc::new(StubTransport::todos(35));
        let session = Session::open(
            service(&stub),
            SessionSettings {
                page: 1,
                items_per_page: 10,
                live_total: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(session.list().page().total_pages(), 4);
    }
}
