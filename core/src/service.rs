//! Async query service over an injected `Transport`.
//!
//! Reads go through the `QueryCache`; a successful `create_todo` invalidates
//! every cached query. There is no retry: a failed request is reported to
//! the caller straight away.

use std::sync::Arc;

use futures::FutureExt;
use log::{debug, info};

use crate::cache::{Begin, CachedValue, QueryCache, QueryKey};
use crate::client::TodoClient;
use crate::error::{ApiError, QueryError};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::pagination::PageWindow;
use crate::types::{CreateTodo, Todo};

type Parse = fn(&TodoClient, HttpResponse) -> Result<CachedValue, ApiError>;

pub struct TodoService {
    client: TodoClient,
    transport: Arc<dyn Transport>,
    cache: Arc<QueryCache>,
}

impl TodoService {
    /// The cache is supplied by the caller, so several services (or a test)
    /// can share and observe one instance.
    pub fn new(client: TodoClient, transport: Arc<dyn Transport>, cache: Arc<QueryCache>) -> Self {
        Self {
            client,
            transport,
            cache,
        }
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub async fn fetch_page(&self, window: PageWindow) -> Result<Vec<Todo>, QueryError> {
        if window.limit == 0 {
            return Err(QueryError::Network(ApiError::Validation(
                "page limit must be positive".to_string(),
            )));
        }
        let request = self.client.build_list_todos(window);
        self.query(QueryKey::Page(window), request, |client, response| {
            client.parse_list_todos(response).map(CachedValue::Page)
        })
        .await
        .and_then(CachedValue::into_page)
        .map_err(QueryError::Network)
    }

    pub async fn fetch_todo(&self, id: i64) -> Result<Todo, QueryError> {
        let request = self.client.build_get_todo(id);
        self.query(QueryKey::Todo(id), request, |client, response| {
            client.parse_get_todo(response).map(CachedValue::Todo)
        })
        .await
        .and_then(CachedValue::into_todo)
        .map_err(QueryError::Network)
    }

    /// Number of records the service reports, by listing all of them.
    pub async fn count_todos(&self) -> Result<u64, QueryError> {
        let request = self.client.build_list_all_todos();
        self.query(QueryKey::Count, request, |client, response| {
            client.parse_count_todos(response).map(CachedValue::Count)
        })
        .await
        .and_then(CachedValue::into_count)
        .map_err(QueryError::Network)
    }

    pub async fn create_todo(&self, input: &CreateTodo) -> Result<Todo, QueryError> {
        let request = self.client.build_create_todo(input).map_err(QueryError::Creation)?;
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(QueryError::Creation)?;
        let todo = self.client.parse_create_todo(response).map_err(QueryError::Creation)?;
        let invalidated = self.cache.invalidate_all().await;
        info!(
            "created todo {} for user {}, {invalidated} cached queries now stale",
            todo.id, todo.user_id
        );
        Ok(todo)
    }

    async fn query(&self, key: QueryKey, request: HttpRequest, parse: Parse) -> Result<CachedValue, ApiError> {
        let transport = Arc::clone(&self.transport);
        let client = self.client.clone();
        let begin = self
            .cache
            .begin(key, move || {
                async move {
                    let response = transport.execute(request).await?;
                    parse(&client, response)
                }
                .boxed()
            })
            .await;

        match begin {
            Begin::Hit(value) => Ok(value),
            Begin::Fetch { ticket, fetch, joined } => {
                let result = fetch.await;
                if joined {
                    debug!("joined fetch for {key:?} settled (seq {})", ticket.seq());
                }
                self.cache.finish(key, ticket, &result).await;
                result
            }
        }
    }
}
