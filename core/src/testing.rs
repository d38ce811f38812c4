//! Scripted `Transport` for tests.
//!
//! `StubTransport` records every request it executes and answers through a
//! swappable handler. `StubTransport::todos(n)` serves an in-memory data set
//! with the remote service's routes; `hold()` makes requests wait until
//! `release` hands out permits, for tests that need requests in flight.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{CreateTodo, Todo};

type Handler = Arc<dyn Fn(&HttpRequest) -> Result<HttpResponse, ApiError> + Send + Sync>;

pub struct StubTransport {
    handler: Mutex<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
    gate: Option<Semaphore>,
}

/// `n` records shaped like the demo service's: 20 per user, every third
/// one completed.
pub fn fixture_todos(n: i64) -> Vec<Todo> {
    (1..=n)
        .map(|id| Todo {
            user_id: (id - 1) / 20 + 1,
            id,
            title: format!("task {id}"),
            completed: id % 3 == 0,
        })
        .collect()
}

pub fn json_response<T: serde::Serialize + ?Sized>(status: u16, body: &T) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: serde_json::to_string(body).unwrap_or_default(),
    }
}

fn query_param(path: &str, name: &str) -> Option<usize> {
    let (_, query) = path.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .and_then(|(_, v)| v.parse().ok())
}

fn serve(todos: &[Todo], request: &HttpRequest) -> HttpResponse {
    let route = request
        .path
        .split_once("/todos")
        .map(|(_, rest)| rest)
        .unwrap_or_default();
    match (request.method, route) {
        (HttpMethod::Get, "") => json_response(200, &todos),
        (HttpMethod::Get, r) if r.starts_with('?') => {
            let start = query_param(r, "_start").unwrap_or(0).min(todos.len());
            let end = query_param(r, "_limit")
                .map(|limit| (start + limit).min(todos.len()))
                .unwrap_or(todos.len());
            json_response(200, &todos[start..end])
        }
        (HttpMethod::Get, r) => match r.trim_start_matches('/').parse::<i64>() {
            Ok(id) => match todos.iter().find(|t| t.id == id) {
                Some(todo) => json_response(200, todo),
                None => json_response(404, &serde_json::json!({})),
            },
            Err(_) => json_response(404, &serde_json::json!({})),
        },
        (HttpMethod::Post, "") => {
            let input: Option<CreateTodo> = request
                .body
                .as_deref()
                .and_then(|b| serde_json::from_str(b).ok());
            match input {
                Some(input) => json_response(
                    201,
                    &Todo {
                        user_id: input.user_id,
                        id: todos.len() as i64 + 1,
                        title: input.title,
                        completed: input.completed,
                    },
                ),
                None => json_response(500, &serde_json::json!({})),
            }
        }
        _ => json_response(404, &serde_json::json!({})),
    }
}

impl StubTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, ApiError> + Send + Sync + 'static,
    {
        Self {
            handler: Mutex::new(Arc::new(handler)),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Serves `fixture_todos(n)`. Creation answers 201 with id `n + 1` and
    /// stores nothing.
    pub fn todos(n: i64) -> Self {
        let todos = fixture_todos(n);
        Self::new(move |request| Ok(serve(&todos, request)))
    }

    /// Every request fails before reaching a server.
    pub fn unreachable() -> Self {
        Self::new(|_| Err(ApiError::Transport("connection refused".to_string())))
    }

    /// Every request receives `status` with an empty JSON object.
    pub fn status(status: u16) -> Self {
        Self::new(move |_| Ok(json_response(status, &serde_json::json!({}))))
    }

    /// Make requests wait for `release`.
    pub fn hold(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn release(&self, requests: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(requests);
        }
    }

    pub fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, ApiError> + Send + Sync + 'static,
    {
        *self.handler.lock().unwrap_or_else(|e| e.into_inner()) = Arc::new(handler);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?
                .forget();
        }
        let handler = Arc::clone(&*self.handler.lock().unwrap_or_else(|e| e.into_inner()));
        handler(&request)
    }
}
