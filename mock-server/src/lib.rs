//! Stand-in for the public demo todo API.
//!
//! Serves a fixed, seeded data set. Like the real service it accepts
//! creations and answers with a new id, but never stores them, so a
//! created record does not show up in later reads.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use log::info;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Records in the default data set.
pub const SEED_SIZE: i64 = 200;

/// Records per user in the seeded data.
const TODOS_PER_USER: i64 = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub user_id: i64,
    pub id: i64,
    pub title: String,
    pub completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "_start")]
    pub start: Option<usize>,
    #[serde(rename = "_limit")]
    pub limit: Option<usize>,
}

pub type Db = Arc<Vec<Todo>>;

/// `n` deterministic records: twenty per user, every third one completed.
pub fn seed_todos(n: i64) -> Vec<Todo> {
    (1..=n)
        .map(|id| Todo {
            user_id: (id - 1) / TODOS_PER_USER + 1,
            id,
            title: format!("task {id}"),
            completed: id % 3 == 0,
        })
        .collect()
}

pub fn app() -> Router {
    app_with(seed_todos(SEED_SIZE))
}

pub fn app_with(todos: Vec<Todo>) -> Router {
    let db: Db = Arc::new(todos);
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Todo>> {
    let start = params.start.unwrap_or(0).min(db.len());
    let end = match params.limit {
        Some(limit) => start.saturating_add(limit).min(db.len()),
        None => db.len(),
    };
    Json(db[start..end].to_vec())
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodo>,
) -> (StatusCode, Json<Todo>) {
    let todo = Todo {
        user_id: input.user_id,
        id: db.len() as i64 + 1,
        title: input.title,
        completed: input.completed,
    };
    info!("accepted todo {} for user {} (not stored)", todo.id, todo.user_id);
    (StatusCode::CREATED, Json(todo))
}

async fn get_todo(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Todo>, StatusCode> {
    db.iter()
        .find(|t| t.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
