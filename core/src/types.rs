//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the remote service's JSON schema but are defined
//! independently from the mock-server crate. Integration tests catch any
//! schema drift between the two. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A single todo record returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub user_id: i64,
    pub id: i64,
    pub title: String,
    pub completed: bool,
}

/// Request payload for creating a new todo.
///
/// `id` is assigned by the service. It exists only so callers that must
/// talk to a service expecting a client-side id can supply one; it is left
/// out of the JSON body when `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl CreateTodo {
    pub fn new(user_id: i64, title: impl Into<String>) -> Self {
        Self {
            user_id,
            title: title.into(),
            completed: false,
            id: None,
        }
    }

    /// Reject payloads the service would accept but the application never
    /// wants to send.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("title must not be blank".to_string()));
        }
        Ok(())
    }
}
