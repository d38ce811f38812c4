//! Client core for the todo service.
//!
//! # Overview
//! `TodoClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). `TodoService` runs
//! those requests through an injected `Transport`, caching reads and
//! invalidating them when a write succeeds. `pagination` maps page numbers
//! to fetch windows and page-selector buttons.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - The cache is an explicit `Arc<QueryCache>` passed to the service, never
//!   global state.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod cache;
pub mod client;
pub mod error;
pub mod http;
pub mod pagination;
pub mod service;
pub mod status;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use cache::{CacheConfig, QueryCache, QueryKey};
pub use client::TodoClient;
pub use error::{ApiError, QueryError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use pagination::{PageInfo, PageWindow, PaginationError};
pub use service::TodoService;
pub use status::{QueryStatus, StatusTracker};
pub use types::{CreateTodo, Todo};
