//! Terminal front end for the todo service.
//!
//! # Overview
//! `session` wires a `TodoService` to the list and form views and
//! interprets interactive commands. `transport` executes the core's
//! plain-data requests with reqwest. `config` is the command line.

pub mod config;
pub mod error;
pub mod session;
pub mod transport;
pub mod view;

pub use config::{Cli, Command as CliCommand};
pub use error::AppError;
pub use session::{Command, Flow, Session, SessionSettings};
pub use transport::ReqwestTransport;
