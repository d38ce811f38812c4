//! Command-line and environment configuration.

use std::time::Duration;

use clap::{value_parser, Parser, Subcommand};
use todo_core::pagination::DEFAULT_PAGE_SIZE;
use todo_core::CacheConfig;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Parser)]
#[command(name = "todo-app", version, about = "Paginated task list for the demo todo API")]
pub struct Cli {
    /// Root URL of the todo service.
    #[arg(long, global = true, env = "TODO_API_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Records per page.
    #[arg(long, global = true, default_value_t = DEFAULT_PAGE_SIZE, value_parser = value_parser!(u64).range(1..))]
    pub per_page: u64,

    /// Ask the service for the record count instead of assuming 200.
    #[arg(long, global = true)]
    pub live_total: bool,

    /// Refetch cached pages older than this many seconds.
    #[arg(long, global = true)]
    pub cache_max_age_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print one page of tasks.
    List {
        #[arg(long, default_value_t = 1, value_parser = value_parser!(u64).range(1..))]
        page: u64,
    },
    /// Print a single task.
    Show { id: i64 },
    /// Create a task.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value_t = 1)]
        user_id: i64,
    },
    /// Page through tasks interactively.
    Browse {
        #[arg(long, default_value_t = 1, value_parser = value_parser!(u64).range(1..))]
        page: u64,
    },
}

impl Cli {
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_age: self.cache_max_age_secs.map(Duration::from_secs),
        }
    }
}
