use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::error;
use tokio::io::{AsyncBufReadExt, BufReader};
use todo_app::session::HELP;
use todo_app::view::list::LOAD_FAILED;
use todo_app::view::list::TodoRow;
use todo_app::view::{SubmitOutcome, TodoForm};
use todo_app::{AppError, Cli, CliCommand, Command, Flow, ReqwestTransport, Session, SessionSettings};
use todo_core::{QueryCache, TodoClient, TodoService, Transport};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new()?);
    let cache = Arc::new(QueryCache::new(cli.cache_config()));
    let service = TodoService::new(TodoClient::new(&cli.base_url), transport, cache);
    let settings = |page| SessionSettings {
        page,
        items_per_page: cli.per_page,
        live_total: cli.live_total,
    };

    match cli.command {
        CliCommand::List { page } => {
            let mut session = Session::open(service, settings(page)).await?;
            session.refresh().await;
            print!("{}", session.list().frame());
        }
        CliCommand::Show { id } => match service.fetch_todo(id).await {
            Ok(todo) => println!("{}", TodoRow::from(&todo)),
            Err(e) => {
                error!("fetching todo {id} failed: {e}");
                println!("{LOAD_FAILED}");
            }
        },
        CliCommand::Add { title, user_id } => {
            let mut form = TodoForm::new();
            form.set_title(title);
            form.set_user_id(user_id);
            match form.submit(&service).await {
                SubmitOutcome::Created(todo) => println!("{}", TodoRow::from(&todo)),
                SubmitOutcome::Skipped => println!("Nothing to add: the title is blank."),
                SubmitOutcome::Failed(_) => {}
            }
            if let Some(message) = form.message() {
                println!("{message}");
            }
        }
        CliCommand::Browse { page } => browse(Session::open(service, settings(page)).await?).await?,
    }
    Ok(())
}

async fn browse(mut session: Session) -> Result<(), AppError> {
    println!("{session}");
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                println!("{HELP}");
                continue;
            }
        };
        if session.handle(command).await == Flow::Quit {
            break;
        }
        println!("{session}");
    }
    Ok(())
}
