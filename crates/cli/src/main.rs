use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use edutage_api::{ApiError, SchoolClient};
use edutage_client::{SchoolApi, SessionStore};
use tracing::warn;

mod commands;
mod onboard;

use onboard::OnboardArgs;

#[derive(Parser)]
#[command(name = "edutage", about = "School administration from the terminal", version)]
struct Cli {
    /// Print raw JSON payloads instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and persist the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the persisted session.
    Logout,
    /// Show who is signed in.
    Whoami,
    /// Create a school and its administrator account.
    Onboard(OnboardArgs),
    /// Dashboard aggregates for the school.
    Analytics,
    /// Class management.
    Classes {
        #[command(subcommand)]
        command: commands::ClassesCommand,
    },
    /// Room management.
    Rooms {
        #[command(subcommand)]
        command: commands::RoomsCommand,
    },
    /// Subject management and teacher assignment.
    Subjects {
        #[command(subcommand)]
        command: commands::SubjectsCommand,
    },
    /// Calendar events.
    Events {
        #[command(subcommand)]
        command: commands::EventsCommand,
    },
    /// Read-only teacher roster.
    Teachers,
    /// Read-only student roster.
    Students,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let session = Arc::new(load_session_store());
    let client = Arc::new(SchoolClient::from_env(session.clone())?);
    let api = SchoolApi::new(client, session);

    let result = run(&api, cli.command, cli.json).await;
    if let Err(error) = &result
        && let Some(ApiError::Auth { .. }) = error.downcast_ref::<ApiError>()
    {
        eprintln!("The session is no longer valid. Run `edutage login` to sign in again.");
    }
    result
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_session_store() -> SessionStore {
    match SessionStore::load() {
        Ok(store) => store,
        Err(error) => {
            warn!(error = %error, "Could not access the session file; continuing without persistence");
            SessionStore::ephemeral()
        }
    }
}

async fn run(api: &SchoolApi, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Login { email, password } => commands::login(api, email, password).await,
        Command::Logout => commands::logout(api),
        Command::Whoami => commands::whoami(api, json),
        Command::Onboard(args) => onboard::run(api, args).await,
        Command::Analytics => commands::analytics(api, json).await,
        Command::Classes { command } => commands::classes(api, command, json).await,
        Command::Rooms { command } => commands::rooms(api, command, json).await,
        Command::Subjects { command } => commands::subjects(api, command, json).await,
        Command::Events { command } => commands::events(api, command, json).await,
        Command::Teachers => commands::teachers(api, json).await,
        Command::Students => commands::students(api, json).await,
    }
}
