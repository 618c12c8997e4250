//! Command-line front end over a configured row store. Prints one JSON body to stdout.
//!
//! Configuration comes from the environment; see [`csv_user_ingest::config`].
//! Log level is controlled with `RUST_LOG` (default `info`).

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use csv_user_ingest::commands::{self, ErrorResponse};
use csv_user_ingest::config::AppConfig;
use csv_user_ingest::pipeline::process_path;
use csv_user_ingest::store::RowStore;
use csv_user_ingest::IngestionResult;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "ingest-users")]
#[command(about = "Ingest nested-header user CSV files and report on the stored rows")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    /// Ingest CSV_FILE_PATH into the store and print the run outcome (default)
    Process,
    /// Print the age distribution of the stored rows
    Report,
    /// Print every stored row
    Users,
    /// Delete every stored row
    Clear,
    /// Check that the store can be opened
    Health,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let command = cli.command.unwrap_or(Command::Process);
    match run(command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(?command, error = %e, "command failed");
            print_json(&ErrorResponse::from(&e));
            ExitCode::FAILURE
        }
    }
}

// Ok(false) means the command ran and printed an unhealthy body.
fn run(command: Command) -> IngestionResult<bool> {
    let config = AppConfig::from_env()?;
    info!(
        ?command,
        input = ?config.csv_file_path,
        store = ?config.store_path,
        threads = ?config.threads,
        allow_zero_age = config.allow_zero_age,
        "startup"
    );

    let mut store = config.build_store();
    if command == Command::Health {
        let body = commands::health(store.as_mut());
        print_json(&body);
        store.shutdown()?;
        return Ok(body.is_ok());
    }

    store.initialize()?;
    let result = execute(command, &config, store.as_mut());
    // Shut down even when the command failed.
    let closed = store.shutdown();
    result?;
    closed?;
    Ok(true)
}

fn execute(command: Command, config: &AppConfig, store: &mut dyn RowStore) -> IngestionResult<()> {
    match command {
        Command::Process => {
            let outcome = process_path(config.input_path()?, store, &config.pipeline_options())?;
            print_json(&outcome);
            eprintln!("{}", outcome.report.to_table());
        }
        Command::Report => print_json(&commands::report(store)?),
        Command::Users => print_json(&commands::list_users(store)?),
        Command::Clear => print_json(&commands::clear_users(store)?),
        Command::Health => print_json(&commands::health(store)),
    }
    Ok(())
}

fn print_json<T: Serialize>(body: &T) {
    match serde_json::to_string_pretty(body) {
        Ok(s) => println!("{s}"),
        Err(e) => error!(error = %e, "failed to serialize response"),
    }
}
