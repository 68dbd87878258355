//! umapyoi - look up Umamusume characters from the command line
//!
//! Prints JSON to stdout; logs go to stderr and follow `RUST_LOG`
//! (default `info`).

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use umapyoi_cache::cli::{Cli, Command};
use umapyoi_cache::{ApiError, CharacterService};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(service: &CharacterService, command: &Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Get {
            id,
            domain: true,
            ..
        } => print_json(&service.get_domain_by_id(*id).await?),
        Command::Get {
            id,
            summary: true,
            ..
        } => {
            println!("{}", service.get_by_id(*id).await?.summary());
            Ok(())
        }
        Command::Get { id, .. } => print_json(&service.get_by_id(*id).await?),
        Command::Bulk {
            ids,
            concurrent: false,
        } => print_json(&service.get_bulk(ids).await),
        Command::Bulk {
            ids,
            concurrent: true,
        } => print_json(&service.get_bulk_async(ids).await),
        Command::Search { term } => print_json(&service.search_by_name(term).await?),
        Command::Images { id } => print_json(&service.get_images(*id).await?),
        Command::Birthdays => print_json(&service.get_current_birthdays().await?),
        Command::List => print_json(&service.get_character_list().await?),
        Command::Ids => print_json(&service.get_all_character_ids().await?),
        Command::Popular { ranked: false } => print_json(&service.get_popular().await),
        Command::Popular { ranked: true } => {
            for character in service.get_popular_ranked().await {
                println!("{character}");
            }
            Ok(())
        }
        Command::Height { min, max } => {
            print_json(&service.get_by_height_range(*min, *max).await?)
        }
        Command::Type { label } => print_json(&service.get_by_type(label).await?),
        Command::Ping => {
            let reachable = service.test_connection().await;
            print_json(&serde_json::json!({ "reachable": reachable }))?;
            if reachable {
                Ok(())
            } else {
                Err("API is not reachable".into())
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    if let Err(err) = cli.validate() {
        eprintln!("Error: {err}");
        return ExitCode::from(2);
    }

    let service = match CharacterService::new(cli.service_config()) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    // Ctrl-C stops bulk fetch and search early with what they have so far
    let interrupt = service.interrupt_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing with partial results");
            interrupt.cancel();
        }
    });

    let result = run(&service, &cli.command).await;
    service.shutdown().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            if matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Transport(_))) {
                eprintln!("Check your network connection and the --api-url setting.");
            }
            ExitCode::FAILURE
        }
    }
}
