use clap::Parser;
use jester::cli::commands::{Cli, Request};
use jester::config::JesterConfig;
use jester::domain::error::DomainError;
use jester::Jester;
use tracing_subscriber::EnvFilter;

/// Bad arguments or an invalid window.
const EXIT_USAGE: i32 = 2;
const EXIT_FAILURE: i32 = 1;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match JesterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(EXIT_USAGE);
        }
    };

    let default_level = if config.debug { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (jester, request) = match Jester::prepare(config, cli.command) {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("Error: {e}");
            let code = if e.is_validation() { EXIT_USAGE } else { EXIT_FAILURE };
            std::process::exit(code);
        }
    };

    if let Err(e) = run_request(&jester, request).await {
        eprintln!("Error: {e}");
        let code = if e.is_validation() { EXIT_USAGE } else { EXIT_FAILURE };
        std::process::exit(code);
    }
}

async fn run_request(jester: &Jester, request: Request) -> Result<(), DomainError> {
    match request {
        Request::Collect { key, window } => {
            let report = jester.collect_window(&key, &window).await;
            print_json(&report)?;
        }
        Request::Cached { key, window } => {
            let days = jester.cached_window(&key, &window).await?;
            print_json(&days)?;
        }
        Request::Posts { key, limit } => {
            let records = jester.posts_of(&key, limit).await?;
            print_json(&records)?;
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), DomainError> {
    let out = serde_json::to_string_pretty(value).map_err(|e| DomainError::InvalidInput(format!("JSON error: {e}")))?;
    println!("{out}");
    Ok(())
}
