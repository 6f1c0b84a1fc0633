mod cli;
mod commands;
mod config;
mod error;
mod output;

use crate::{
    cli::{Args, Commands},
    commands::CommandExecutor,
    config::AppConfig,
    error::Result,
    output::OutputManager,
};
use clap::Parser;
use std::process;
use tracing::{Level, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let json = args.json;

    if let Err(e) = run(args).await {
        if json {
            let error_json = serde_json::json!({
                "status": "error",
                "message": e.to_string(),
            });
            println!("{error_json}");
        } else {
            error!("Application error: {}", e);
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet || args.json)?;

    // Load configuration
    let mut config = AppConfig::load(args.config.as_deref())?;

    match args.command {
        Commands::Run {
            url,
            username,
            password,
            interval,
        } => {
            config.apply_overrides(url, username, password, interval);
            let executor = CommandExecutor::new(config, OutputManager::new(args.json));
            executor.run().await
        }

        Commands::Login {
            url,
            username,
            password,
        } => {
            config.apply_overrides(url, username, password, None);
            let executor = CommandExecutor::new(config, OutputManager::new(args.json));
            executor.login().await
        }

        Commands::Config { show, path } => {
            if show {
                println!("{}", config.show()?);
            } else if path {
                println!(
                    "{}",
                    AppConfig::resolve_path(args.config.as_deref())?.display()
                );
            } else {
                println!(
                    "Use --show to display the configuration or --path to print its location"
                );
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    let subscriber = tracing_subscriber::registry().with(filter);

    subscriber
        .with(fmt::layer().with_target(false).with_level(verbose))
        .init();
    Ok(())
}
