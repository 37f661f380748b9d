use std::{sync::atomic::Ordering, time::Duration};

use clap::Parser;
use cli::Args;
use commands::run_command;
use error::{CliError, CliResult};
use logging::setup_logging;
use prest_client::{Client, ClientOptions, TransportConfig};
use tracing::debug;
use ureq::Proxy;
use utils::COLOR;

mod cli;
mod commands;
mod error;
mod logging;
mod utils;

fn transport_config(args: &Args) -> CliResult<TransportConfig> {
    let mut config = TransportConfig::default();

    if let Some(proxy) = args.proxy.as_deref() {
        let proxy = Proxy::new(proxy).map_err(|source| {
            CliError::Proxy {
                proxy: proxy.to_string(),
                source,
            }
        })?;
        config.proxy = Some(proxy);
    }

    if let Some(user_agent) = &args.user_agent {
        config.user_agent = Some(user_agent.clone());
    }

    if let Some(secs) = args.timeout {
        config.timeout = Some(Duration::from_secs(secs));
    }

    Ok(config)
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        COLOR.store(false, Ordering::Relaxed);
    }

    if let Ok(path) = dotenvy::dotenv() {
        debug!("loaded environment from {}", path.display());
    }

    let options = match &args.config {
        Some(path) => ClientOptions::from_file(path)?,
        None => ClientOptions::from_env(),
    };
    debug!("{options:?}");

    let client = Client::with_config(options, &transport_config(&args)?)?;

    run_command(&client, args.command)
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
