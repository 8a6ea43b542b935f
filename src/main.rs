//! Phrasebook - phrase card server and image lookup CLI.

mod cli;

use std::process;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use phrasebook::config::{self, Config};
use phrasebook::context::{build_image_chain, ServiceContext};
use phrasebook::error::ServiceError;
use phrasebook::params::{normalize_tags, validate_text};
use phrasebook::ports::ImageRequest;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(cli: &Cli) {
    let default_level = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Command::Serve { .. }, false) => "info",
        (Command::Generate { .. }, false) => "warn",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let json = std::env::var("PHRASEBOOK_LOG_JSON").is_ok_and(|v| v == "true" || v == "1");

    // Logs go to stderr so `generate` output stays pipeable.
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .init();
    }
}

async fn run(cli: Cli) -> Result<(), ServiceError> {
    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(ServiceError::Config)?;
    tracing::debug!(path = %config_path.display(), "config loaded");

    match cli.command {
        Command::Serve { ref bind } => {
            let addr = bind.clone().unwrap_or_else(|| config.bind_addr());
            let ctx = ServiceContext::from_config(&config)?;
            phrasebook::server::serve(ctx, &addr).await
        }
        Command::Generate { ref tags, .. } => {
            let text = cli.command.resolve_text()?;
            let text = validate_text(&text).map_err(ServiceError::InvalidArgument)?;
            let request = ImageRequest::new(text).with_tags(normalize_tags(tags));

            let chain = build_image_chain(&config)?;
            if cli.verbose {
                eprintln!("Backends: {}", chain.backend_names().join(" -> "));
            }

            let url = chain.generate(&request).await?;
            println!("{url}");
            Ok(())
        }
    }
}
