mod cli;
mod commands;
mod export;
mod render;

use anyhow::Result;
use clap::Parser;
use redline_config::Config;

use crate::cli::Commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Quiet by default so panels stay readable; RUST_LOG wins when set
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    if let Commands::Completions { shell } = cli.command {
        commands::completions::handle(shell);
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    }
    .with_overrides(cli.api_base, cli.viewer_url);

    match cli.command {
        Commands::Rules { format } => commands::rules::handle(&config, format).await,
        Commands::Patterns { format } => commands::patterns::handle(&config, format).await,
        Commands::Health => commands::health::handle(&config).await,
        Commands::Scan(args) => commands::scan::handle(args, &config).await,
        Commands::Completions { .. } => Ok(()),
    }
}
