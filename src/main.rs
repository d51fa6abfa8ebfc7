use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use deckhand::app::App;
use deckhand::config::Config;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

#[derive(Parser)]
#[command(name = "deckhand", version, about = "Continuous deployment daemon")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "deckhand.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the daemon (default).
    Run,
    /// Validate the configuration and print a summary.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

async fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let config = Config::load(&cli.config).context("Failed to load config")?;

    match cli.command.unwrap_or(Command::Run) {
        Command::CheckConfig => {
            check_config(&config);
            Ok(())
        }
        Command::Run => run(config).await,
    }
}

fn check_config(config: &Config) {
    println!("configuration OK");
    println!("cluster: {}", config.cluster.api_url);
    println!(
        "namespace: {}",
        config.cluster.namespace.as_deref().unwrap_or("<all>")
    );
    println!(
        "consumer: {}",
        match config.event_stream {
            Some(_) => "event-stream",
            None => "no-op",
        }
    );
    println!("resync interval: {}s", config.resync.interval_secs);
    println!("http port: {}", config.http.port);
}

async fn run(config: Config) -> anyhow::Result<()> {
    config.logging.init();
    info!("deckhand starting");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    App::run_with_shutdown(config, shutdown_rx)
        .await
        .context("Fatal error")
}
