use clap::Parser;
use cre_mesh::cli::{self, Cli, Commands};
use cre_mesh::config::{AppConfig, LoggingConfig};
use cre_mesh::error::Result;
use cre_mesh::services::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load_checked(&cli.config_dir)?;

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            init_logging(&config.logging);
            info!(
                interval_secs = config.settlement.interval_secs,
                dscr_threshold = %config.covenant.dscr_threshold,
                "Starting CRE agent mesh"
            );
            server::run(config).await?;
        }
        Commands::Simulate {
            ticks,
            occupancy,
            interest_rate,
        } => {
            init_logging_simple();
            let snapshot = cli::run_simulation(&config, ticks, occupancy, interest_rate);
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", logging.level)));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}

fn init_logging_simple() {
    // Keep stdout clean for the JSON snapshot
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .try_init();
}
