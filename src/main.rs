//! bite - transcript sync bridge.
//!
//! Main entry point for the bite CLI.

mod cli;
mod cmd_attach;
mod cmd_serve;
mod cmd_tools;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use bite_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};

use cli::{Cli, Commands};

/// Initialize tracing with console and file output.
///
/// Log files are written to the configured log directory (default
/// `~/.bite/logs/`) with daily rotation.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = logging.log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("bite")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer on drop; keep it for the whole run.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn validate(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let warnings = ConfigValidator::validate(config).into_result()?;
    for warning in warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    init_tracing(&config.logging)?;
    validate(&config)?;

    info!("bite v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve {
            host,
            port,
            outline,
        } => cmd_serve::run_serve(&config, host, port, outline).await,
        Commands::Attach { page, push_content } => {
            cmd_attach::run_attach(&config, &page, push_content).await
        }
        Commands::Send { message } => cmd_tools::run_send(&config, &message).await,
        Commands::Outline { file } => cmd_tools::run_outline(&config, &file),
    }
}
