//! OksHouse admin CLI - drive the admin session from a terminal

mod commands;
mod config;
mod logging;
mod store;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "okshouse-admin")]
#[command(about = "Log in to the OksHouse admin backend and manage the session")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Directory holding the stored token and cookies
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Session configuration file (toml or yaml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Admin backend base URL
    #[arg(long, global = true, env = "OKS_ADMIN_API_URL")]
    api_url: Option<String>,

    /// Timeout for one-shot commands in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "15")]
    timeout: u64,

    /// Also append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.clone().into(), cli.log_file.as_deref())?;

    let config = config::CliConfig::load(cli.config.as_deref(), cli.api_url, cli.data_dir)?;

    // The session is single-threaded; everything runs on one LocalSet
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();

    let timeout = (cli.timeout > 0 && !cli.command.is_long_running())
        .then(|| Duration::from_secs(cli.timeout));

    match local.block_on(&runtime, run(cli.command, config, timeout)) {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(command: Commands, config: config::CliConfig, timeout: Option<Duration>) -> Result<()> {
    let session = commands::open_session(&config)?;
    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, command.execute(&session))
            .await
            .unwrap_or_else(|_| Err(anyhow::anyhow!("Command timed out after {}s", limit.as_secs()))),
        None => command.execute(&session).await,
    };
    session.dispose();
    outcome
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
