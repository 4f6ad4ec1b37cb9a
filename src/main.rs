mod app;
mod cache;
mod config;
mod event;
mod task;
#[cfg(test)]
mod test_support;
mod ui;
mod users;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(about = "A terminal UI for browsing and editing a remote user directory")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./roster.yaml or $XDG_CONFIG_HOME/roster/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the user API, overriding the config file
  #[arg(short, long)]
  base_url: Option<String>,

  /// Write logs to this file instead of the daily log in the data directory
  #[arg(long)]
  log_file: Option<PathBuf>,
}

/// Route tracing output to a file; the terminal belongs to the UI.
fn init_logging(config: &config::Config, log_file: Option<PathBuf>) -> Result<WorkerGuard> {
  let appender = match log_file {
    Some(path) => {
      let name = path
        .file_name()
        .ok_or_else(|| eyre!("Invalid log file path: {}", path.display()))?
        .to_owned();
      let dir = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
      std::fs::create_dir_all(&dir)?;
      tracing_appender::rolling::never(dir, name)
    }
    None => {
      let dir = config.log_dir()?;
      std::fs::create_dir_all(&dir)?;
      tracing_appender::rolling::daily(dir, "roster.log")
    }
  };

  let (writer, guard) = tracing_appender::non_blocking(appender);
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roster=info"));

  fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Override base URL if specified on command line
  if let Some(base_url) = args.base_url {
    config.api.base_url = base_url;
  }

  let _guard = init_logging(&config, args.log_file)?;
  info!(base_url = %config.api.base_url, "starting roster");

  let source = users::HttpUserSource::new(&config.api)?;
  let cache = cache::UserCache::new(Arc::new(source));

  // Initialize and run the app
  let mut app = app::App::new(&config, cache);
  app.run().await?;

  Ok(())
}
