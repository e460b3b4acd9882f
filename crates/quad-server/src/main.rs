//! quad server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, starts the hourly expiry sweeper and serves the trigger routes.
//!
//! # Trigger secret
//!
//! To generate the argon2 PHC string for `trigger_secret_hash`:
//!
//! ```text
//! cargo run -p quad-server --bin quad -- --hash-secret
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use quad_functions::Functions;
use quad_server::{
  AppState, ServerConfig,
  auth::{self, AuthConfig},
  push::HttpPushDispatcher,
  scheduler, shutdown,
};
use quad_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Quad trigger server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a trigger secret entered on stdin and exit.
  #[arg(long)]
  hash_secret: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_secret {
    let secret = read_secret()?;
    let hash = auth::hash_secret(&secret).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("QUAD")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  server_cfg
    .functions
    .validate()
    .context("invalid [functions] configuration")?;
  anyhow::ensure!(server_cfg.sweep_interval_secs > 0, "sweep_interval_secs must be positive");

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = Arc::new(
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?,
  );

  let push = Arc::new(
    HttpPushDispatcher::new(server_cfg.push.clone()).context("failed to build push client")?,
  );

  let functions = Functions::new(store.clone(), store, push, server_cfg.functions.clone());

  let sweeper = scheduler::spawn_sweeper(
    functions.clone(),
    Duration::from_secs(server_cfg.sweep_interval_secs),
  );

  let state = AppState {
    functions,
    auth: Arc::new(AuthConfig { secret_hash: server_cfg.trigger_secret_hash.clone() }),
  };

  let app = quad_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown::shutdown_signal())
    .await
    .context("server error")?;

  sweeper.abort();
  Ok(())
}

/// Read the trigger secret from stdin.
fn read_secret() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Trigger secret: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  let secret = line.trim_end_matches(['\n', '\r']).to_string();
  anyhow::ensure!(!secret.is_empty(), "secret must not be empty");
  Ok(secret)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
