//! fin launcher CLI
//!
//! Talks to a running result provider over its socket. Provides:
//! - One-shot queries and plugin catalog access
//! - A headless session that reads input from stdin and prints UI updates

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fin_core::{
    Config, Directories, KeyChord, ResultSet, Session, SessionEvent, SystemShell, UiUpdate, merge,
};
use fin_rpc::{ProviderConnection, RpcClient, socket_path};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "fin", version, about = "fin launcher")]
#[command(after_help = "\
Examples:
  fin query fi                     Print what the provider has for \"fi\"
  fin plugins                      List provider plugins
  fin set-config Calculator precision 4
  fin session                      Headless session on stdin

Session input, one per line:
  <text>          Replace the query with <text>
  :<shortcut>     Press a shortcut, e.g. :ArrowDown or :Ctrl+P
  :select <n>     Click result row <n>
  :blur           The window lost focus
")]
struct Cli {
    /// Provider socket path (default: $XDG_RUNTIME_DIR/fin.sock)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a query and print the results once they settle
    Query {
        /// Query text
        text: String,

        /// Give up waiting for results after this many milliseconds
        #[arg(long, default_value_t = 1000)]
        wait_ms: u64,
    },

    /// List the provider's plugins and their configuration
    Plugins,

    /// Set one configuration key on a provider plugin
    #[command(name = "set-config")]
    SetConfig {
        plugin: String,
        key: String,
        value: String,
    },

    /// Run a headless session: stdin in, JSON UI updates out
    Session,
}

fn setup_logging() {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_env("FIN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(format!("fin={default_level}")));

    if cfg!(debug_assertions) {
        let temp_dir = std::env::temp_dir();
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_filename = format!("fin-{timestamp}.log");
        let log_path = temp_dir.join(&log_filename);

        #[cfg(unix)]
        {
            let symlink_path = temp_dir.join("fin.log");
            let _ = std::fs::remove_file(&symlink_path);
            let _ = std::os::unix::fs::symlink(&log_path, &symlink_path);
        }

        let file_appender = tracing_appender::rolling::never(&temp_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // Keep the writer alive for the whole process
        std::mem::forget(guard);

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();

        eprintln!("Logging to: {} (and stderr)", log_path.display());
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    let socket = cli.socket.unwrap_or_else(socket_path);
    let config = load_config()?;

    match cli.command {
        Commands::Query { text, wait_ms } => {
            run_query(&socket, &config, &text, Duration::from_millis(wait_ms)).await
        }
        Commands::Plugins => run_plugins(&socket).await,
        Commands::SetConfig { plugin, key, value } => {
            run_set_config(&socket, &plugin, &key, &value).await
        }
        Commands::Session => run_session(&socket, config).await,
    }
}

fn load_config() -> Result<Config> {
    let dirs = Directories::new()?;
    let config = Config::load(&dirs.config_file)
        .with_context(|| format!("Failed to load {}", dirs.config_file.display()))?;
    debug!("Loaded config from {}", dirs.config_file.display());
    Ok(config)
}

async fn connect(socket: &Path) -> Result<RpcClient> {
    let client = RpcClient::connect_to(socket)
        .await
        .with_context(|| format!("Failed to connect to provider at {}", socket.display()))?;
    info!("Connected to provider at {}", socket.display());
    Ok(client)
}

/// Poll until two consecutive fetches agree on a non-empty list, or time out.
async fn run_query(socket: &Path, config: &Config, text: &str, wait: Duration) -> Result<()> {
    let client = connect(socket).await?;
    client.update_search_query(text).await?;

    let deadline = tokio::time::Instant::now() + wait;
    let mut ticks = tokio::time::interval(config.poll.interval());
    let mut current = ResultSet::empty();

    while tokio::time::Instant::now() < deadline {
        ticks.tick().await;
        let batch = client.get_search_results().await?;
        match merge(&current, batch) {
            Some(next) => current = next,
            None if !current.is_empty() => break,
            None => {}
        }
    }

    if current.is_empty() {
        println!("No results for {text:?}");
        return Ok(());
    }

    for result in &current {
        match &result.description {
            Some(description) => {
                println!("{:>4}  {}  ({description})", result.priority, result.title);
            }
            None => println!("{:>4}  {}", result.priority, result.title),
        }
    }
    Ok(())
}

async fn run_plugins(socket: &Path) -> Result<()> {
    let client = connect(socket).await?;
    let catalog = client.get_plugins().await?;

    let mut names: Vec<_> = catalog.keys().collect();
    names.sort();

    println!("Plugins ({}):", names.len());
    for name in names {
        let info = &catalog[name];
        println!("  {name:<20} {}", info.metadata.description);
        let mut keys: Vec<_> = info.config.iter().collect();
        keys.sort();
        for (key, value) in keys {
            println!("      {key} = {value}");
        }
    }
    Ok(())
}

async fn run_set_config(socket: &Path, plugin: &str, key: &str, value: &str) -> Result<()> {
    let client = connect(socket).await?;
    client.update_plugin_config(plugin, key, value).await?;
    println!("Set {plugin}.{key} = {value}");
    Ok(())
}

async fn run_session(socket: &Path, config: Config) -> Result<()> {
    // Redials after a disconnect
    let provider = Arc::new(ProviderConnection::new(socket));
    info!("Using provider at {}", socket.display());
    let shell = Arc::new(SystemShell::new(config.apps.clone()));
    let (mut session, mut updates) = Session::new(provider, shell, &config);

    let printer = tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            print_update(&update);
        }
    });

    let (events, rx) = mpsc::channel(32);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let Some(event) = parse_input(&line) else {
                        warn!("Ignoring input {line:?}");
                        continue;
                    };
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read stdin: {e}");
                    break;
                }
            }
        }
    });

    session.run(rx).await;
    drop(session);
    printer.await?;
    Ok(())
}

fn parse_input(line: &str) -> Option<SessionEvent> {
    let Some(command) = line.strip_prefix(':') else {
        return Some(SessionEvent::QueryChanged(line.to_string()));
    };

    let command = command.trim();
    if command == "blur" {
        return Some(SessionEvent::FocusLost);
    }
    if let Some(index) = command.strip_prefix("select") {
        return index.trim().parse().ok().map(SessionEvent::Select);
    }
    KeyChord::parse(command).map(SessionEvent::Chord)
}

fn print_update(update: &UiUpdate) {
    match serde_json::to_string(update) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!("Failed to encode update: {e}"),
    }
}
