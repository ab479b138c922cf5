//! jqmon - Monitor an HPC job queue over an SSH tunnel

mod tui;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use jqmon::display;
use jqmon::models::{EntityKind, JqmonConfig};
use jqmon::query::StatusClient;
use jqmon::search::{SearchMode, SearchPattern};
use jqmon::tunnel::{PathResolution, Tunnel, TunnelSpec, find_ssh, pick_free_port};

#[derive(Parser)]
#[command(name = "jqmon")]
#[command(about = "Monitor the jobs and queues of a PBS server", long_about = None)]
#[command(version)]
struct Cli {
    /// SSH host name of the job queue server
    server: String,

    /// Local end of the port forward (0 picks a free port)
    #[arg(long, value_name = "PORT")]
    local_port: Option<u16>,

    /// Port the status service listens on at the server
    #[arg(long, value_name = "PORT")]
    remote_port: Option<u16>,

    /// Do not start ssh; the status service is already reachable on localhost
    #[arg(long)]
    no_tunnel: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive TUI mode (default)
    #[command(alias = "ui")]
    Tui,

    /// List jobs
    Jobs {
        #[command(flatten)]
        search: SearchArgs,

        /// Watch mode: refresh every N seconds
        #[arg(short, long, value_name = "SECONDS", default_value = "0")]
        watch: f64,
    },

    /// List queues
    Queues {
        #[command(flatten)]
        search: SearchArgs,

        /// Watch mode: refresh every N seconds
        #[arg(short, long, value_name = "SECONDS", default_value = "0")]
        watch: f64,
    },

    /// Show detailed information for a specific job
    Job {
        /// Job ID to inspect
        id: String,

        /// Show the environment variables instead of the details
        #[arg(short, long)]
        env: bool,
    },

    /// Show detailed information for a specific queue
    Queue {
        /// Queue name to inspect
        id: String,
    },

    /// Ask the remote status service to stop
    Shutdown,
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Only show rows with a value starting with this regular expression
    #[arg(short, long, value_name = "PATTERN")]
    search: Option<String>,

    /// Match the pattern against every attribute, not just the columns
    #[arg(short, long)]
    deep: bool,
}

impl SearchArgs {
    fn compile(&self, config: &JqmonConfig) -> Result<(Option<SearchPattern>, SearchMode)> {
        let pattern = self
            .search
            .as_deref()
            .map(SearchPattern::compile)
            .transpose()?;
        let mode = if self.deep || config.display.deep_search {
            SearchMode::Deep
        } else {
            SearchMode::Shallow
        };
        Ok((pattern, mode))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);
    let is_tui = matches!(command, Commands::Tui);

    init_logging(is_tui)?;

    let (mut config, warnings) = JqmonConfig::load().context("failed to load configuration")?;
    if let Some(port) = cli.local_port {
        config.connection.local_port = port;
    }
    if let Some(port) = cli.remote_port {
        config.connection.remote_port = port;
    }

    if !is_tui {
        for warning in &warnings {
            eprintln!("{} {}", "warning:".yellow(), warning);
        }
    }

    // Held until exit; dropping it stops ssh
    let tunnel = if cli.no_tunnel {
        None
    } else {
        Some(open_tunnel(&cli.server, &config)?)
    };
    let port = match &tunnel {
        Some(tunnel) => tunnel.local_port(),
        None if config.connection.local_port != 0 => config.connection.local_port,
        None => config.connection.remote_port,
    };

    let client = StatusClient::local(port, config.connection.request_timeout())
        .context("failed to build the HTTP client")?;
    let rt = Runtime::new()?;

    match command {
        Commands::Tui => {
            let shutdown_on_exit = config.behavior.shutdown_on_exit;
            let result = rt.block_on(tui::run_tui(
                config,
                warnings,
                client.clone(),
                cli.server.clone(),
            ));
            if shutdown_on_exit && let Err(e) = rt.block_on(client.shutdown()) {
                tracing::warn!(error = %e, "could not stop the status service");
            }
            result?;
        }
        Commands::Jobs { search, watch } => {
            let (pattern, mode) = search.compile(&config)?;
            run_list(&rt, &client, &config, EntityKind::Job, pattern.as_ref(), mode, watch)?;
        }
        Commands::Queues { search, watch } => {
            let (pattern, mode) = search.compile(&config)?;
            run_list(&rt, &client, &config, EntityKind::Queue, pattern.as_ref(), mode, watch)?;
        }
        Commands::Job { id, env } => {
            let output = handle_detail_command(&rt, &client, EntityKind::Job, &id, env)?;
            println!("{}", output);
        }
        Commands::Queue { id } => {
            let output = handle_detail_command(&rt, &client, EntityKind::Queue, &id, false)?;
            println!("{}", output);
        }
        Commands::Shutdown => {
            rt.block_on(client.shutdown())
                .with_context(|| format!("failed to stop the status service on {}", cli.server))?;
            println!("Status service on {} stopped.", cli.server);
        }
    }

    drop(tunnel);
    Ok(())
}

/// Set up tracing. The TUI owns the terminal, so it logs to a file instead of stderr.
fn init_logging(to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("JQMON_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    if to_file {
        let dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("jqmon");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("jqmon.log"))
            .context("failed to open log file")?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

/// Start ssh and wait for the forwarded port, showing a spinner meanwhile
fn open_tunnel(server: &str, config: &JqmonConfig) -> Result<Tunnel> {
    let connection = &config.connection;
    let (ssh, resolution) = find_ssh(connection.ssh_path.as_deref());
    if resolution == PathResolution::Fallback {
        tracing::warn!("ssh not found in PATH, relying on the system to resolve it");
    }

    let local_port = if connection.local_port == 0 {
        pick_free_port().context("no free local port for the tunnel")?
    } else {
        connection.local_port
    };

    let spec = TunnelSpec {
        ssh,
        server: server.to_string(),
        local_port,
        remote_port: connection.remote_port,
        remote_command: connection.remote_command.clone(),
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Connecting to {}...", server));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = Tunnel::open(&spec, connection.connect_timeout());
    spinner.finish_and_clear();

    result.with_context(|| format!("could not open ssh tunnel to {}", server))
}

fn run_list(
    rt: &Runtime,
    client: &StatusClient,
    config: &JqmonConfig,
    kind: EntityKind,
    pattern: Option<&SearchPattern>,
    mode: SearchMode,
    watch: f64,
) -> Result<()> {
    let name_max = config.display.job_name_max_length;
    // An unreachable service shows as an empty table, like the TUI
    let fetch = || -> Result<(String, Option<jqmon::Error>)> {
        let (snapshot, error) = rt.block_on(client.query_or_empty(kind));
        Ok((display::format_list(&snapshot, pattern, mode, name_max)?, error))
    };

    if watch > 0.0 {
        watch_loop(watch, || {
            let (table, error) = fetch()?;
            Ok(match error {
                Some(e) => format!("{} {}\n{}", "warning:".yellow(), e, table),
                None => table,
            })
        })
    } else {
        let (table, error) = fetch()?;
        if let Some(e) = error {
            eprintln!("{} {}", "warning:".yellow(), e);
        }
        println!("{}", table);
        Ok(())
    }
}

fn handle_detail_command(
    rt: &Runtime,
    client: &StatusClient,
    kind: EntityKind,
    id: &str,
    env: bool,
) -> Result<String> {
    let snapshot = rt.block_on(client.query(kind))?;
    let Some(entity) = snapshot.get(id) else {
        bail!(display::format_not_found(kind, id));
    };

    if env {
        Ok(display::format_environment(id, entity))
    } else {
        Ok(display::format_details(kind, id, entity)?)
    }
}

/// Watch loop that repeatedly executes a command with flicker-free updates
fn watch_loop<F>(interval: f64, command: F) -> Result<()>
where
    F: Fn() -> Result<String>,
{
    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("failed to set Ctrl-C handler")?;

    // Enter alternate screen buffer and hide cursor for clean display
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let result = (|| -> Result<()> {
        while running.load(Ordering::SeqCst) {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

            let output = match command() {
                Ok(s) => s,
                Err(e) => format!("Error: {:#}", e),
            };

            let screen_content = format!(
                "{}\n\nLast updated: {} | Refreshing every {}s | Press Ctrl+C to exit",
                output, timestamp, interval
            );

            // Synchronized update: the terminal renders the frame only once it is complete
            write!(stdout, "\x1B[?2026h")?;
            write!(stdout, "\x1B[H{}\x1B[J", screen_content)?;
            write!(stdout, "\x1B[?2026l")?;
            stdout.flush()?;

            std::thread::sleep(Duration::from_secs_f64(interval));
        }
        Ok(())
    })();

    // Always clean up terminal state
    execute!(io::stdout(), Show, LeaveAlternateScreen)?;

    println!("Watch mode stopped.");

    result
}
