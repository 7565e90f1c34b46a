mod config;
mod console;
mod error;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use policy::{Identity, PolicyId};
use runtime::Service;
use storage::{Event, EventKind, EventStore};
use tracing_subscriber::EnvFilter;

use config::Config;
use console::{Command, Console, Reply};
use error::{Error, Result};

const CONFIG_FILE: &str = "fieldguard.toml";
const DEFAULT_CALLER: &str = "anonymous";

#[derive(Parser)]
#[command(name = "fieldguard")]
#[command(about = "Field-level read grants over insurance policies", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive console
    Console {
        /// Identity to act as initially
        #[arg(long = "as", default_value = DEFAULT_CALLER)]
        caller: String,
    },
    /// Execute console commands from a file
    Run {
        /// Script with one console command per line
        script: PathBuf,
        /// Identity to act as initially
        #[arg(long = "as", default_value = DEFAULT_CALLER)]
        caller: String,
    },
    /// Show audit events
    Logs {
        /// Only events for this policy
        #[arg(short, long)]
        policy: Option<u64>,
        /// Filter by event kind (policy_purchased, access_granted, access_denied)
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// Summarize audited policies
    Policies {
        /// Show only the last N policies
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Some(Commands::Console { caller }) => cmd_console(&config, &caller).await,
        None => cmd_console(&config, DEFAULT_CALLER).await,
        Some(Commands::Run { script, caller }) => cmd_run(&config, &script, &caller).await,
        Some(Commands::Logs { policy, kind }) => {
            cmd_logs(&config, policy.map(PolicyId), kind.as_deref())
        }
        Some(Commands::Policies { limit }) => cmd_policies(&config, limit),
    }
}

fn start_service(config: &Config) -> Result<Service> {
    let db_path = db_path(config)?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = EventStore::open(&db_path)?;
    tracing::debug!(path = %db_path.display(), "audit log opened");
    Ok(Service::new(store, config.access.clone()))
}

async fn cmd_console(config: &Config, caller: &str) -> Result<()> {
    println!("fieldguard v{}", env!("CARGO_PKG_VERSION"));
    let mut console = Console::new(start_service(config)?, Identity::new(caller));
    println!("Audit log: {}", db_path(config)?.display());
    println!("Grant authority: {:?}", config.access.grant_authority);
    println!("Type 'help' for commands, 'quit' or Ctrl+D to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}> ", console.caller());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("Error: {e}");
                continue;
            }
        };

        match console.execute(command).await {
            Ok(Reply::Text(text)) => println!("{text}"),
            Ok(Reply::Quit) => break,
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    Ok(())
}

async fn cmd_run(config: &Config, script: &Path, caller: &str) -> Result<()> {
    let content = std::fs::read_to_string(script)?;
    // Reject a malformed script before the audit log is opened.
    console::parse_script(&content)?;

    let mut console = Console::new(start_service(config)?, Identity::new(caller));
    for step in console.run_script(&content).await? {
        match step.outcome {
            Ok(Reply::Text(text)) => println!("{text}"),
            Ok(Reply::Quit) => {}
            Err(e) => eprintln!("line {}: {e}", step.line),
        }
    }

    Ok(())
}

fn cmd_logs(config: &Config, policy: Option<PolicyId>, kind_filter: Option<&str>) -> Result<()> {
    let store = open_store(config)?;
    let events = store.load_events(policy, kind_filter)?;

    if events.is_empty() {
        println!("No events found.");
        return Ok(());
    }

    for event in events {
        print_event(&event);
    }

    Ok(())
}

fn cmd_policies(config: &Config, limit: usize) -> Result<()> {
    let store = open_store(config)?;
    let policies = store.list_policies()?;

    if policies.is_empty() {
        println!("No policies found.");
        return Ok(());
    }

    println!(
        "{:<20}  {:<20}  {:<9}  {:<6}  DENIALS",
        "POLICY", "LAST SEEN", "PURCHASES", "GRANTS"
    );
    println!("{}", "-".repeat(72));

    for summary in policies.into_iter().take(limit) {
        let last_seen = Local
            .from_utc_datetime(&summary.last_seen.naive_utc())
            .format("%Y-%m-%d %H:%M");
        println!(
            "{:<20}  {:<20}  {:<9}  {:<6}  {}",
            summary.policy_id, last_seen, summary.purchases, summary.grants, summary.denials
        );
    }

    Ok(())
}

fn print_event(event: &Event) {
    let time = Local
        .from_utc_datetime(&event.timestamp.naive_utc())
        .format("%Y-%m-%d %H:%M:%S");
    let policy = event.policy_id;

    match &event.kind {
        EventKind::PolicyPurchased {
            owner,
            limit,
            premium,
        } => {
            println!("[{time}] policy {policy}: PURCHASED by {owner} (limit {limit}, premium {premium})");
        }
        EventKind::AccessGranted {
            grantor,
            grantee,
            field,
        } => {
            println!("[{time}] policy {policy}: GRANTED {field} to {grantee} by {grantor}");
        }
        EventKind::AccessDenied { caller, field } => {
            println!("[{time}] policy {policy}: DENIED {field} to {caller}");
        }
    }
}

fn open_store(config: &Config) -> Result<EventStore> {
    let db_path = db_path(config)?;

    if !db_path.exists() {
        return Err(Error::DatabaseNotFound { path: db_path });
    }

    Ok(EventStore::open(&db_path)?)
}

fn db_path(config: &Config) -> Result<PathBuf> {
    match &config.storage.path {
        Some(path) => Ok(path.clone()),
        None => data_dir()
            .map(|dir| dir.join("events.db"))
            .ok_or(Error::NoDataDir),
    }
}

/// `FIELDGUARD_DATA_DIR`, else `fieldguard` under the platform's user data
/// location.
fn data_dir() -> Option<PathBuf> {
    data_dir_from(|key| std::env::var_os(key))
}

fn data_dir_from(var: impl Fn(&str) -> Option<std::ffi::OsString>) -> Option<PathBuf> {
    if let Some(dir) = var("FIELDGUARD_DATA_DIR") {
        return Some(PathBuf::from(dir));
    }

    let env = |key: &str| var(key).map(PathBuf::from);
    let base = if cfg!(windows) {
        env("APPDATA")
    } else if cfg!(target_os = "macos") {
        env("HOME").map(|home| home.join("Library/Application Support"))
    } else {
        env("XDG_DATA_HOME").or_else(|| env("HOME").map(|home| home.join(".local/share")))
    };
    base.map(|dir| dir.join("fieldguard"))
}
