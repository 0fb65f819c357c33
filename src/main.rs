//! Binary entrypoint for the satchel CLI.
//!
//! Commands:
//! - `init` - create a starter `config.toml` and the data directory
//! - `catalog` - validate the item seed file and list its definitions
//! - `show --player <name>` - print a stored player's inventory
//! - `replay --player <name> <script.json>` - run a request script against a player and save
//!
//! See the library crate docs for module-level details: `satchel::`.
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::Deserialize;

use satchel::config::Config;
use satchel::inventory::{
    Caller, Hooks, InventoryEngine, RecordingSink, Request, RequestRouter, StaticCatalog,
};
use satchel::roles::role_name;
use satchel::storage::{PlayerStore, StoreError};

#[derive(Parser)]
#[command(name = "satchel")]
#[command(about = "Authoritative player inventory engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Validate the item catalog seed file and list its items
    Catalog {
        /// Seed file to check instead of the configured one
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Show a stored player's inventory
    Show {
        #[arg(short, long)]
        player: String,
    },
    /// Run a JSON request script against a player's inventory
    Replay {
        #[arg(short, long)]
        player: String,
        /// JSON array of requests
        script: String,
    },
}

/// One scripted request. `caller` defaults to the player being replayed.
#[derive(Debug, Deserialize)]
struct ReplayStep {
    #[serde(default)]
    caller: Option<String>,
    #[serde(default)]
    access_level: Option<u8>,
    #[serde(flatten)]
    request: Request,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Initializing new satchel configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);

            let cfg = Config::default();
            tokio::fs::create_dir_all(&cfg.storage.data_dir).await?;
            info!("Data directory ready at {}", cfg.storage.data_dir);
        }
        Commands::Catalog { path } => {
            let config = Config::load(&cli.config).await.ok();
            init_logging(&config, cli.verbose);
            let path = path
                .or_else(|| config.map(|c| c.catalog.path))
                .unwrap_or_else(|| satchel::config::CatalogConfig::default().path);
            let catalog = StaticCatalog::load_from_json(&path)
                .with_context(|| format!("Failed to load catalog {}", path))?;
            println!("{} items in {}", catalog.len(), path);
            for def in catalog.definitions() {
                println!(
                    "{:>6}  {:<24} stack {:>4}{}{}  slots [{:?}]",
                    def.id,
                    def.name,
                    def.stack_limit(),
                    if def.usable { "  usable" } else { "" },
                    if def.affects_stats { "  stats" } else { "" },
                    def.equip_slots
                );
            }
        }
        Commands::Show { player } => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let store = PlayerStore::open(config.storage.players_path())?;
            let record = match store.get_player(&player) {
                Ok(record) => record,
                Err(StoreError::NotFound(_)) => {
                    println!("No player named {}", player);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            let catalog = Arc::new(StaticCatalog::load_from_json(&config.catalog.path)?);
            let engine = InventoryEngine::load(&record, catalog, RecordingSink::new(), Hooks::default());
            println!(
                "{} ({}), {} slots, {} free, balance {}",
                record.display_name,
                role_name(record.access_level),
                engine.capacity(),
                engine.free_slots(),
                engine.currency()
            );
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        Commands::Replay { player, script } => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            replay(&config, &player, &script).await?;
        }
    }

    Ok(())
}

async fn replay(config: &Config, player: &str, script: &str) -> Result<()> {
    let content = tokio::fs::read_to_string(script)
        .await
        .map_err(|e| anyhow!("Failed to read script {}: {}", script, e))?;
    let steps: Vec<ReplayStep> = serde_json::from_str(&content)
        .map_err(|e| anyhow!("Failed to parse script {}: {}", script, e))?;

    let catalog = Arc::new(StaticCatalog::load_from_json(&config.catalog.path)?);
    let store = PlayerStore::open(config.storage.players_path())?;
    let record = store.get_or_create_player(player, config.inventory.default_capacity)?;
    let mut engine = InventoryEngine::load(&record, catalog, RecordingSink::new(), Hooks::default());
    let router = RequestRouter::new(&config.inventory);
    info!("Replaying {} requests against {}", steps.len(), record.username);

    for (n, step) in steps.iter().enumerate() {
        let caller = Caller::new(
            step.caller.as_deref().unwrap_or(&record.username),
            step.access_level.unwrap_or(record.access_level),
        );
        let reply = router.dispatch(&mut engine, &caller, &step.request);
        for event in engine.sink_mut().drain() {
            println!("{:>3} event {}", n, serde_json::to_string(&event)?);
        }
        println!("{:>3} reply {}", n, serde_json::to_string(&reply)?);
    }

    let record = engine.into_record(record);
    if let Err(e) = store.put_player(record) {
        warn!("Failed to save {}: {}", player, e);
        return Err(e.into());
    }
    info!("Saved inventory for {}", player);
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.as_ref().and_then(|cfg| {
        cfg.logging.file.as_ref().and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        })
    });
    let security_path = config.as_ref().and_then(|cfg| cfg.logging.security_file.clone());

    match log_file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Only echo to the console when attached to a terminal
            let is_tty = atty::is(atty::Stream::Stdout);

            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());

                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }

                if record.target() == "security" {
                    if let Some(ref sec_path) = security_path {
                        if let Ok(mut sf) = std::fs::OpenOptions::new()
                            .create(true)
                            .append(true)
                            .open(sec_path)
                        {
                            let _ = writeln!(sf, "{}", line);
                        }
                    }
                }

                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                writeln!(
                    fmt,
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                )
            });
        }
    }
    let _ = builder.try_init();
}
