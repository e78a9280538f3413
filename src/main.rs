//! WolfJournal - Journal Lifecycle and Role Controller
//!
//! Console front-end that drives an in-memory journal through start, stop
//! and role transitions, one command per line on stdin.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wolfjournal::config::WolfJournalConfig;
use wolfjournal::console::{self, ConsoleCommand};
use wolfjournal::controller::JournalController;
use wolfjournal::journal::{JournalSystem, MemoryJournal};
use wolfjournal::error::Result;

/// WolfJournal - Journal Lifecycle and Role Controller
#[derive(Parser)]
#[command(name = "wolfjournal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "wolfjournal.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a journal and read control commands from stdin
    ///
    /// Commands: start, stop, primary, secondary, role <name>,
    /// append <text>, status, quit
    Run,

    /// Initialize a new configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "wolfjournal.toml")]
        output: PathBuf,

        /// Node ID
        #[arg(long, default_value = "node-1")]
        node_id: String,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            let config = WolfJournalConfig::from_file(&cli.config)?;
            let level = cli.log_level.unwrap_or_else(|| config.logging.level.clone());
            init_logging(&level, &config.logging.format);
            run_console(config).await
        }
        Commands::Init { output, node_id } => {
            init_logging(cli.log_level.as_deref().unwrap_or("info"), "pretty");
            run_init(output, node_id)
        }
        Commands::Validate => {
            init_logging(cli.log_level.as_deref().unwrap_or("info"), "pretty");
            run_validate(cli.config)
        }
    }
}

/// Initialize logging
fn init_logging(level: &str, format: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so stdout carries only status JSON
    if format == "compact" {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Run the journal console
async fn run_console(config: WolfJournalConfig) -> Result<()> {
    tracing::info!("Starting journal console for node: {}", config.node.id);

    let journal = MemoryJournal::with_catch_up_delay(config.catch_up_delay());
    let system = Arc::new(JournalSystem::new(config.node.id.clone(), journal));
    let (controller, handle) = JournalController::new(system.clone(), config.controller.command_buffer);
    let controller_task = tokio::spawn(controller.run());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received interrupt, shutting down");
                None
            }
        };

        let Some(line) = line else {
            break;
        };

        let command = match ConsoleCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("✗ {}", e);
                continue;
            }
        };

        let quit = command == ConsoleCommand::Quit;
        let reply = console::execute(&handle, &system, command).await;
        println!("{}", serde_json::to_string(&reply)?);

        if quit {
            break;
        }
    }

    let shutdown = handle.shutdown().await;
    drop(handle);

    match controller_task.await {
        Ok(result) => result?,
        Err(e) => tracing::error!("Controller task failed: {}", e),
    }

    tracing::info!(
        "Journal console stopped ({} entries appended)",
        system.hooks().entries().await.len()
    );
    shutdown
}

/// Initialize a new configuration file
fn run_init(output: PathBuf, node_id: String) -> Result<()> {
    let config = WolfJournalConfig::for_node(node_id);
    let content = format!(
        "# WolfJournal Configuration\n# Generated configuration file\n\n{}",
        config.to_toml()?
    );

    std::fs::write(&output, content)?;
    println!("✓ Configuration written to {}", output.display());
    Ok(())
}

/// Validate configuration file
fn run_validate(config_path: PathBuf) -> Result<()> {
    match WolfJournalConfig::from_file(&config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!("  Node ID: {}", config.node.id);
            println!("  Journal: {}", config.journal.kind);
            println!("  Catch-up Delay: {} ms", config.journal.catch_up_delay_ms);
            println!("  Command Buffer: {}", config.controller.command_buffer);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            Err(e)
        }
    }
}
