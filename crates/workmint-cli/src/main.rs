mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "workmint", about = "Offline task-progress drafts for WorkMint")]
struct Cli {
    /// Config file (TOML). Defaults are used when it does not exist.
    #[arg(long, global = true, default_value = "workmint.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a local draft for a task
    Save {
        task_id: String,
        completed_qty: f64,
    },
    /// Show one draft
    Get { task_id: String },
    /// List drafts
    List {
        /// Only drafts not yet acknowledged by the server
        #[arg(long)]
        unsynced: bool,
    },
    /// Mark a draft as acknowledged
    MarkSynced { task_id: String },
    /// Delete one draft
    Remove { task_id: String },
    /// Delete every draft
    Clear,
    /// Run a single sync pass
    Sync {
        /// Simulate a server rejection for this task (repeatable)
        #[arg(long = "reject")]
        reject: Vec<String>,
        /// Pretend the device is offline
        #[arg(long)]
        offline: bool,
    },
    /// Run the background sync loop until Ctrl-C.
    /// Reads `online`, `offline`, `sync`, `status` from stdin.
    Run {
        #[arg(long)]
        offline: bool,
    },
    /// Pending draft count and storage location
    Status,
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match commands::Context::open(&cli.config) {
        Ok(ctx) => match cli.command {
            Commands::Save {
                task_id,
                completed_qty,
            } => commands::save(&ctx, &task_id, completed_qty),
            Commands::Get { task_id } => commands::get(&ctx, &task_id),
            Commands::List { unsynced } => commands::list(&ctx, unsynced),
            Commands::MarkSynced { task_id } => commands::mark_synced(&ctx, &task_id),
            Commands::Remove { task_id } => commands::remove(&ctx, &task_id),
            Commands::Clear => commands::clear(&ctx),
            Commands::Sync { reject, offline } => commands::sync_once(&ctx, reject, offline).await,
            Commands::Run { offline } => commands::run(&ctx, offline).await,
            Commands::Status => commands::status(&ctx),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
