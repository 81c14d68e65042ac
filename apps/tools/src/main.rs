use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{HttpRosterFetcher, RosterCache, DEFAULT_ROSTER_ENDPOINT, ROSTER_SLOT};
use storage::Storage;

#[derive(Parser, Debug)]
#[command(about = "Inspect and maintain the cached roster snapshot")]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/picker.db")]
    database_url: String,
    #[arg(long, default_value = DEFAULT_ROSTER_ENDPOINT)]
    endpoint: String,
    #[arg(long, default_value_t = 10)]
    timeout_seconds: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List cached slots and the participants in the roster snapshot.
    Show,
    /// Drop the roster snapshot so the next session start fetches again.
    Clear,
    /// Fetch the roster now and overwrite the snapshot.
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;
    let fetcher = HttpRosterFetcher::new(&cli.endpoint, Duration::from_secs(cli.timeout_seconds))?;
    let cache = RosterCache::new(Arc::new(storage.clone()), Arc::new(fetcher));

    match cli.command {
        Command::Show => {
            let slots = storage.list_slots().await?;
            if slots.is_empty() {
                println!("cache is empty");
            }
            for slot in &slots {
                println!(
                    "slot={} bytes={} stored_at={}",
                    slot.name,
                    slot.size_bytes,
                    slot.stored_at.to_rfc3339()
                );
            }
            if let Some(roster) = cache.cached().await {
                println!("{ROSTER_SLOT}: {} participants", roster.len());
                for participant in roster {
                    println!("  - {}", participant.name);
                }
            }
        }
        Command::Clear => {
            if cache.invalidate().await? {
                println!("roster snapshot cleared");
            } else {
                println!("no roster snapshot to clear");
            }
        }
        Command::Refresh => {
            let roster = cache.refresh().await?;
            println!("refreshed roster snapshot: {} participants", roster.len());
        }
    }

    Ok(())
}
