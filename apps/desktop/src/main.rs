use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{HeadlessWheel, HttpRosterFetcher, PickerSession, RosterCache, UiAction, UiEvent};
use crossbeam_channel::Receiver;
use shared::wheel::WheelConfig;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::Instant,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod console;
mod picker;

use config::{load_settings, validate_endpoint};
use console::{describe, parse_command, Command, HELP};
use picker::{open_cache_storage, ConsolePicker};

#[derive(Parser, Debug)]
#[command(about = "Spin a wheel to pick who makes the next round of tea")]
struct Args {
    /// Roster endpoint; overrides picker.toml and the environment.
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    /// Put these names on the wheel, spin once and exit.
    #[arg(long = "pick")]
    picks: Vec<String>,
    /// Report the result without waiting for the animation.
    #[arg(long)]
    no_delay: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(endpoint) = args.endpoint {
        settings.roster_endpoint = endpoint;
    }
    if let Some(database_url) = args.database_url {
        settings.database_url = database_url;
    }

    let endpoint = validate_endpoint(&settings.roster_endpoint)?;
    let storage = open_cache_storage(&settings.database_url).await?;
    let fetcher = HttpRosterFetcher::new(endpoint.as_str(), settings.fetch_timeout())?;
    let cache = RosterCache::new(Arc::new(storage), Arc::new(fetcher));
    info!(endpoint = %endpoint, database_url = %settings.database_url, "picker starting");

    let (ui_tx, ui_rx) = crossbeam_channel::unbounded();
    let (engine_tx, engine_rx) = crossbeam_channel::unbounded();
    let session = PickerSession::new(HeadlessWheel::new(engine_tx), ui_tx);
    let spin_delay = if args.no_delay {
        Duration::ZERO
    } else {
        WheelConfig::standard().animation.duration
    };
    let mut picker = ConsolePicker::new(session, engine_rx, spin_delay);

    if !args.picks.is_empty() {
        picker.install_roster(cache.load().await);
        for name in args.picks {
            picker.apply(UiAction::SuggestionClicked(name));
        }
        picker.apply(UiAction::SpinClicked);
        render(&ui_rx);
        let Some(due) = picker.spin_due() else {
            anyhow::bail!("need at least two distinct roster names to spin");
        };
        tokio::time::sleep_until(due).await;
        picker.finish_spin();
        render(&ui_rx);
        return Ok(());
    }

    run_interactive(picker, cache, &ui_rx).await
}

async fn run_interactive(
    mut picker: ConsolePicker,
    cache: RosterCache,
    ui_rx: &Receiver<UiEvent>,
) -> Result<()> {
    let mut roster_task = tokio::spawn(async move { cache.load().await });
    let mut roster_pending = true;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        let spin_due = picker.spin_due();
        tokio::select! {
            joined = &mut roster_task, if roster_pending => {
                roster_pending = false;
                match joined {
                    Ok(roster) => {
                        picker.install_roster(roster);
                    }
                    Err(err) => error!(error = %err, "roster task failed"),
                }
            }
            _ = sleep_until_due(spin_due), if spin_due.is_some() => {
                picker.finish_spin();
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match parse_command(&line) {
                    Some(Command::Quit) => break,
                    Some(Command::Help) => println!("{HELP}"),
                    Some(Command::Action(action)) => picker.apply(action),
                    None => println!("unknown command, type 'help'"),
                }
            }
        }
        render(ui_rx);
    }

    Ok(())
}

async fn sleep_until_due(due: Option<Instant>) {
    match due {
        Some(due) => tokio::time::sleep_until(due).await,
        None => std::future::pending().await,
    }
}

fn render(ui_rx: &Receiver<UiEvent>) {
    for event in ui_rx.try_iter() {
        if let Some(text) = describe(&event) {
            println!("{text}");
        }
    }
}
