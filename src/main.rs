mod analysis;
mod config;
mod display;
mod error;
mod progress;
mod scrape;
mod store;

use analysis::counters::CounterDatabase;
use analysis::recommender::GodPicker;
use anyhow::Context;
use clap::Parser;
use config::Config;
use display::output::{
    display_console_message, display_error, display_info, display_recommendations,
    display_stats_summary, display_success, display_warning,
};
use error::AppError;
use indicatif::ProgressBar;
use progress::ProgressChannel;
use scrape::export::ExportNavigator;
use scrape::session::{ScrapeSession, SessionRunner, SessionState};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Caller-side poll interval for the worker's progress channel.
const POLL_TICK: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "God Draft")]
#[command(about = "Track your match history and get draft pick recommendations", long_about = None)]
struct Args {
    /// Gods already picked by the enemy team (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    picked: Vec<String>,

    /// Gods banned from this draft (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    banned: Vec<String>,

    /// Number of picks to recommend (default: 3)
    #[arg(short, long, default_value = "3")]
    amount: usize,

    /// Recommend from saved statistics only, without updating them
    #[arg(long)]
    no_update: bool,

    /// Player profile name (overrides GOD_DRAFT_PROFILE)
    #[arg(long)]
    profile: Option<String>,

    /// Match-history export file (overrides GOD_DRAFT_EXPORT_FILE)
    #[arg(long)]
    export: Option<PathBuf>,

    /// Statistics file (overrides GOD_DRAFT_DATA_FILE)
    #[arg(long)]
    data_file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(profile) = args.profile {
        config.profile = profile;
    }
    if let Some(export) = args.export {
        config.export_file = export;
    }
    if let Some(data_file) = args.data_file {
        config.data_file = data_file;
    }

    let roster = store::load_roster(&config.roster_file)
        .with_context(|| format!("loading roster {}", config.roster_file.display()))?;
    if roster.is_empty() {
        display_warning("God roster missing or empty; statistics start out blank");
    }
    warn_unknown_gods(&roster, &args.picked, "picked");
    warn_unknown_gods(&roster, &args.banned, "banned");

    let counters = CounterDatabase::load(&config.counters_file)
        .with_context(|| format!("loading counters {}", config.counters_file.display()))?;
    if counters.is_empty() {
        display_warning("Counter database missing or empty; only skill scores will rank picks");
    }

    let update = config.update && !args.no_update;
    let (navigator, update) = if update {
        match ExportNavigator::load(&config.export_file, &config.profile) {
            Ok(navigator) => (navigator, true),
            Err(e) => {
                display_warning(&format!(
                    "No usable match-history export ({}); using saved statistics",
                    e
                ));
                (ExportNavigator::empty(), false)
            }
        }
    } else {
        (ExportNavigator::empty(), false)
    };

    if update {
        display_info(&format!(
            "Updating statistics for {} from {}",
            config.profile,
            config.export_file.display()
        ));
    }

    let channel = Arc::new(ProgressChannel::new());
    let session = ScrapeSession::new(
        config.data_file.clone(),
        config.roster_file.clone(),
        Arc::clone(&channel),
    );

    let runner = SessionRunner::new();
    let worker = runner.start(session, navigator, update)?;

    // Tick-poll the shared channel until the worker is done, draining
    // messages one at a time so output order matches the session's.
    let bar = ProgressBar::new_spinner();
    bar.set_message("Processing match history");
    let mut length_known = false;
    loop {
        let finished = worker.is_finished();
        while let Some(message) = channel.poll_message() {
            bar.suspend(|| display_console_message(&message));
        }
        let (total, completed) = channel.progress();
        if let Some(total) = total {
            if !length_known {
                bar.set_length(total as u64);
                length_known = true;
            }
            bar.set_position(completed as u64);
        }
        if finished {
            break;
        }
        thread::sleep(POLL_TICK);
    }
    bar.finish_and_clear();

    let outcome = worker
        .join()
        .map_err(|_| AppError::StoreError("scrape worker panicked".to_string()))??;

    let stats = match channel.stats() {
        Some(stats) => {
            if outcome == SessionState::Done && update {
                display_success("Statistics updated");
            }
            stats
        }
        None => {
            // Session failed before publishing; prior saved statistics are
            // still valid for recommendations.
            display_warning("Session failed; recommending from previously saved statistics");
            store::load_or_init(&config.data_file, &roster)?.0.gods
        }
    };

    display_stats_summary(&stats);

    let picked: BTreeSet<String> = args.picked.into_iter().collect();
    let banned: BTreeSet<String> = args.banned.into_iter().collect();

    let picker = GodPicker::new(counters);
    let mut log = Vec::new();
    let best = picker.get_best_gods(&stats, &picked, &banned, args.amount, &mut log);

    if !log.is_empty() {
        println!();
        for message in &log {
            display_console_message(message);
        }
    }

    display_recommendations(&best, &stats);

    Ok(())
}

fn warn_unknown_gods(roster: &[String], names: &[String], which: &str) {
    if roster.is_empty() {
        return;
    }
    for name in names {
        if !roster.iter().any(|g| g == name) {
            display_warning(&format!("Unknown {} god: {}", which, name));
        }
    }
}
