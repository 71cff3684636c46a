use crate::analysis::god_stats::StatsMap;
use crate::progress::{ConsoleMessage, Severity};
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct PickRow {
    rank: String,
    god: String,
    games: String,
    win_rate: String,
    value: String,
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn display_warning(message: &str) {
    println!("{} {}", "⚠️".yellow(), message);
}

/// Scrape/advisory messages keep the original console palette: normal is
/// green, warnings yellow, errors red.
pub fn display_console_message(message: &ConsoleMessage) {
    let line = match message.severity {
        Severity::Normal => message.text.green(),
        Severity::Warning => message.text.yellow(),
        Severity::Error => message.text.red(),
    };
    println!("  {}", line);
}

pub fn display_recommendations(names: &[String], stats: &StatsMap) {
    println!("\n{}", "🎮 Recommended Picks".bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    if names.is_empty() {
        println!("{}", "No eligible gods to recommend".yellow());
        return;
    }

    let rows: Vec<PickRow> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let (games, win_rate, value) = stats
                .get(name)
                .map(|god| (god.total_games(), god.win_rate(), god.value()))
                .unwrap_or((0, 0.0, 0.0));

            PickRow {
                rank: format!("#{}", idx + 1),
                god: name.clone(),
                games: games.to_string(),
                win_rate: format!("{:.1}%", win_rate * 100.0),
                value: format!("{:.2}", value),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    println!("\n{}", "Interpretation".bold().yellow());
    println!("• Win Rate: your record playing this god, across all matchups");
    println!("• Value: skill score blending games played and win rate");
    println!("• Ranking also weighs counter matchups against the enemy picks\n");
}

pub fn display_stats_summary(stats: &StatsMap) {
    let total_matches: u32 = stats.values().map(|g| g.total_games()).sum();
    let played = stats.values().filter(|g| g.total_games() > 0).count();

    println!(
        "{} {} matches recorded across {} gods",
        "📊".cyan(),
        total_matches,
        played
    );
}
