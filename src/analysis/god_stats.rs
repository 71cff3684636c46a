use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate win/loss record for one god, including per-opponent matchups.
///
/// A matchup entry counts once per enemy in the opposing lineup, while the
/// totals count once per match, so matchup counts only sum to the totals in
/// aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GodData {
    pub name: String,
    #[serde(default)]
    pub matchups: BTreeMap<String, (u32, u32)>,
    pub total_wins: u32,
    pub total_losses: u32,
}

/// Ordered so stable sorts break ties the same way on every run.
pub type StatsMap = BTreeMap<String, GodData>;

impl GodData {
    pub fn new(name: String) -> Self {
        GodData {
            name,
            matchups: BTreeMap::new(),
            total_wins: 0,
            total_losses: 0,
        }
    }

    /// (wins, losses) against one opponent; absent entries read as (0, 0)
    /// without being inserted.
    pub fn matchup(&self, enemy: &str) -> (u32, u32) {
        self.matchups.get(enemy).copied().unwrap_or((0, 0))
    }

    pub fn win_against(&mut self, enemies: &[String]) {
        self.total_wins += 1;
        for enemy in enemies {
            self.matchups.entry(enemy.clone()).or_insert((0, 0)).0 += 1;
        }
    }

    pub fn lose_against(&mut self, enemies: &[String]) {
        self.total_losses += 1;
        for enemy in enemies {
            self.matchups.entry(enemy.clone()).or_insert((0, 0)).1 += 1;
        }
    }

    pub fn total_games(&self) -> u32 {
        self.total_wins + self.total_losses
    }

    pub fn win_rate(&self) -> f64 {
        if self.total_games() == 0 {
            0.0
        } else {
            self.total_wins as f64 / self.total_games() as f64
        }
    }

    /// Skill score blending play volume and win rate. Volume saturates at
    /// 100 games so grinding one god stops inflating the score.
    pub fn value(&self) -> f64 {
        let games = self.total_games().min(100);
        if games == 0 {
            return 0.0;
        }

        10.0 / 7.0 * (games as f64).sqrt() + self.win_rate() * 10.0
    }
}

/// Folds one match result into the stats map, creating the god's entry on
/// first sighting.
pub fn record_match(stats: &mut StatsMap, god: &str, won: bool, enemies: &[String]) {
    let entry = stats
        .entry(god.to_string())
        .or_insert_with(|| GodData::new(god.to_string()));

    if won {
        entry.win_against(enemies);
    } else {
        entry.lose_against(enemies);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemies(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn win_rate_is_zero_without_games() {
        let god = GodData::new("Thor".to_string());
        assert_eq!(god.win_rate(), 0.0);
        assert_eq!(god.value(), 0.0);
    }

    #[test]
    fn value_matches_worked_example() {
        let mut god = GodData::new("Thor".to_string());
        god.total_wins = 80;
        god.total_losses = 20;

        assert!((god.win_rate() - 0.8).abs() < 1e-12);
        // 10/7 * sqrt(100) + 0.8 * 10
        assert!((god.value() - (10.0 / 7.0 * 10.0 + 8.0)).abs() < 1e-12);
    }

    #[test]
    fn value_is_monotonic_in_games_for_fixed_rate() {
        let mut prev = 0.0;
        for games in 0..250u32 {
            let mut god = GodData::new("Ra".to_string());
            god.total_wins = games / 2;
            god.total_losses = games - games / 2;
            let value = god.value();
            assert!(value >= prev, "value dropped at {} games", games);
            prev = value;
        }
    }

    #[test]
    fn value_saturates_at_hundred_games() {
        let mut at_cap = GodData::new("Ra".to_string());
        at_cap.total_wins = 100;

        let mut past_cap = GodData::new("Ra".to_string());
        past_cap.total_wins = 500;

        assert_eq!(at_cap.value(), past_cap.value());
    }

    #[test]
    fn win_rate_stays_in_unit_interval() {
        for (wins, losses) in [(0, 0), (1, 0), (0, 1), (13, 37), (100, 1)] {
            let mut god = GodData::new("Loki".to_string());
            god.total_wins = wins;
            god.total_losses = losses;
            let rate = god.win_rate();
            assert!((0.0..=1.0).contains(&rate));
        }
    }

    #[test]
    fn matchups_count_per_enemy_totals_per_match() {
        let mut god = GodData::new("Thor".to_string());
        god.win_against(&enemies(&["Loki", "Ra", "Anubis"]));
        god.lose_against(&enemies(&["Loki"]));

        assert_eq!(god.total_wins, 1);
        assert_eq!(god.total_losses, 1);
        assert_eq!(god.matchup("Loki"), (1, 1));
        assert_eq!(god.matchup("Ra"), (1, 0));
        assert_eq!(god.matchup("Anubis"), (1, 0));
        assert_eq!(god.matchup("Zeus"), (0, 0));
    }

    #[test]
    fn matchup_read_does_not_insert() {
        let god = GodData::new("Thor".to_string());
        assert_eq!(god.matchup("Loki"), (0, 0));
        assert!(god.matchups.is_empty());
    }

    #[test]
    fn record_match_creates_entry_on_first_sighting() {
        let mut stats = StatsMap::new();
        record_match(&mut stats, "Ymir", false, &enemies(&["Ra"]));

        assert_eq!(stats["Ymir"].total_losses, 1);
        assert_eq!(stats["Ymir"].matchup("Ra"), (0, 1));
    }
}
