use super::counters::CounterDatabase;
use super::god_stats::{GodData, StatsMap};
use crate::progress::{ConsoleMessage, Severity};
use std::collections::BTreeSet;

/// Ranks candidate picks against the current draft state.
///
/// With nothing picked yet the ranking is purely by skill score. Once
/// enemies are on the board, each candidate is scored by its historical
/// matchups against the enemies that counter it (penalty) and the enemies it
/// counters (bonus), with the raw skill score weighted in at one third.
pub struct GodPicker {
    counters: CounterDatabase,
}

impl GodPicker {
    pub fn new(counters: CounterDatabase) -> Self {
        GodPicker { counters }
    }

    /// Returns up to `amount` god names, best first. Gods in `picked` or
    /// `banned` are never returned. Every matchup rate consulted (or
    /// defaulted for lack of data) appends one advisory entry to `log`.
    pub fn get_best_gods(
        &self,
        stats: &StatsMap,
        picked: &BTreeSet<String>,
        banned: &BTreeSet<String>,
        amount: usize,
        log: &mut Vec<ConsoleMessage>,
    ) -> Vec<String> {
        if picked.is_empty() {
            let mut gods: Vec<(&String, &GodData)> = stats.iter().collect();
            gods.sort_by(|a, b| {
                b.1.value()
                    .partial_cmp(&a.1.value())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            return gods
                .into_iter()
                .filter(|(name, _)| !banned.contains(*name))
                .take(amount)
                .map(|(name, _)| name.clone())
                .collect();
        }

        let mut ratings: Vec<(&String, f64)> = Vec::new();

        for (god_name, god_data) in stats {
            if picked.contains(god_name) || banned.contains(god_name) {
                continue;
            }

            let mut value = 0.0;

            // Enemies that counter this candidate. Each one found weighs
            // heavier than the last: a team stacked with counters compounds.
            let mut counters_you = 0u32;
            for counter in self.counters.counters_of(god_name) {
                if banned.contains(counter) {
                    continue;
                }
                if picked.contains(counter) {
                    counters_you += 1;
                    let (wins, losses) = god_data.matchup(counter);
                    let lose_rate = if wins + losses == 0 {
                        log.push(ConsoleMessage::new(
                            format!(
                                "You have never played as {} against the counter {}",
                                god_name, counter
                            ),
                            Severity::Warning,
                        ));
                        0.5
                    } else {
                        let rate = losses as f64 / (wins + losses) as f64;
                        log.push(ConsoleMessage::new(
                            format!(
                                "Your lose rate as {} against {} is {}",
                                god_name, counter, rate
                            ),
                            Severity::Normal,
                        ));
                        rate
                    };

                    value -= 5.0 * counters_you as f64 * lose_rate;
                }
            }

            // Enemies this candidate counters, same escalation. Only the
            // first counter entry per enemy counts.
            let mut you_counter = 0u32;
            for enemy in picked {
                if banned.contains(enemy) {
                    continue;
                }
                if self.counters.counters_of(enemy).iter().any(|c| c == god_name) {
                    you_counter += 1;
                    let (wins, losses) = god_data.matchup(enemy);
                    let win_rate = if wins + losses == 0 {
                        log.push(ConsoleMessage::new(
                            format!(
                                "You have never played as {} against {}, who they counter",
                                god_name, enemy
                            ),
                            Severity::Warning,
                        ));
                        0.5
                    } else {
                        let rate = wins as f64 / (wins + losses) as f64;
                        log.push(ConsoleMessage::new(
                            format!(
                                "Your win rate as {} against {} is {}",
                                god_name, enemy, rate
                            ),
                            Severity::Normal,
                        ));
                        rate
                    };

                    value += 5.0 * you_counter as f64 * win_rate;
                }
            }

            // Matchup signal counts two thirds, raw skill one third.
            let final_score = value / 3.0 * 2.0 + god_data.value() / 3.0;
            ratings.push((god_name, final_score));
        }

        ratings.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        ratings
            .into_iter()
            .take(amount)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn god(name: &str, wins: u32, losses: u32) -> GodData {
        let mut data = GodData::new(name.to_string());
        data.total_wins = wins;
        data.total_losses = losses;
        data
    }

    fn stats_of(gods: Vec<GodData>) -> StatsMap {
        gods.into_iter().map(|g| (g.name.clone(), g)).collect()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn counters(tag: &str, table: &str) -> CounterDatabase {
        let dir =
            std::env::temp_dir().join(format!("god_draft_recommender_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.txt", tag));
        std::fs::write(&path, table).unwrap();
        CounterDatabase::load(&path).unwrap()
    }

    #[test]
    fn empty_picked_ranks_by_value_descending() {
        let stats = stats_of(vec![
            god("Anubis", 10, 10),
            god("Ra", 80, 20),
            god("Thor", 40, 10),
            god("Ymir", 0, 0),
        ]);
        let picker = GodPicker::new(CounterDatabase::default());
        let mut log = Vec::new();

        let best = picker.get_best_gods(&stats, &set(&[]), &set(&[]), 3, &mut log);

        assert_eq!(best, ["Ra", "Thor", "Anubis"]);
        assert!(log.is_empty());
    }

    #[test]
    fn empty_picked_excludes_banned_and_breaks_ties_stably() {
        // Equal records, so equal values; BTreeMap order decides.
        let stats = stats_of(vec![
            god("Anubis", 5, 5),
            god("Ra", 5, 5),
            god("Thor", 5, 5),
        ]);
        let picker = GodPicker::new(CounterDatabase::default());
        let mut log = Vec::new();

        let best = picker.get_best_gods(&stats, &set(&[]), &set(&["Anubis"]), 5, &mut log);

        assert_eq!(best, ["Ra", "Thor"]);
    }

    #[test]
    fn no_data_counter_penalty_defaults_and_warns() {
        // Loki counters Thor; Thor has never faced Loki.
        let stats = stats_of(vec![god("Thor", 0, 0), god("Loki", 0, 0)]);
        let picker = GodPicker::new(counters("penalty", "Thor,Loki\n"));
        let mut log = Vec::new();

        let best = picker.get_best_gods(&stats, &set(&["Loki"]), &set(&[]), 1, &mut log);

        assert_eq!(best, ["Thor"]);
        let warnings: Vec<_> = log
            .iter()
            .filter(|m| m.severity == Severity::Warning)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].text.contains("never played as Thor"));
        // penalty = -5 * 1 * 0.5 = -2.5, final = -2.5/3*2 + 0/3
        // Verified indirectly: a god without the counter outranks Thor.
    }

    #[test]
    fn countered_candidate_ranks_below_clean_candidate() {
        let mut thor = god("Thor", 10, 10);
        thor.matchups.insert("Loki".to_string(), (1, 9));
        let stats = stats_of(vec![thor, god("Ymir", 10, 10), god("Loki", 0, 0)]);
        // Loki counters Thor only.
        let picker = GodPicker::new(counters("ranking", "Thor,Loki\n"));
        let mut log = Vec::new();

        let best = picker.get_best_gods(&stats, &set(&["Loki"]), &set(&[]), 2, &mut log);

        assert_eq!(best, ["Ymir", "Thor"]);
        assert!(log.iter().any(|m| m.text.contains("lose rate as Thor")));
    }

    #[test]
    fn counter_bonus_lifts_the_countering_pick() {
        let mut thor = god("Thor", 10, 10);
        thor.matchups.insert("Anubis".to_string(), (9, 1));
        let stats = stats_of(vec![thor, god("Ymir", 10, 10), god("Anubis", 0, 0)]);
        // Thor counters Anubis.
        let picker = GodPicker::new(counters("bonus", "Anubis,Thor\n"));
        let mut log = Vec::new();

        let best = picker.get_best_gods(&stats, &set(&["Anubis"]), &set(&[]), 2, &mut log);

        assert_eq!(best, ["Thor", "Ymir"]);
        assert!(log.iter().any(|m| m.text.contains("win rate as Thor")));
    }

    #[test]
    fn banned_counterer_is_ignored_for_penalty() {
        let stats = stats_of(vec![god("Thor", 10, 10), god("Ymir", 10, 10)]);
        let picker = GodPicker::new(counters("banned_counterer", "Thor,Loki\n"));
        let mut log = Vec::new();

        // Loki is banned, so it cannot be in the enemy team; picking an
        // actually-present enemy keeps the non-empty-picked path.
        let best = picker.get_best_gods(&stats, &set(&["Ra"]), &set(&["Loki"]), 2, &mut log);

        assert_eq!(best.len(), 2);
        assert!(log.is_empty(), "no matchup should have been consulted");
    }

    #[test]
    fn never_returns_picked_or_banned_and_respects_amount() {
        let stats = stats_of(vec![
            god("Anubis", 1, 1),
            god("Loki", 2, 1),
            god("Ra", 3, 1),
            god("Thor", 4, 1),
        ]);
        let picker = GodPicker::new(CounterDatabase::default());
        let mut log = Vec::new();

        let picked = set(&["Loki"]);
        let banned = set(&["Ra"]);
        let best = picker.get_best_gods(&stats, &picked, &banned, 10, &mut log);

        assert_eq!(best.len(), 2);
        for name in &best {
            assert!(!picked.contains(name));
            assert!(!banned.contains(name));
        }
    }

    #[test]
    fn later_counters_weigh_heavier() {
        // Two enemies counter Thor, no matchup data: penalty is
        // -5*1*0.5 + -5*2*0.5 = -7.5, scaled by 2/3 in the final score.
        let stats = stats_of(vec![god("Thor", 0, 0)]);
        let picker = GodPicker::new(counters("escalation", "Thor,Loki,Ra\n"));
        let mut log = Vec::new();

        picker.get_best_gods(&stats, &set(&["Loki", "Ra"]), &set(&[]), 1, &mut log);

        let warnings = log
            .iter()
            .filter(|m| m.severity == Severity::Warning)
            .count();
        assert_eq!(warnings, 2);
    }
}
