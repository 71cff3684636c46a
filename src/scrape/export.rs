use crate::error::AppError;
use crate::scrape::source::{
    select_enemy_lineup, MatchDetail, MatchHandle, MatchOutcome, PageNavigator, SourceError,
    TeamPanel,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const PAGE_SIZE: usize = 10;

/// One match in a history export, carrying both lineup panels exactly as
/// the detail view labels them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedMatch {
    pub match_id: String,
    pub god: String,
    pub outcome: MatchOutcome,
    pub played_at: DateTime<Utc>,
    pub team_one: TeamPanel,
    pub team_two: TeamPanel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryExport {
    pub player: String,
    pub matches: Vec<ExportedMatch>,
}

/// `PageNavigator` over a local JSON export of the player's match history.
/// Pages the export ten records at a time, most recent first, so the scrape
/// session sees the same shape of source a live page walker would give it.
pub struct ExportNavigator {
    profile: String,
    export: HistoryExport,
    cursor: usize,
}

impl ExportNavigator {
    pub fn load(path: &Path, profile: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::StoreError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let mut export: HistoryExport = serde_json::from_str(&content).map_err(|e| {
            AppError::JsonError(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        // The export is expected newest-first already; enforce it so early
        // stop stays sound on hand-edited files.
        export
            .matches
            .sort_by(|a, b| b.played_at.cmp(&a.played_at));

        Ok(ExportNavigator {
            profile: profile.to_string(),
            export,
            cursor: 0,
        })
    }

    /// Recordless navigator for sessions that run with updating disabled.
    pub fn empty() -> Self {
        ExportNavigator {
            profile: String::new(),
            export: HistoryExport {
                player: String::new(),
                matches: Vec::new(),
            },
            cursor: 0,
        }
    }

    fn page_count(&self) -> usize {
        self.export.matches.len().div_ceil(PAGE_SIZE).max(1)
    }
}

impl PageNavigator for ExportNavigator {
    fn locate_profile(&mut self) -> Result<(), SourceError> {
        if self.export.player == self.profile {
            Ok(())
        } else {
            Err(SourceError::NavigationTimeout(format!(
                "export belongs to {}, not {}",
                self.export.player, self.profile
            )))
        }
    }

    fn has_next_page(&mut self) -> bool {
        self.cursor + 1 < self.page_count()
    }

    fn records(&mut self, page: usize) -> Result<Vec<MatchHandle>, SourceError> {
        self.cursor = page;
        let start = page * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.export.matches.len());
        Ok((start..end)
            .map(|i| MatchHandle {
                page,
                index: i - start,
            })
            .collect())
    }

    fn open_detail(&mut self, handle: &MatchHandle) -> Result<MatchDetail, SourceError> {
        let position = handle.page * PAGE_SIZE + handle.index;
        let entry = self.export.matches.get(position).ok_or_else(|| {
            SourceError::NavigationTimeout(format!("no record at position {}", position))
        })?;

        Ok(MatchDetail {
            match_id: entry.match_id.clone(),
            outcome: entry.outcome,
            god_played: entry.god.clone(),
            enemy_gods: select_enemy_lineup(entry.outcome, &entry.team_one, &entry.team_two),
        })
    }

    fn go_back(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::source::PanelLabel;
    use chrono::TimeZone;

    fn export(player: &str, count: usize) -> HistoryExport {
        let matches = (0..count)
            .map(|i| ExportedMatch {
                match_id: format!("M{}", count - i),
                god: "Thor".to_string(),
                outcome: MatchOutcome::Win,
                played_at: Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::minutes((count - i) as i64),
                team_one: TeamPanel {
                    label: PanelLabel::WinningTeam,
                    gods: vec!["Thor".to_string()],
                },
                team_two: TeamPanel {
                    label: PanelLabel::LosingTeam,
                    gods: vec!["Loki".to_string(), "Ra".to_string()],
                },
            })
            .collect();

        HistoryExport {
            player: player.to_string(),
            matches,
        }
    }

    fn navigator(export: HistoryExport, profile: &str, tag: &str) -> ExportNavigator {
        let dir = std::env::temp_dir().join(format!("god_draft_export_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.json", tag));
        fs::write(&path, serde_json::to_string(&export).unwrap()).unwrap();
        ExportNavigator::load(&path, profile).unwrap()
    }

    #[test]
    fn pages_ten_records_at_a_time() {
        let mut nav = navigator(export("Daniel", 23), "Daniel", "pages");

        assert!(nav.locate_profile().is_ok());
        assert_eq!(nav.records(0).unwrap().len(), 10);
        assert!(nav.has_next_page());
        assert_eq!(nav.records(1).unwrap().len(), 10);
        assert!(nav.has_next_page());
        assert_eq!(nav.records(2).unwrap().len(), 3);
        assert!(!nav.has_next_page());
    }

    #[test]
    fn detail_resolves_the_enemy_panel() {
        let mut nav = navigator(export("Daniel", 1), "Daniel", "detail");
        let handle = nav.records(0).unwrap().remove(0);

        let detail = nav.open_detail(&handle).unwrap();

        // Winner's enemy lineup is the losing panel.
        assert_eq!(detail.enemy_gods, ["Loki", "Ra"]);
        assert_eq!(detail.god_played, "Thor");
    }

    #[test]
    fn records_come_out_newest_first() {
        let mut nav = navigator(export("Daniel", 12), "Daniel", "newest");
        let handle = nav.records(0).unwrap().remove(0);
        let newest = nav.open_detail(&handle).unwrap();
        assert_eq!(newest.match_id, "M12");
    }

    #[test]
    fn wrong_profile_fails_location() {
        let mut nav = navigator(export("Daniel", 1), "SomeoneElse", "wrong_profile");
        assert!(nav.locate_profile().is_err());
    }
}
