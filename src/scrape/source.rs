use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures crossing the match-history source boundary.
///
/// Note what is *not* here: running out of pages. The next-page probe timing
/// out is the designed last-page signal and surfaces as `has_next_page()
/// == false`, never as an error.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Detail elements did not appear within the page-load budget.
    #[error("Navigation timed out: {0}")]
    NavigationTimeout(String),

    /// A click was intercepted by an overlay; the same handle is worth one
    /// retry.
    #[error("Interaction blocked: {0}")]
    InteractionBlocked(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Win,
    Loss,
}

impl MatchOutcome {
    pub fn is_win(self) -> bool {
        self == MatchOutcome::Win
    }
}

/// Opaque reference to one row of a match-history page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchHandle {
    pub page: usize,
    pub index: usize,
}

/// Everything a detail view yields for one match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDetail {
    /// May be empty when the detail view has not populated yet; the caller
    /// backs out and retries from the list.
    pub match_id: String,
    pub outcome: MatchOutcome,
    pub god_played: String,
    pub enemy_gods: Vec<String>,
}

/// Result label shown on a lineup panel of the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelLabel {
    WinningTeam,
    LosingTeam,
}

/// One of the two lineup panels on a match detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPanel {
    pub label: PanelLabel,
    pub gods: Vec<String>,
}

/// Picks the enemy lineup out of the two labeled panels: the enemy panel is
/// whichever one carries a label inconsistent with the player's own outcome.
/// Works regardless of which panel position the source assigns to which
/// team.
pub fn select_enemy_lineup(
    outcome: MatchOutcome,
    panel_one: &TeamPanel,
    panel_two: &TeamPanel,
) -> Vec<String> {
    let panel_one_disagrees = match panel_one.label {
        PanelLabel::WinningTeam => outcome == MatchOutcome::Loss,
        PanelLabel::LosingTeam => outcome == MatchOutcome::Win,
    };

    if panel_one_disagrees {
        panel_one.gods.clone()
    } else {
        panel_two.gods.clone()
    }
}

/// Paginated, most-recent-first supplier of match records. Implementations
/// own their navigation technology and its bounded waits; the scrape
/// session only speaks this contract.
pub trait PageNavigator {
    /// Waits (bounded) for the player profile marker. Timing out is a
    /// session-fatal failure.
    fn locate_profile(&mut self) -> Result<(), SourceError>;

    /// Bounded probe for the next-page control. `false` means last page
    /// reached.
    fn has_next_page(&mut self) -> bool;

    /// Record handles on page `page`, in on-page order.
    fn records(&mut self, page: usize) -> Result<Vec<MatchHandle>, SourceError>;

    /// Opens the detail view for a record.
    fn open_detail(&mut self, handle: &MatchHandle) -> Result<MatchDetail, SourceError>;

    /// Returns from a detail view to the record list.
    fn go_back(&mut self) -> Result<(), SourceError>;
}
