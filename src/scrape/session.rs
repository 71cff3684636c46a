use crate::analysis::god_stats::record_match;
use crate::error::AppError;
use crate::progress::{ProgressChannel, Severity};
use crate::scrape::source::{MatchDetail, MatchHandle, PageNavigator, SourceError};
use crate::store::{self, StatsBundle};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// How many times an unpopulated match id is re-opened from the list before
/// the record is given up on.
const EMPTY_ID_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    LocatingProfile,
    EnumeratingPages,
    ScrapingRecords,
    EarlyStop,
    Exhausted,
    Persisting,
    Done,
    Failed,
}

/// One resumable scrape run: pulls records from a `PageNavigator`, folds the
/// unseen ones into the statistics map, and persists the bundle atomically.
///
/// All progress and advisory output goes through the shared channel; the
/// return value only distinguishes a finished session (`Done`/`Failed`) from
/// a persistence error the caller must surface.
pub struct ScrapeSession {
    data_file: PathBuf,
    roster_file: PathBuf,
    channel: Arc<ProgressChannel>,
    state: SessionState,
}

impl ScrapeSession {
    pub fn new(data_file: PathBuf, roster_file: PathBuf, channel: Arc<ProgressChannel>) -> Self {
        ScrapeSession {
            data_file,
            roster_file,
            channel,
            state: SessionState::Idle,
        }
    }

    pub fn channel(&self) -> Arc<ProgressChannel> {
        Arc::clone(&self.channel)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn run<N: PageNavigator>(
        &mut self,
        navigator: &mut N,
        update: bool,
    ) -> Result<SessionState, AppError> {
        let roster = store::load_roster(&self.roster_file)?;
        let (mut bundle, created) = store::load_or_init(&self.data_file, &roster)?;
        if created {
            self.channel.push("Creating default data", Severity::Normal);
        } else {
            self.channel.push("Loaded previous data", Severity::Normal);
        }

        if !update {
            self.channel.publish_stats(bundle.gods.clone());
            self.channel.push("Done scraping!", Severity::Normal);
            self.state = SessionState::Done;
            return Ok(self.state);
        }

        self.state = SessionState::LocatingProfile;
        self.channel
            .push("Looking for player profile", Severity::Normal);
        if navigator.locate_profile().is_err() {
            self.channel
                .push("Couldn't find player profile", Severity::Error);
            self.channel.push(
                "Make sure you don't have a private profile",
                Severity::Warning,
            );
            self.state = SessionState::Failed;
            return Ok(self.state);
        }
        self.channel.push("Found player profile", Severity::Normal);

        self.state = SessionState::EnumeratingPages;
        let last_page = match self.enumerate_pages(navigator) {
            Ok(last_page) => last_page,
            Err(e) => {
                self.channel
                    .push(format!("Failed to enumerate pages: {}", e), Severity::Error);
                self.state = SessionState::Failed;
                return Ok(self.state);
            }
        };

        self.state = SessionState::ScrapingRecords;
        let new_ids = self.walk_records(navigator, last_page, &mut bundle);

        self.state = SessionState::Persisting;
        bundle.seen.extend(new_ids);
        if let Err(e) = store::save(&self.data_file, &bundle) {
            self.channel
                .push(format!("Failed to save statistics: {}", e), Severity::Error);
            self.state = SessionState::Failed;
            return Err(e);
        }
        self.channel.push(
            format!("Saved data to {}", self.data_file.display()),
            Severity::Normal,
        );

        self.channel.publish_stats(bundle.gods.clone());
        self.channel.push("Done scraping!", Severity::Normal);
        self.state = SessionState::Done;
        Ok(self.state)
    }

    /// Walks forward through the pages counting records, until the bounded
    /// next-page probe says the last page is reached. The totals only feed
    /// progress reporting.
    fn enumerate_pages<N: PageNavigator>(&self, navigator: &mut N) -> Result<usize, SourceError> {
        self.channel.push(
            "Finding out how many pages of data to process",
            Severity::Normal,
        );
        self.channel
            .push("Finding out how many matches to process", Severity::Normal);

        let mut page = 0;
        let mut total = 0;
        loop {
            total += navigator.records(page)?.len();
            if !navigator.has_next_page() {
                break;
            }
            page += 1;
        }

        self.channel.set_total_records(total);
        self.channel.push(
            format!("Found {} pages of data with {} matches", page, total),
            Severity::Normal,
        );
        Ok(page)
    }

    /// Visits every record most-recent-first, folding unseen matches into
    /// the bundle. Stops the whole walk on the first match id already known
    /// from a prior session; everything older is guaranteed processed.
    fn walk_records<N: PageNavigator>(
        &mut self,
        navigator: &mut N,
        last_page: usize,
        bundle: &mut StatsBundle,
    ) -> BTreeSet<String> {
        let mut new_ids = BTreeSet::new();

        'pages: for page in 0..=last_page {
            let handles = match navigator.records(page) {
                Ok(handles) => handles,
                Err(e) => {
                    self.channel
                        .push(format!("Lost the record list: {}", e), Severity::Error);
                    break 'pages;
                }
            };

            for handle in &handles {
                let detail = self.open_detail_with_retry(navigator, handle);

                if let Some(detail) = detail {
                    if bundle.seen.contains(&detail.match_id) {
                        self.channel
                            .push(format!("Found old {}", detail.match_id), Severity::Normal);
                        self.channel.push("Stopping scrape", Severity::Normal);
                        self.channel.record_completed();
                        self.state = SessionState::EarlyStop;
                        break 'pages;
                    }

                    if !new_ids.contains(&detail.match_id) {
                        self.fold(&detail, bundle, &mut new_ids);
                    }

                    if navigator.go_back().is_err() {
                        self.channel
                            .push("Couldn't return to the match list", Severity::Warning);
                    }
                }

                // Progress ticks whether the record was folded, a duplicate,
                // or skipped.
                self.channel.record_completed();
            }
        }

        if self.state != SessionState::EarlyStop {
            self.state = SessionState::Exhausted;
        }
        new_ids
    }

    fn fold(&self, detail: &MatchDetail, bundle: &mut StatsBundle, new_ids: &mut BTreeSet<String>) {
        self.channel.push(
            format!("New match found: {}", detail.match_id),
            Severity::Normal,
        );
        let won = detail.outcome.is_win();
        self.channel.push(
            format!(
                "You {} as {}",
                if won { "won" } else { "lost" },
                detail.god_played
            ),
            if won { Severity::Normal } else { Severity::Error },
        );

        new_ids.insert(detail.match_id.clone());
        record_match(&mut bundle.gods, &detail.god_played, won, &detail.enemy_gods);
    }

    /// One record, with the boundary's retry rules: an intercepted click is
    /// retried once, an unpopulated match id is re-opened from the list a
    /// few times, a detail-load timeout skips the record. `None` means the
    /// record was given up on.
    fn open_detail_with_retry<N: PageNavigator>(
        &self,
        navigator: &mut N,
        handle: &MatchHandle,
    ) -> Option<MatchDetail> {
        let mut blocked_once = false;
        let mut empty_retries = 0;

        loop {
            match navigator.open_detail(handle) {
                Ok(detail) if detail.match_id.is_empty() => {
                    let _ = navigator.go_back();
                    empty_retries += 1;
                    if empty_retries >= EMPTY_ID_RETRIES {
                        self.channel
                            .push("Match id never appeared, skipping record", Severity::Warning);
                        return None;
                    }
                }
                Ok(detail) => return Some(detail),
                Err(SourceError::InteractionBlocked(_)) => {
                    self.channel
                        .push("Stop moving your mouse please :c", Severity::Warning);
                    if blocked_once {
                        self.channel
                            .push("Skipping blocked record", Severity::Warning);
                        return None;
                    }
                    blocked_once = true;
                }
                Err(SourceError::NavigationTimeout(e)) => {
                    self.channel.push(
                        format!("Match details never loaded: {}", e),
                        Severity::Error,
                    );
                    return None;
                }
            }
        }
    }
}

/// Runs sessions on a dedicated worker thread, one at a time. A start
/// request while a session is running is rejected with a warning on the
/// session's channel, never queued.
#[derive(Default)]
pub struct SessionRunner {
    busy: Arc<AtomicBool>,
}

impl SessionRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn start<N>(
        &self,
        mut session: ScrapeSession,
        mut navigator: N,
        update: bool,
    ) -> Result<JoinHandle<Result<SessionState, AppError>>, AppError>
    where
        N: PageNavigator + Send + 'static,
    {
        if self.busy.swap(true, Ordering::SeqCst) {
            session
                .channel()
                .push("A scrape session is already running", Severity::Warning);
            return Err(AppError::SessionBusy);
        }

        let busy = Arc::clone(&self.busy);
        Ok(thread::spawn(move || {
            let result = session.run(&mut navigator, update);
            busy.store(false, Ordering::SeqCst);
            result
        }))
    }
}
