use crate::analysis::god_stats::StatsMap;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleMessage {
    pub text: String,
    pub severity: Severity,
}

impl ConsoleMessage {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        ConsoleMessage {
            text: text.into(),
            severity,
        }
    }
}

#[derive(Debug, Default)]
struct ProgressState {
    total_records: Option<usize>,
    records_completed: usize,
    messages: VecDeque<ConsoleMessage>,
    stats: Option<StatsMap>,
}

/// Shared channel between the scrape worker and the polling caller: a FIFO
/// message queue, a progress pair, and the final statistics map. Shared via
/// `Arc`; the caller polls at its own tick rate.
#[derive(Debug, Default)]
pub struct ProgressChannel {
    inner: Mutex<ProgressState>,
}

impl ProgressChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// First write wins; later calls are ignored.
    pub fn set_total_records(&self, total: usize) {
        let mut state = self.lock();
        if state.total_records.is_none() {
            state.total_records = Some(total);
        }
    }

    pub fn record_completed(&self) {
        self.lock().records_completed += 1;
    }

    /// (total if known yet, completed so far).
    pub fn progress(&self) -> (Option<usize>, usize) {
        let state = self.lock();
        (state.total_records, state.records_completed)
    }

    pub fn push(&self, text: impl Into<String>, severity: Severity) {
        self.lock()
            .messages
            .push_back(ConsoleMessage::new(text, severity));
    }

    /// Pops the oldest unread message, FIFO.
    pub fn poll_message(&self) -> Option<ConsoleMessage> {
        self.lock().messages.pop_front()
    }

    pub fn publish_stats(&self, stats: StatsMap) {
        self.lock().stats = Some(stats);
    }

    pub fn stats(&self) -> Option<StatsMap> {
        self.lock().stats.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProgressState> {
        // A worker panic while holding the lock already surfaces through the
        // join handle; the state itself stays consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_first_write_wins() {
        let channel = ProgressChannel::new();
        channel.set_total_records(42);
        channel.set_total_records(7);

        assert_eq!(channel.progress().0, Some(42));
    }

    #[test]
    fn messages_come_out_fifo_one_at_a_time() {
        let channel = ProgressChannel::new();
        channel.push("first", Severity::Normal);
        channel.push("second", Severity::Warning);

        assert_eq!(channel.poll_message().unwrap().text, "first");
        assert_eq!(channel.poll_message().unwrap().text, "second");
        assert!(channel.poll_message().is_none());
    }

    #[test]
    fn completed_counter_accumulates() {
        let channel = ProgressChannel::new();
        channel.record_completed();
        channel.record_completed();

        assert_eq!(channel.progress(), (None, 2));
    }
}
