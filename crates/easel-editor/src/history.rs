//! Undo/redo history.
//!
//! History is a linear list of encoded document snapshots with a cursor.
//! Recording appends the current snapshot (truncating any redo tail);
//! undo/redo only move the cursor and hand back the snapshot to replay.
//!
//! Replaying a snapshot makes the engine emit its own change events. While
//! a replay is in flight the history is `Replaying` and those events must
//! not be recorded. Continuous gestures (drag, freehand strokes) are
//! coalesced through a single debounce slot into one entry.

use crate::adapter::LoadTicket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    Idle,
    /// Waiting for `Loaded(ticket)`. A newer undo/redo replaces the ticket.
    Replaying { ticket: LoadTicket },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Appended,
    /// Snapshot equals the current entry; nothing recorded.
    Unchanged,
    /// A replay is in flight; recorded once it completes.
    Deferred,
}

/// Single pending-record slot for debounced recording.
#[derive(Debug, Clone, Default)]
pub struct Debounce {
    window_ms: u64,
    pending_since: Option<u64>,
}

impl Debounce {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending_since: None,
        }
    }

    /// (Re)start the quiet period at `now_ms`.
    pub fn schedule(&mut self, now_ms: u64) {
        self.pending_since = Some(now_ms);
    }

    /// True once the quiet period has elapsed; clears the slot.
    pub fn due(&mut self, now_ms: u64) -> bool {
        match self.pending_since {
            Some(since) if now_ms.saturating_sub(since) >= self.window_ms => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending_since = None;
    }
}

pub struct History {
    entries: Vec<Vec<u8>>,
    index: usize,
    /// Maximum number of entries kept (never below 1).
    max_entries: usize,
    state: ReplayState,
    /// A record was requested while replaying.
    deferred: bool,
    pub debounce: Debounce,
}

impl History {
    pub fn new(initial: Vec<u8>, max_entries: usize, debounce_ms: u64) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            max_entries: max_entries.max(1),
            state: ReplayState::Idle,
            deferred: false,
            debounce: Debounce::new(debounce_ms),
        }
    }

    /// Record a snapshot as the new current state.
    pub fn record(&mut self, snapshot: Vec<u8>) -> RecordOutcome {
        if self.is_replaying() {
            self.deferred = true;
            return RecordOutcome::Deferred;
        }
        self.debounce.cancel();
        if self.entries[self.index] == snapshot {
            return RecordOutcome::Unchanged;
        }

        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
        self.index = self.entries.len() - 1;
        log::debug!(
            "history: recorded entry {} of {}",
            self.index + 1,
            self.entries.len()
        );
        RecordOutcome::Appended
    }

    /// Move the cursor back and return the snapshot to replay, or `None`
    /// at the initial state.
    pub fn undo(&mut self) -> Option<&[u8]> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        log::debug!("history: undo to entry {}", self.index + 1);
        Some(&self.entries[self.index])
    }

    /// Move the cursor forward and return the snapshot to replay, or
    /// `None` at the newest state.
    pub fn redo(&mut self) -> Option<&[u8]> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        log::debug!("history: redo to entry {}", self.index + 1);
        Some(&self.entries[self.index])
    }

    /// Restore a cursor position after a failed replay.
    pub(crate) fn restore_index(&mut self, index: usize) {
        self.index = index.min(self.entries.len() - 1);
    }

    pub fn begin_replay(&mut self, ticket: LoadTicket) {
        if let ReplayState::Replaying { ticket: old } = self.state {
            log::debug!("history: replay {old:?} superseded by {ticket:?}");
        }
        self.state = ReplayState::Replaying { ticket };
    }

    /// Handle a completed load. Returns true when it was the awaited one
    /// and the history is idle again.
    pub fn finish_replay(&mut self, ticket: LoadTicket) -> bool {
        match self.state {
            ReplayState::Replaying { ticket: awaited } if awaited == ticket => {
                self.state = ReplayState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Request a record once the in-flight replay completes.
    pub fn defer_record(&mut self) {
        self.deferred = true;
    }

    /// Take the deferred-record flag (only meaningful when idle).
    pub fn take_deferred(&mut self) -> bool {
        !self.is_replaying() && std::mem::take(&mut self.deferred)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn is_replaying(&self) -> bool {
        matches!(self.state, ReplayState::Replaying { .. })
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &[u8] {
        &self.entries[self.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(n: u8) -> Vec<u8> {
        vec![n]
    }

    #[test]
    fn record_appends_and_skips_duplicates() {
        let mut h = History::new(snap(0), 10, 0);
        assert_eq!(h.record(snap(1)), RecordOutcome::Appended);
        assert_eq!(h.record(snap(1)), RecordOutcome::Unchanged);
        assert_eq!(h.len(), 2);
        assert_eq!(h.index(), 1);
    }

    #[test]
    fn undo_redo_bounds() {
        let mut h = History::new(snap(0), 10, 0);
        assert!(h.undo().is_none());
        h.record(snap(1));
        h.record(snap(2));
        assert_eq!(h.undo(), Some(&[1u8][..]));
        assert_eq!(h.undo(), Some(&[0u8][..]));
        assert!(!h.can_undo());
        assert!(h.undo().is_none());
        assert_eq!(h.index(), 0);
        assert_eq!(h.redo(), Some(&[1u8][..]));
        assert!(h.can_redo());
    }

    #[test]
    fn recording_after_undo_truncates_redo_tail() {
        let mut h = History::new(snap(0), 10, 0);
        h.record(snap(1));
        h.record(snap(2));
        h.undo();
        h.record(snap(3));
        assert_eq!(h.len(), 3);
        assert!(!h.can_redo());
        assert_eq!(h.current(), &[3]);
    }

    #[test]
    fn cap_drops_oldest() {
        let mut h = History::new(snap(0), 3, 0);
        for n in 1..=5 {
            h.record(snap(n));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.index(), 2);
        assert_eq!(h.current(), &[5]);
        h.undo();
        h.undo();
        assert_eq!(h.current(), &[3]);
        assert!(!h.can_undo());
    }

    #[test]
    fn replay_guard_defers_records() {
        let mut h = History::new(snap(0), 10, 0);
        h.record(snap(1));
        h.undo();
        h.begin_replay(LoadTicket(1));
        assert_eq!(h.record(snap(9)), RecordOutcome::Deferred);
        assert_eq!(h.len(), 2);
        assert!(!h.take_deferred(), "still replaying");

        // A stale completion does not end the replay.
        h.begin_replay(LoadTicket(2));
        assert!(!h.finish_replay(LoadTicket(1)));
        assert!(h.is_replaying());
        assert!(h.finish_replay(LoadTicket(2)));
        assert!(h.take_deferred());
        assert!(!h.take_deferred());
    }

    #[test]
    fn debounce_waits_for_quiet_period() {
        let mut d = Debounce::new(500);
        assert!(!d.due(1_000));
        d.schedule(1_000);
        assert!(!d.due(1_200));
        d.schedule(1_300);
        assert!(!d.due(1_700));
        assert!(d.due(1_800));
        assert!(!d.is_pending());
    }
}
