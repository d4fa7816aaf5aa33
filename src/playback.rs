// Playback sequencer - finite-state control over a fixed snapshot sequence
// One owned struct holds the sequence, the active index, and the single
// armed advancement deadline; no ambient state anywhere

use std::time::{Duration, Instant};

use crate::snapshot::Snapshot;

/// Fixed auto-advance interval between snapshots.
pub const ANIMATION_INTERVAL: Duration = Duration::from_millis(4000);

// ============================================================================
// MODE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// No sequence loaded
    Idle,
    /// Sequence loaded, not auto-advancing
    Stopped,
    /// Auto-advancing on the fixed interval
    Playing,
}

// ============================================================================
// SEQUENCER
// ============================================================================

/// Navigable, optionally auto-advancing cursor over a snapshot sequence.
///
/// The sequence is fixed once loaded. Scheduling is cooperative: `play`
/// arms a deadline and the host drives `poll` from its event loop; arming
/// always replaces any pending deadline, so at most one is active.
/// Manual navigation always takes the user out of auto-play.
pub struct PlaybackSequencer {
    snapshots: Vec<Snapshot>,
    active: usize,
    mode: PlaybackMode,
    interval: Duration,
    next_advance: Option<Instant>,
}

impl PlaybackSequencer {
    pub fn new() -> Self {
        Self::with_interval(ANIMATION_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        PlaybackSequencer {
            snapshots: Vec::new(),
            active: 0,
            mode: PlaybackMode::Idle,
            interval,
            next_advance: None,
        }
    }

    /// Load a new sequence. Starts `Stopped` at the first snapshot, or
    /// `Idle` when the sequence is empty. Any pending advancement from a
    /// previous sequence is cancelled.
    pub fn load(&mut self, snapshots: Vec<Snapshot>) {
        self.next_advance = None;
        self.active = 0;
        self.mode = if snapshots.is_empty() {
            PlaybackMode::Idle
        } else {
            PlaybackMode::Stopped
        };
        self.snapshots = snapshots;
    }

    /// Drop the loaded sequence, e.g. after a failed reload.
    pub fn clear(&mut self) {
        self.load(Vec::new());
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn is_playing(&self) -> bool {
        self.mode == PlaybackMode::Playing
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// The snapshot under the cursor; `None` only when `Idle`.
    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.active)
    }

    /// Manual navigation to an arbitrary position. The index wraps into
    /// `[0, len)`, negative values wrap from the end. Cancels auto-play:
    /// an explicit move always leaves the sequencer `Stopped`.
    ///
    /// Returns `true` when a sequence is loaded and the move happened.
    pub fn go_to(&mut self, index: i64) -> bool {
        if self.snapshots.is_empty() {
            return false;
        }
        self.cancel_auto_advance();
        self.active = wrap_index(self.snapshots.len(), index);
        true
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.active as i64 + 1)
    }

    pub fn prev(&mut self) -> bool {
        self.go_to(self.active as i64 - 1)
    }

    /// Start auto-advancing. A no-op unless the sequence has more than one
    /// snapshot - there is nothing to advance to otherwise. Any previously
    /// armed deadline is replaced, never doubled.
    pub fn play(&mut self, now: Instant) -> bool {
        if self.snapshots.len() <= 1 {
            return false;
        }
        self.mode = PlaybackMode::Playing;
        self.next_advance = Some(now + self.interval);
        true
    }

    /// Stop auto-advancing; the cursor stays where it is.
    pub fn pause(&mut self) {
        self.cancel_auto_advance();
    }

    /// Same transition as `pause`; kept as the explicit "stop" command.
    pub fn stop(&mut self) {
        self.cancel_auto_advance();
    }

    /// Convenience for a play/pause control.
    pub fn toggle(&mut self, now: Instant) -> bool {
        if self.is_playing() {
            self.pause();
            false
        } else {
            self.play(now)
        }
    }

    /// Drive the scheduler. Advances (with wrap-around) when playing and
    /// the deadline has passed, then re-arms from `now` so a stalled host
    /// does not burst through several snapshots at once.
    ///
    /// Returns `true` when the cursor moved.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.mode != PlaybackMode::Playing {
            return false;
        }
        match self.next_advance {
            Some(deadline) if now >= deadline => {
                self.active = wrap_index(self.snapshots.len(), self.active as i64 + 1);
                self.next_advance = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Time left until the next scheduled advancement, for sizing host
    /// poll timeouts.
    pub fn time_until_advance(&self, now: Instant) -> Option<Duration> {
        self.next_advance
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    fn cancel_auto_advance(&mut self) {
        self.next_advance = None;
        if self.mode == PlaybackMode::Playing {
            self.mode = PlaybackMode::Stopped;
        }
    }
}

impl Default for PlaybackSequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap an index into `[0, len)`; negative indices wrap from the end.
fn wrap_index(len: usize, index: i64) -> usize {
    let len = len as i64;
    (((index % len) + len) % len) as usize
}

// ============================================================================
// TESTS
// ============================================================================
