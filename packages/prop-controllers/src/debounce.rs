//! # Commit Debounce
//!
//! A text editor keeps local state so typed characters show up immediately,
//! while the prop data coming back from the builder stays the source of truth.
//! Committing prop data mid-typing would replay stale intermediate values over
//! the user's input, so commits are held back until the input stream is quiet.
//!
//! ```text
//!            local edit               delay elapsed            commit
//!   Idle ──────────────► Editing ──────────────────► Pending ─────────► Idle
//!    ▲                    │  ▲                          │
//!    │                    └──┘ local edit (restart)     │ local edit
//!    │                                                  ▼
//!    └───────────────────────────────────────────── Editing
//! ```
//!
//! Time is passed in explicitly so the machine can be driven by frame ticks,
//! timers, or tests.

use std::time::Duration;
use web_time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPhase {
    /// No local edits in flight; prop data is committed as it arrives
    Idle,
    /// The user is typing; prop data is held back
    Editing { last_edit: Instant },
    /// The quiet period elapsed; the next prop data is committed
    PendingCommit,
}

#[derive(Debug, Clone)]
pub struct CommitDebounce {
    delay: Duration,
    phase: CommitPhase,
}

impl CommitDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            phase: CommitPhase::Idle,
        }
    }

    pub fn phase(&self) -> CommitPhase {
        self.phase
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a local edit, restarting the quiet period
    pub fn local_edit(&mut self, now: Instant) {
        self.phase = CommitPhase::Editing { last_edit: now };
    }

    /// Advance the timer. Returns `true` when this call moved the machine into
    /// `PendingCommit`.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.phase {
            CommitPhase::Editing { last_edit } if now.duration_since(last_edit) >= self.delay => {
                self.phase = CommitPhase::PendingCommit;
                true
            }
            _ => false,
        }
    }

    /// Whether authoritative prop data may replace the local value right now
    pub fn should_commit(&self) -> bool {
        !matches!(self.phase, CommitPhase::Editing { .. })
    }

    /// Mark the pending prop data as committed
    pub fn commit(&mut self) {
        if self.phase == CommitPhase::PendingCommit {
            self.phase = CommitPhase::Idle;
        }
    }

    /// When the current quiet period ends, if one is running
    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            CommitPhase::Editing { last_edit } => Some(last_edit + self.delay),
            _ => None,
        }
    }
}
