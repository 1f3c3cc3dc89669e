//! Self-clearing notices.
//!
//! The "saved" notice disappears after a fixed delay. Every write to the
//! visible message list bumps a generation counter; a pending clear only
//! fires if nothing has been written since it was scheduled.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock {
    start: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock")
            .field("elapsed", &self.elapsed.get())
            .finish()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }
}

/// A scheduled clear, valid only for the generation it was created in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingClear {
    pub generation: u64,
    pub due: Instant,
}

#[derive(Debug, Clone)]
pub struct NoticeTimer {
    delay: Duration,
    generation: u64,
    pending: Option<PendingClear>,
}

impl NoticeTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    /// Record a write to the message list. Any pending clear becomes stale.
    pub fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Schedule a clear for the current generation, replacing any earlier one
    pub fn schedule(&mut self, now: Instant) -> PendingClear {
        let pending = PendingClear {
            generation: self.generation,
            due: now + self.delay,
        };
        self.pending = Some(pending);
        pending
    }

    /// Drop the pending clear, if any
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Returns true when a clear is due for the current generation.
    /// The pending clear is consumed when it fires or turns out to be stale.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(pending) = self.pending else {
            return false;
        };

        if pending.generation != self.generation {
            self.pending = None;
            return false;
        }

        if now >= pending.due {
            self.pending = None;
            return true;
        }

        false
    }

    /// When the pending clear will fire, if it is still current
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
            .filter(|p| p.generation == self.generation)
            .map(|p| p.due)
    }
}
