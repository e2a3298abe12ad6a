//! Minimum-delay gate between projector commands.
//!
//! JVC projectors drop the control connection when commands arrive faster
//! than they can process them.  [`Throttle`] remembers when the last command
//! completed and makes the next one wait out the rest of the configured delay.
//!
//! The clock is injected through the [`Clock`] trait so tests can replace
//! real sleeping with [`super::mock::ManualClock`].

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of time for the throttle.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// The real monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Tracks the completion time of the last command.
///
/// The state is owned by the protocol client and outlives individual
/// sessions, so the delay applies across top-level calls.  Sessions borrow it
/// mutably, which keeps a single writer.
pub struct Throttle {
    clock: Arc<dyn Clock>,
    delay: Duration,
    /// `None` means "far in the past": the first command is never delayed.
    last_command: Option<Instant>,
}

impl Throttle {
    pub fn new(delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            delay,
            last_command: None,
        }
    }

    pub fn last_command(&self) -> Option<Instant> {
        self.last_command
    }

    /// Returns how long the next command still has to wait.
    pub fn remaining(&self) -> Duration {
        match self.last_command {
            None => Duration::ZERO,
            Some(last) => {
                let elapsed = self.clock.now().saturating_duration_since(last);
                self.delay.saturating_sub(elapsed)
            }
        }
    }

    /// Blocks until the delay since the last command has passed.
    ///
    /// Returns the time slept.
    pub fn wait(&self) -> Duration {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            self.clock.sleep(remaining);
        }
        remaining
    }

    /// Records that a command has just completed.
    pub fn mark(&mut self) {
        self.last_command = Some(self.clock.now());
    }
}
