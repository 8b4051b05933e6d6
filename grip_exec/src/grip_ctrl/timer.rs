//! Command reapply timer

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A periodic deadline for reapplying the current joystick vector.
///
/// The timer does not schedule anything itself - the exec's cyclic main loop
/// polls it once per cycle. Starting an already running timer resets its
/// phase rather than queueing a second series of deadlines.
pub struct ReapplyTimer {
    interval: Duration,

    /// The next fire time, `None` while stopped.
    deadline: Option<Instant>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ReapplyTimer {
    /// Create a new stopped timer with the given reapply interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Start the timer, with the first deadline one full interval after
    /// `now`.
    ///
    /// Starting a running timer resets its phase from `now`.
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// Stop the timer. Stopping a stopped timer is a no-op.
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// Whether the timer is currently running.
    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Poll the timer, returning true if the deadline has passed.
    ///
    /// On firing the next deadline keeps the fixed cadence, unless the
    /// caller has stalled for a full interval or more, in which case the
    /// cadence is re-anchored to `now` rather than firing a catch-up burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                let next = deadline + self.interval;
                self.deadline = Some(if next <= now { now + self.interval } else { next });
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(100);

    fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_first_fire_after_one_interval() {
        let mut timer = ReapplyTimer::new(INTERVAL);
        let t0 = Instant::now();

        timer.start(t0);

        assert!(!timer.poll(t0));
        assert!(!timer.poll(t0 + millis(99)));
        assert!(timer.poll(t0 + millis(100)));
    }

    #[test]
    fn test_fixed_cadence() {
        let mut timer = ReapplyTimer::new(INTERVAL);
        let t0 = Instant::now();

        timer.start(t0);

        // Polled slightly late the next deadline stays on the original grid
        assert!(timer.poll(t0 + millis(105)));
        assert!(!timer.poll(t0 + millis(150)));
        assert!(timer.poll(t0 + millis(200)));
    }

    #[test]
    fn test_restart_resets_phase() {
        let mut timer = ReapplyTimer::new(INTERVAL);
        let t0 = Instant::now();

        timer.start(t0);
        timer.start(t0 + millis(50));

        // The original deadline has been replaced, not queued alongside
        assert!(!timer.poll(t0 + millis(100)));
        assert!(timer.poll(t0 + millis(150)));
        assert!(!timer.poll(t0 + millis(151)));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut timer = ReapplyTimer::new(INTERVAL);
        let t0 = Instant::now();

        timer.stop();
        assert!(!timer.is_running());

        timer.start(t0);
        assert!(timer.is_running());

        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
        assert!(!timer.poll(t0 + millis(500)));
    }

    #[test]
    fn test_overrun_reanchors_the_cadence() {
        let mut timer = ReapplyTimer::new(INTERVAL);
        let t0 = Instant::now();

        timer.start(t0);

        // Stall for several intervals - a single fire, then a fresh grid
        assert!(timer.poll(t0 + millis(350)));
        assert!(!timer.poll(t0 + millis(400)));
        assert!(timer.poll(t0 + millis(450)));
    }
}
