//! Taskbar clock timer.
//!
//! The ticker is polled from the UI loop instead of owning a timer task, so a tick is
//! always produced on the same thread that paints it.

use std::fmt;
use std::time::{Duration, Instant};

use mks_types::ClockTick;

/// Period of the taskbar clock.
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

/// Source of the time shown in the taskbar.
pub trait WallClock {
    fn now(&self) -> ClockTick;
}

/// Local wall time via `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> ClockTick {
        let now = chrono::Local::now();
        ClockTick::new(
            now.format("%H:%M:%S").to_string(),
            now.format("%Y-%m-%d").to_string(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickerState {
    Idle,
    Armed { next_due: Instant },
    Stopped,
}

/// Repeating, cancellable clock timer.
///
/// At most one tick is pending at a time. A tick fires on the first `poll` at or after
/// its due instant, and the next one is scheduled `interval` after that poll, so two
/// ticks are never closer together than `interval`.
pub struct ClockTicker {
    interval: Duration,
    clock: Box<dyn WallClock>,
    state: TickerState,
}

impl fmt::Debug for ClockTicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockTicker")
            .field("interval", &self.interval)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ClockTicker {
    #[must_use]
    pub fn new(interval: Duration, clock: Box<dyn WallClock>) -> Self {
        Self {
            interval,
            clock,
            state: TickerState::Idle,
        }
    }

    /// Arm the ticker. The first tick is due at `now`; re-arming replaces any pending tick.
    pub fn start(&mut self, now: Instant) {
        self.state = TickerState::Armed { next_due: now };
    }

    pub fn poll(&mut self, now: Instant) -> Option<ClockTick> {
        let TickerState::Armed { next_due } = self.state else {
            return None;
        };
        if now < next_due {
            return None;
        }
        self.state = TickerState::Armed {
            next_due: now + self.interval,
        };
        Some(self.clock.now())
    }

    /// No tick is produced after this returns.
    pub fn stop(&mut self) {
        self.state = TickerState::Stopped;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, TickerState::Armed { .. })
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state == TickerState::Stopped
    }

    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        match self.state {
            TickerState::Armed { next_due } => Some(next_due),
            TickerState::Idle | TickerState::Stopped => None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;

    fn ticker() -> ClockTicker {
        ClockTicker::new(CLOCK_INTERVAL, Box::new(ManualClock::default()))
    }

    #[test]
    fn idle_ticker_never_fires() {
        let mut ticker = ticker();
        assert!(ticker.poll(Instant::now()).is_none());
        assert!(!ticker.is_running());
    }

    #[test]
    fn first_tick_is_immediate() {
        let mut ticker = ticker();
        let t0 = Instant::now();
        ticker.start(t0);
        let tick = ticker.poll(t0).expect("first tick");
        assert_eq!(tick.label(), "00:00:00  2026-01-01");
        assert_eq!(ticker.next_due(), Some(t0 + CLOCK_INTERVAL));
    }

    #[test]
    fn fires_at_most_once_per_poll_and_respects_interval() {
        let mut ticker = ticker();
        let t0 = Instant::now();
        ticker.start(t0);
        assert!(ticker.poll(t0).is_some());
        assert!(ticker.poll(t0 + Duration::from_millis(999)).is_none());

        // A late poll fires once and reschedules from the firing instant.
        let late = t0 + Duration::from_secs(5);
        assert!(ticker.poll(late).is_some());
        assert!(ticker.poll(late).is_none());
        assert_eq!(ticker.next_due(), Some(late + CLOCK_INTERVAL));
    }

    #[test]
    fn stop_cancels_pending_tick() {
        let mut ticker = ticker();
        let t0 = Instant::now();
        ticker.start(t0);
        ticker.stop();
        assert!(ticker.is_stopped());
        assert!(ticker.poll(t0 + Duration::from_secs(10)).is_none());
        assert_eq!(ticker.next_due(), None);
    }

    #[test]
    fn system_clock_formats_time_and_date() {
        let tick = SystemClock.now();
        assert_eq!(tick.time.len(), 8);
        assert_eq!(tick.time.as_bytes()[2], b':');
        assert_eq!(tick.date.len(), 10);
        assert_eq!(tick.date.as_bytes()[4], b'-');
    }
}
