use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time for the game loop
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to; clones share the same time
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Turns elapsed clock time into whole-second game ticks, carrying the remainder
#[derive(Debug)]
pub struct Metronome<C: Clock> {
    clock: C,
    period: Duration,
    last: Instant,
    carry: Duration,
}

impl<C: Clock> Metronome<C> {
    pub fn new(clock: C) -> Self {
        Self::with_period(clock, Duration::from_secs(1))
    }

    pub fn with_period(clock: C, period: Duration) -> Self {
        let last = clock.now();
        Self {
            clock,
            period,
            last,
            carry: Duration::ZERO,
        }
    }

    /// Number of whole periods that elapsed since the last poll
    pub fn poll(&mut self) -> u32 {
        let now = self.clock.now();
        self.carry += now.saturating_duration_since(self.last);
        self.last = now;

        let mut ticks = 0;
        while self.carry >= self.period {
            self.carry -= self.period;
            ticks += 1;
        }
        ticks
    }
}
