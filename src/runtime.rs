use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::debug;

use crate::clock::{Clock, Metronome, SystemClock};

/// How often the host loop wakes up when no input arrives
pub const TICK_RATE_MS: u64 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayEvent {
    Key(KeyEvent),
    Resize,
    /// Whole game seconds elapsed since the previous tick, often 0
    Tick(u32),
    /// Terminal focus changed; losing focus pauses play
    Focus(bool),
}

pub trait EventSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<PlayEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a helper thread, dropping key releases
pub struct CrosstermEventSource {
    rx: Receiver<PlayEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    Some(PlayEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => Some(PlayEvent::Resize),
                Ok(CtEvent::FocusGained) => Some(PlayEvent::Focus(true)),
                Ok(CtEvent::FocusLost) => Some(PlayEvent::Focus(false)),
                Ok(_) => None,
                Err(e) => {
                    debug!(error = %e, "terminal input closed");
                    break;
                }
            };
            if let Some(ev) = forwarded {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PlayEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed event source for driving the loop without a terminal
pub struct TestEventSource {
    rx: Receiver<PlayEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<PlayEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PlayEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Merges player input with game time.
///
/// Every step waits at most one ticker interval for input and then reads the
/// clock. When whole seconds have passed the tick is delivered first and any
/// input that arrived with it is held for the next step, so a player mashing
/// keys cannot stall the round timer.
pub struct Runner<E: EventSource, T: Ticker, C: Clock = SystemClock> {
    event_source: E,
    ticker: T,
    metronome: Metronome<C>,
    pending: Option<PlayEvent>,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self::with_clock(event_source, ticker, SystemClock)
    }
}

impl<E: EventSource, T: Ticker, C: Clock> Runner<E, T, C> {
    pub fn with_clock(event_source: E, ticker: T, clock: C) -> Self {
        Self {
            event_source,
            ticker,
            metronome: Metronome::new(clock),
            pending: None,
        }
    }

    pub fn step(&mut self) -> PlayEvent {
        if let Some(ev) = self.pending.take() {
            return ev;
        }

        let received = match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        };
        let secs = self.metronome.poll();

        match received {
            Some(ev) if secs == 0 => ev,
            Some(ev) => {
                self.pending = Some(ev);
                PlayEvent::Tick(secs)
            }
            None => PlayEvent::Tick(secs),
        }
    }
}
