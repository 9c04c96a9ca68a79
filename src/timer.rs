//! Rest timer between exercises
//!
//! [`RestTimer`] is the countdown itself, advanced one tick at a time.
//! [`RestTicker`] drives it from a tokio task; starting a new countdown
//! always aborts the previous task so two tickers never run together.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::exercises::DEFAULT_REST_SECS;

/// Countdown period
pub const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { remaining: u32 },
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestTimer {
    total: u32,
    remaining: u32,
    status: TimerStatus,
}

impl Default for RestTimer {
    fn default() -> Self {
        Self {
            total: DEFAULT_REST_SECS,
            remaining: DEFAULT_REST_SECS,
            status: TimerStatus::Idle,
        }
    }
}

impl RestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting down from `seconds`, replacing any countdown in progress
    pub fn start(&mut self, seconds: u32) {
        self.total = seconds;
        self.remaining = seconds;
        self.status = if seconds == 0 {
            TimerStatus::Finished
        } else {
            TimerStatus::Running
        };
    }

    /// Advance one period. `None` unless running.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if self.status != TimerStatus::Running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.status = TimerStatus::Finished;
            Some(TimerEvent::Finished)
        } else {
            Some(TimerEvent::Tick {
                remaining: self.remaining,
            })
        }
    }

    /// Pause or resume. Returns whether the timer is running afterwards.
    pub fn toggle_pause(&mut self) -> bool {
        self.status = match self.status {
            TimerStatus::Running => TimerStatus::Paused,
            TimerStatus::Paused => TimerStatus::Running,
            other => other,
        };
        self.status == TimerStatus::Running
    }

    /// Back to the full rest time, keeping running/paused state
    pub fn reset(&mut self) {
        self.remaining = self.total;
        if self.status == TimerStatus::Finished {
            self.status = TimerStatus::Idle;
        }
    }

    /// Drop the remaining rest
    pub fn skip(&mut self) {
        self.remaining = 0;
        self.status = TimerStatus::Idle;
    }

    /// Show the full rest time for the next exercise without starting
    pub fn prepare(&mut self, seconds: u32) {
        if !self.is_active() {
            self.total = seconds;
            self.remaining = seconds;
            self.status = TimerStatus::Idle;
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, TimerStatus::Running | TimerStatus::Paused)
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Remaining time as `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

/// Runs a [`RestTimer`] on a tokio interval
pub struct RestTicker {
    timer: Arc<Mutex<RestTimer>>,
    task: Option<JoinHandle<()>>,
    period: Duration,
}

impl Default for RestTicker {
    fn default() -> Self {
        Self::with_period(TICK)
    }
}

impl RestTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            timer: Arc::new(Mutex::new(RestTimer::new())),
            task: None,
            period,
        }
    }

    /// Start a countdown. Any ticker already running is aborted first.
    /// Events arrive on the returned channel, which closes when the countdown ends.
    pub fn start(&mut self, seconds: u32) -> mpsc::UnboundedReceiver<TimerEvent> {
        self.cancel();
        self.with_timer(|t| t.start(seconds));
        debug!("Rest timer started: {}s", seconds);

        let (tx, rx) = mpsc::unbounded_channel();
        let timer = Arc::clone(&self.timer);
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let (event, active) = {
                    let mut t = timer.lock().unwrap_or_else(PoisonError::into_inner);
                    (t.tick(), t.is_active())
                };
                if let Some(event) = event
                    && tx.send(event).is_err()
                {
                    break;
                }
                if !active {
                    break;
                }
            }
        }));
        rx
    }

    /// Abort the running ticker. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                let running = !task.is_finished();
                task.abort();
                running
            }
            None => false,
        }
    }

    pub fn toggle_pause(&self) -> bool {
        self.with_timer(RestTimer::toggle_pause)
    }

    pub fn reset(&self) {
        self.with_timer(RestTimer::reset);
    }

    pub fn skip(&mut self) {
        self.with_timer(RestTimer::skip);
        self.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.with_timer(|t| t.is_active())
    }

    /// Copy of the current countdown state
    pub fn state(&self) -> RestTimer {
        self.with_timer(|t| t.clone())
    }

    fn with_timer<R>(&self, f: impl FnOnce(&mut RestTimer) -> R) -> R {
        let mut guard = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl Drop for RestTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}
