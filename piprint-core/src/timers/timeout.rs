//! Inactivity timeout
//!
//! Powers the panel down after a period without host activity. Expiry is
//! submitted as [`Event::Timeout`] so the power-off is drawn through the
//! serializer like any other update.

use std::io;
use std::time::Duration;

use log::{debug, info};

use super::timer::{Timer, TimerState};
use crate::event::Event;
use crate::serializer::EventSink;

/// Outcome of [`InactivityTimeout::reset`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutReset {
    /// The timer was not running and has been started
    Started,
    /// A running timer had its deadline pushed back
    Extended,
}

/// Resettable panel power-off timer
pub struct InactivityTimeout {
    timer: Timer,
    duration: Duration,
}

impl InactivityTimeout {
    /// Create an idle timeout that submits expiries through `sink`
    pub fn new(duration: Duration, sink: EventSink<Event>) -> io::Result<Self> {
        let timer = Timer::new("timeout", move |generation| {
            info!("LCD timed out, turning off");
            sink.submit(Event::Timeout { generation });
        })?;
        debug!("Creating timeout timer");
        Ok(Self { timer, duration })
    }

    /// Register activity
    pub fn reset(&self) -> TimeoutReset {
        if self.timer.reschedule(self.duration) {
            debug!("reset LCD timeout");
            TimeoutReset::Extended
        } else {
            self.timer.arm_once(self.duration);
            info!("reset LCD timeout - Starting the timer");
            TimeoutReset::Started
        }
    }

    /// Stop the timer without powering down
    pub fn cancel(&self) -> bool {
        let cancelled = self.timer.cancel();
        if cancelled {
            debug!("Timeout timer is cancelled, will no longer turn off LCD");
        }
        cancelled
    }

    /// Whether `generation` is the expiry still pending
    ///
    /// False once the timer was reset or cancelled after firing.
    pub fn is_expiry(&self, generation: u64) -> bool {
        self.timer.state() == TimerState::Fired { generation }
    }

    /// Return a handled expiry to idle
    pub fn acknowledge(&self, generation: u64) -> bool {
        self.timer.acknowledge(generation)
    }

    /// State of the underlying timer
    pub fn state(&self) -> TimerState {
        self.timer.state()
    }

    /// Whether the timer is counting down
    pub fn is_running(&self) -> bool {
        matches!(self.timer.state(), TimerState::Armed { .. })
    }
}
