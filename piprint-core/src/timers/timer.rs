//! Generation-tagged timer backed by one worker thread
//!
//! A [`Timer`] is a small state machine:
//!
//! ```text
//! Idle --arm--> Armed{g} --deadline--> Fired{g} --acknowledge--> Idle
//!                  |  ^
//!                  |  +-- periodic: re-armed with the same g
//!                  +----- cancel --> Idle
//! ```
//!
//! Every arm hands out a fresh generation number that is passed to the
//! callback. A callback racing a cancel or re-arm therefore carries a
//! generation its owner no longer considers current, and can be dropped.

use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};

/// Externally visible timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Not scheduled
    Idle,
    /// Waiting for its deadline
    Armed {
        /// Generation of the current schedule
        generation: u64,
    },
    /// One-shot deadline passed, not yet acknowledged
    Fired {
        /// Generation that fired
        generation: u64,
    },
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Armed {
        deadline: Instant,
        period: Option<Duration>,
        generation: u64,
    },
    Fired {
        generation: u64,
    },
}

#[derive(Debug)]
struct Schedule {
    phase: Phase,
    last_generation: u64,
    shutdown: bool,
}

#[derive(Debug)]
struct Shared {
    schedule: Mutex<Schedule>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Schedule> {
        self.schedule.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resettable one-shot or periodic timer
pub struct Timer {
    name: String,
    shared: Arc<Shared>,
}

impl Timer {
    /// Spawn the worker thread
    ///
    /// `callback` runs on the worker with the generation of the schedule
    /// that expired, without any timer lock held.
    pub fn new<F>(name: &str, callback: F) -> io::Result<Self>
    where
        F: Fn(u64) + Send + 'static,
    {
        let shared = Arc::new(Shared {
            schedule: Mutex::new(Schedule {
                phase: Phase::Idle,
                last_generation: 0,
                shutdown: false,
            }),
            wake: Condvar::new(),
        });

        let worker = Arc::clone(&shared);
        thread::Builder::new()
            .name(format!("lcd-{}", name))
            .spawn(move || run(&worker, callback))?;

        Ok(Self {
            name: name.to_string(),
            shared,
        })
    }

    fn arm(&self, delay: Duration, period: Option<Duration>) -> u64 {
        let mut schedule = self.shared.lock();
        schedule.last_generation += 1;
        let generation = schedule.last_generation;
        schedule.phase = Phase::Armed {
            deadline: Instant::now() + delay,
            period,
            generation,
        };
        self.shared.wake.notify_one();
        debug!("{} timer armed in {:?} (gen {})", self.name, delay, generation);
        generation
    }

    /// Fire once after `delay`, replacing any current schedule
    pub fn arm_once(&self, delay: Duration) -> u64 {
        self.arm(delay, None)
    }

    /// Fire every `period`, replacing any current schedule
    pub fn arm_periodic(&self, period: Duration) -> u64 {
        self.arm(period, Some(period))
    }

    /// Push the deadline of an armed timer to `delay` from now
    ///
    /// The generation is kept. Returns false when the timer was not armed.
    pub fn reschedule(&self, delay: Duration) -> bool {
        let mut schedule = self.shared.lock();
        match &mut schedule.phase {
            Phase::Armed { deadline, .. } => {
                *deadline = Instant::now() + delay;
                self.shared.wake.notify_one();
                trace!("{} timer rescheduled", self.name);
                true
            }
            _ => false,
        }
    }

    /// Drop the current schedule
    ///
    /// Returns false when the timer was not armed.
    pub fn cancel(&self) -> bool {
        let mut schedule = self.shared.lock();
        let was_armed = matches!(schedule.phase, Phase::Armed { .. });
        schedule.phase = Phase::Idle;
        self.shared.wake.notify_one();
        if was_armed {
            debug!("{} timer cancelled", self.name);
        }
        was_armed
    }

    /// Move a fired timer back to idle
    ///
    /// Only the generation that fired is acknowledged; anything else is
    /// left alone so a newer schedule is not lost.
    pub fn acknowledge(&self, generation: u64) -> bool {
        let mut schedule = self.shared.lock();
        match schedule.phase {
            Phase::Fired { generation: fired } if fired == generation => {
                schedule.phase = Phase::Idle;
                true
            }
            _ => false,
        }
    }

    /// Current state
    pub fn state(&self) -> TimerState {
        match self.shared.lock().phase {
            Phase::Idle => TimerState::Idle,
            Phase::Armed { generation, .. } => TimerState::Armed { generation },
            Phase::Fired { generation } => TimerState::Fired { generation },
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.wake.notify_one();
    }
}

fn run<F: Fn(u64)>(shared: &Shared, callback: F) {
    let mut schedule = shared.lock();
    loop {
        if schedule.shutdown {
            return;
        }
        match schedule.phase {
            Phase::Armed {
                deadline,
                period,
                generation,
            } => {
                let now = Instant::now();
                if now < deadline {
                    schedule = shared
                        .wake
                        .wait_timeout(schedule, deadline - now)
                        .map(|(guard, _)| guard)
                        .unwrap_or_else(|e| e.into_inner().0);
                    continue;
                }

                schedule.phase = match period {
                    Some(period) => Phase::Armed {
                        deadline: now + period,
                        period: Some(period),
                        generation,
                    },
                    None => Phase::Fired { generation },
                };
                drop(schedule);
                callback(generation);
                schedule = shared.lock();
            }
            Phase::Idle | Phase::Fired { .. } => {
                schedule = shared
                    .wake
                    .wait(schedule)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    const SHORT: Duration = Duration::from_millis(20);
    const WAIT: Duration = Duration::from_millis(500);

    fn channel_timer() -> (Timer, mpsc::Receiver<u64>) {
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let timer = Timer::new("test", move |generation| {
            let _ = tx.lock().unwrap().send(generation);
        })
        .unwrap();
        (timer, rx)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let (timer, rx) = channel_timer();
        let generation = timer.arm_once(SHORT);
        assert_eq!(timer.state(), TimerState::Armed { generation });

        assert_eq!(rx.recv_timeout(WAIT), Ok(generation));
        assert_eq!(timer.state(), TimerState::Fired { generation });
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

        assert!(timer.acknowledge(generation));
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn test_generations_increase() {
        let (timer, _rx) = channel_timer();
        let first = timer.arm_once(WAIT);
        let second = timer.arm_once(WAIT);
        assert!(second > first);
        assert_eq!(timer.state(), TimerState::Armed { generation: second });
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let (timer, rx) = channel_timer();
        timer.arm_once(Duration::from_millis(50));
        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn test_reschedule_delays_deadline() {
        let (timer, rx) = channel_timer();
        let generation = timer.arm_once(Duration::from_millis(60));
        thread::sleep(Duration::from_millis(30));
        assert!(timer.reschedule(Duration::from_millis(200)));

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert_eq!(rx.recv_timeout(WAIT), Ok(generation));
    }

    #[test]
    fn test_reschedule_requires_armed() {
        let (timer, _rx) = channel_timer();
        assert!(!timer.reschedule(SHORT));
    }

    #[test]
    fn test_periodic_keeps_generation() {
        let (timer, rx) = channel_timer();
        let generation = timer.arm_periodic(SHORT);
        for _ in 0..3 {
            assert_eq!(rx.recv_timeout(WAIT), Ok(generation));
        }
        assert_eq!(timer.state(), TimerState::Armed { generation });
        timer.cancel();
    }

    #[test]
    fn test_acknowledge_ignores_other_generation() {
        let (timer, rx) = channel_timer();
        let generation = timer.arm_once(SHORT);
        rx.recv_timeout(WAIT).unwrap();
        assert!(!timer.acknowledge(generation + 1));
        assert_eq!(timer.state(), TimerState::Fired { generation });
    }
}
