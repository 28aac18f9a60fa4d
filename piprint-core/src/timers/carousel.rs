//! Print carousel
//!
//! While a job prints, the second row rotates between the progress bar,
//! the estimated time left and the elapsed time. Each rotation is submitted
//! as an [`Event::Carousel`] so it is drawn through the same serialized path
//! as every other update.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, error, info};

use super::timer::Timer;
use crate::event::Event;
use crate::serializer::EventSink;
use crate::stats::{PrintStats, SharedPrintStats};

/// Carousel views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselView {
    /// Progress bar
    Progress,
    /// Estimated time remaining
    TimeLeft,
    /// Time elapsed
    Elapsed,
}

impl CarouselView {
    /// Name used in logs
    pub fn event_name(&self) -> &'static str {
        match self {
            CarouselView::Progress => "self_progress",
            CarouselView::TimeLeft => "self_time_left",
            CarouselView::Elapsed => "self_time",
        }
    }
}

/// Rotation order
pub const VIEWS: [CarouselView; 3] = [
    CarouselView::Progress,
    CarouselView::TimeLeft,
    CarouselView::Elapsed,
];

/// One rotation step, as submitted to the serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselTick {
    /// View to show
    pub view: CarouselView,
    /// Generation of the run that produced the tick
    pub generation: u64,
    /// Print statistics at the time of the tick
    pub stats: PrintStats,
}

#[derive(Debug, Default)]
struct Rotation {
    index: usize,
    /// Generation of the active run, `None` when stopped
    generation: Option<u64>,
}

fn lock(rotation: &Mutex<Rotation>) -> MutexGuard<'_, Rotation> {
    rotation.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Periodic view rotation during a print
pub struct Carousel {
    timer: Timer,
    rotation: Arc<Mutex<Rotation>>,
    interval: Duration,
}

impl Carousel {
    /// Create a stopped carousel
    ///
    /// Ticks are built from `stats` and submitted through `sink`.
    pub fn new(
        interval: Duration,
        stats: SharedPrintStats,
        sink: EventSink<Event>,
    ) -> io::Result<Self> {
        let rotation = Arc::new(Mutex::new(Rotation::default()));

        let shared = Arc::clone(&rotation);
        let timer = Timer::new("carousel", move |generation| {
            let view = {
                let mut rotation = lock(&shared);
                if rotation.generation != Some(generation) {
                    debug!("Dropping stale carousel tick (gen {})", generation);
                    return;
                }
                rotation.index = (rotation.index + 1) % VIEWS.len();
                VIEWS[rotation.index]
            };
            info!("Carousel Event: {}", view.event_name());
            sink.submit(Event::Carousel(CarouselTick {
                view,
                generation,
                stats: stats.snapshot(),
            }));
        })?;

        Ok(Self {
            timer,
            rotation,
            interval,
        })
    }

    /// Start rotating from the progress view
    ///
    /// Starting a running carousel restarts it.
    pub fn start(&self) {
        let mut rotation = lock(&self.rotation);
        if rotation.generation.is_some() {
            error!("Carousel is already running!  Restarting");
        } else {
            debug!("Starting print carousel");
        }
        rotation.index = 0;
        rotation.generation = Some(self.timer.arm_periodic(self.interval));
    }

    /// Stop rotating
    pub fn stop(&self) {
        let mut rotation = lock(&self.rotation);
        debug!("Stopping print carousel");
        rotation.generation = None;
        self.timer.cancel();
    }

    /// Whether a run is active
    pub fn is_running(&self) -> bool {
        lock(&self.rotation).generation.is_some()
    }

    /// Generation of the active run
    pub fn generation(&self) -> Option<u64> {
        lock(&self.rotation).generation
    }

    /// View the carousel is currently on
    pub fn current_view(&self) -> CarouselView {
        VIEWS[lock(&self.rotation).index]
    }

    /// Whether `generation` belongs to the active run
    pub fn is_current(&self, generation: u64) -> bool {
        lock(&self.rotation).generation == Some(generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    const INTERVAL: Duration = Duration::from_millis(30);
    const WAIT: Duration = Duration::from_millis(500);

    fn carousel() -> (Carousel, SharedPrintStats, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let sink = EventSink::new();
        sink.connect(move |event| {
            let _ = tx.lock().unwrap().send(event);
        });
        let stats = SharedPrintStats::new();
        let carousel = Carousel::new(INTERVAL, stats.clone(), sink).unwrap();
        (carousel, stats, rx)
    }

    fn next_tick(rx: &mpsc::Receiver<Event>) -> CarouselTick {
        match rx.recv_timeout(WAIT) {
            Ok(Event::Carousel(tick)) => tick,
            other => panic!("expected carousel tick, got {:?}", other),
        }
    }

    #[test]
    fn test_stopped_by_default() {
        let (carousel, _, rx) = carousel();
        assert!(!carousel.is_running());
        assert_eq!(carousel.current_view(), CarouselView::Progress);
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn test_rotates_through_views() {
        let (carousel, stats, rx) = carousel();
        stats.update(PrintStats {
            print_time: Some(90),
            print_time_left: Some(120),
        });
        carousel.start();

        let first = next_tick(&rx);
        assert_eq!(first.view, CarouselView::TimeLeft);
        assert_eq!(first.stats.print_time_left, Some(120));
        assert!(carousel.is_current(first.generation));

        assert_eq!(next_tick(&rx).view, CarouselView::Elapsed);
        assert_eq!(next_tick(&rx).view, CarouselView::Progress);
        assert_eq!(next_tick(&rx).view, CarouselView::TimeLeft);
        carousel.stop();
    }

    #[test]
    fn test_stop_halts_ticks() {
        let (carousel, _, rx) = carousel();
        carousel.start();
        next_tick(&rx);
        carousel.stop();
        // drain a tick that raced the stop
        let _ = rx.recv_timeout(Duration::from_millis(10));
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert!(!carousel.is_running());
    }

    #[test]
    fn test_restart_resets_view_and_generation() {
        let (carousel, _, rx) = carousel();
        carousel.start();
        let old = next_tick(&rx).generation;

        carousel.start();
        assert_eq!(carousel.current_view(), CarouselView::Progress);
        assert!(!carousel.is_current(old));

        let tick = loop {
            let tick = next_tick(&rx);
            if tick.generation != old {
                break tick;
            }
        };
        assert_eq!(tick.view, CarouselView::TimeLeft);
        carousel.stop();
    }
}
