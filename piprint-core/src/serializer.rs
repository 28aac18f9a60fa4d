//! Single-flight event serializer
//!
//! Host callbacks and timer threads may submit events concurrently, but the
//! display must see them one at a time and in order. Every submission is
//! appended to a FIFO queue. A submitter that finds the serializer idle
//! becomes the drainer: it renders queued events until the queue is empty.
//! Everybody else returns immediately after enqueueing.
//!
//! The drainer flips back to idle while still holding the queue lock, in
//! the same critical section that observed the queue empty, so an event
//! can never be stranded between the last pop and the flip.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use log::{trace, warn};

/// Something that draws events
pub trait Render {
    /// Event type consumed
    type Event;
    /// Error returned when drawing fails
    type Error;

    /// Draw one event
    fn render(&mut self, event: Self::Event) -> Result<(), Self::Error>;
}

/// What happened to a submitted event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The caller drained the queue, including its own event
    Rendered,
    /// Another caller is draining and will render the event
    Queued,
}

struct Inbox<E> {
    rendering: bool,
    queue: VecDeque<E>,
}

/// Serializes rendering of events submitted from any thread
pub struct EventSerializer<R: Render> {
    inbox: Mutex<Inbox<R::Event>>,
    renderer: Mutex<R>,
}

/// Restores the idle state if draining stops early
struct DrainGuard<'a, E> {
    inbox: &'a Mutex<Inbox<E>>,
    active: bool,
}

impl<E> Drop for DrainGuard<'_, E> {
    fn drop(&mut self) {
        if self.active {
            lock(self.inbox).rendering = false;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R: Render> EventSerializer<R> {
    /// Wrap a renderer
    pub fn new(renderer: R) -> Self {
        Self {
            inbox: Mutex::new(Inbox {
                rendering: false,
                queue: VecDeque::new(),
            }),
            renderer: Mutex::new(renderer),
        }
    }

    /// Submit an event
    ///
    /// On a render error the drainer stops, the serializer returns to idle
    /// and the events still queued are kept for the next submission.
    pub fn submit(&self, event: R::Event) -> Result<Submission, R::Error> {
        {
            let mut inbox = lock(&self.inbox);
            inbox.queue.push_back(event);
            if inbox.rendering {
                trace!("Render in progress, queued ({} pending)", inbox.queue.len());
                return Ok(Submission::Queued);
            }
            inbox.rendering = true;
        }

        let mut guard = DrainGuard {
            inbox: &self.inbox,
            active: true,
        };
        let mut renderer = lock(&self.renderer);
        loop {
            let next = {
                let mut inbox = lock(&self.inbox);
                match inbox.queue.pop_front() {
                    Some(event) => event,
                    None => {
                        inbox.rendering = false;
                        guard.active = false;
                        return Ok(Submission::Rendered);
                    }
                }
            };
            renderer.render(next)?;
        }
    }

    /// Whether nobody is draining
    pub fn is_idle(&self) -> bool {
        !lock(&self.inbox).rendering
    }

    /// Number of events waiting to be rendered
    pub fn pending(&self) -> usize {
        lock(&self.inbox).queue.len()
    }

    /// Inspect the renderer
    ///
    /// Blocks while a drain is in progress.
    pub fn with_renderer<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&lock(&self.renderer))
    }
}

type Handler<E> = Box<dyn Fn(E) + Send + Sync>;

/// Late-bound submission handle
///
/// Timers are created before the serializer that owns them exists, so they
/// get a sink that is connected once the serializer is built.
pub struct EventSink<E> {
    target: Arc<OnceLock<Handler<E>>>,
}

impl<E> Clone for EventSink<E> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
        }
    }
}

impl<E> Default for EventSink<E> {
    fn default() -> Self {
        Self {
            target: Arc::new(OnceLock::new()),
        }
    }
}

impl<E> EventSink<E> {
    /// Create an unconnected sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect the sink to its handler
    ///
    /// Returns false if it was already connected.
    pub fn connect<F>(&self, handler: F) -> bool
    where
        F: Fn(E) + Send + Sync + 'static,
    {
        self.target.set(Box::new(handler)).is_ok()
    }

    /// Whether a handler is connected
    pub fn is_connected(&self) -> bool {
        self.target.get().is_some()
    }

    /// Hand an event to the connected handler
    pub fn submit(&self, event: E) {
        match self.target.get() {
            Some(handler) => handler(event),
            None => warn!("Event sink not connected, dropping event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    /// Records events, optionally sleeping to widen race windows
    struct Recorder {
        seen: Vec<u32>,
        delay: Duration,
        fail_on: Option<u32>,
    }

    impl Recorder {
        fn new(delay: Duration) -> Self {
            Self {
                seen: Vec::new(),
                delay,
                fail_on: None,
            }
        }
    }

    impl Render for Recorder {
        type Event = u32;
        type Error = u32;

        fn render(&mut self, event: u32) -> Result<(), u32> {
            thread::sleep(self.delay);
            if self.fail_on == Some(event) {
                self.fail_on = None;
                return Err(event);
            }
            self.seen.push(event);
            Ok(())
        }
    }

    #[test]
    fn test_single_submit_renders() {
        let serializer = EventSerializer::new(Recorder::new(Duration::ZERO));
        assert_eq!(serializer.submit(1), Ok(Submission::Rendered));
        assert!(serializer.is_idle());
        assert_eq!(serializer.with_renderer(|r| r.seen.clone()), [1]);
    }

    #[test]
    fn test_concurrent_submits_render_everything_once() {
        let serializer = Arc::new(EventSerializer::new(Recorder::new(Duration::from_millis(1))));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let serializer = Arc::clone(&serializer);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..10 {
                        serializer.submit(t * 100 + i).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(serializer.is_idle());
        assert_eq!(serializer.pending(), 0);
        let seen = serializer.with_renderer(|r| r.seen.clone());
        assert_eq!(seen.len(), 80);
        // each thread's own events keep their order
        for t in 0..8u32 {
            let own: Vec<u32> = seen.iter().copied().filter(|e| e / 100 == t).collect();
            let expected: Vec<u32> = (0..10).map(|i| t * 100 + i).collect();
            assert_eq!(own, expected);
        }
    }

    #[test]
    fn test_submits_from_other_threads_during_render_keep_order() {
        let serializer = Arc::new(EventSerializer::new(Recorder::new(Duration::from_millis(100))));

        let submit_after = |event: u32, delay: Duration| {
            let serializer = Arc::clone(&serializer);
            thread::spawn(move || {
                thread::sleep(delay);
                serializer.submit(event)
            })
        };
        let drainer = submit_after(1, Duration::ZERO);
        let second = submit_after(2, Duration::from_millis(20));
        let third = submit_after(3, Duration::from_millis(50));

        assert_eq!(second.join().unwrap(), Ok(Submission::Queued));
        assert_eq!(third.join().unwrap(), Ok(Submission::Queued));
        assert_eq!(drainer.join().unwrap(), Ok(Submission::Rendered));
        assert!(serializer.is_idle());
        assert_eq!(serializer.with_renderer(|r| r.seen.clone()), [1, 2, 3]);
    }

    #[test]
    fn test_error_keeps_queue_for_next_submission() {
        let mut recorder = Recorder::new(Duration::from_millis(30));
        recorder.fail_on = Some(2);
        let serializer = Arc::new(EventSerializer::new(recorder));

        let drainer = {
            let serializer = Arc::clone(&serializer);
            thread::spawn(move || serializer.submit(1))
        };
        thread::sleep(Duration::from_millis(10));
        serializer.submit(2).unwrap();
        serializer.submit(3).unwrap();

        assert_eq!(drainer.join().unwrap(), Err(2));
        assert!(serializer.is_idle());
        assert_eq!(serializer.pending(), 1);

        assert_eq!(serializer.submit(4), Ok(Submission::Rendered));
        assert_eq!(serializer.with_renderer(|r| r.seen.clone()), [1, 3, 4]);
    }

    #[test]
    fn test_sink_forwards_after_connect() {
        let serializer = Arc::new(EventSerializer::new(Recorder::new(Duration::ZERO)));
        let sink = EventSink::new();
        sink.submit(1);
        assert!(!sink.is_connected());

        let target = Arc::downgrade(&serializer);
        assert!(sink.connect(move |event| {
            if let Some(serializer) = target.upgrade() {
                let _ = serializer.submit(event);
            }
        }));
        assert!(!sink.connect(|_| {}));

        sink.clone().submit(2);
        assert_eq!(serializer.with_renderer(|r| r.seen.clone()), [2]);
    }
}
