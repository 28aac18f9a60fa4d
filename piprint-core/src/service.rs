//! Inbound facade used by the print server
//!
//! [`LcdService`] owns the serializer and wires the timers back into it.
//! Every host callback is validated here and then submitted, so the caller
//! learns about malformed payloads and display failures directly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, trace, warn};
use piprint_display::DisplayDriver;
use piprint_hal::CharLcd;

use crate::config::LcdConfig;
use crate::error::Error;
use crate::event::{Event, Payload, PendingEvent};
use crate::render::Renderer;
use crate::serializer::{EventSerializer, EventSink, Submission};
use crate::stats::{PrinterStatusSource, SharedPrintStats};
use crate::timers::{Carousel, InactivityTimeout};

/// Progress values that are never shown
fn is_boundary(percent: u8) -> bool {
    percent == 0 || percent == 100
}

/// Status LCD service
pub struct LcdService<L: CharLcd + Send + 'static> {
    serializer: Arc<EventSerializer<Renderer<L>>>,
    stats: SharedPrintStats,
    status_registered: AtomicBool,
}

impl<L: CharLcd + Send + 'static> LcdService<L> {
    /// Bring up the panel and the timers
    ///
    /// The panel shows the configured splash until [`start`](Self::start).
    pub fn new(lcd: L, config: &LcdConfig) -> Result<Self, Error> {
        config.validate()?;

        let driver = DisplayDriver::new(lcd, &config.splash)?;
        let stats = SharedPrintStats::new();
        let sink = EventSink::new();

        let carousel = Carousel::new(config.carousel_interval(), stats.clone(), sink.clone())?;
        let timeout = InactivityTimeout::new(config.timeout(), sink.clone())?;
        let serializer = Arc::new(EventSerializer::new(Renderer::new(
            driver,
            Arc::new(carousel),
            Arc::new(timeout),
        )));

        let target = Arc::downgrade(&serializer);
        sink.connect(move |event: Event| {
            let Some(serializer) = target.upgrade() else {
                return;
            };
            let name = event.name().to_string();
            if let Err(e) = serializer.submit(event) {
                error!("Failed to render {}: {:?}", name, e);
            }
        });

        Ok(Self {
            serializer,
            stats,
            status_registered: AtomicBool::new(false),
        })
    }

    fn submit(&self, event: Event) -> Result<Submission, Error> {
        Ok(self.serializer.submit(event)?)
    }

    /// Plugin startup: clear the splash and power the panel
    pub fn start(&self) -> Result<Submission, Error> {
        self.submit(Event::Startup)
    }

    /// Host shutdown: stop the timers and power the panel off
    pub fn shutdown(&self) -> Result<Submission, Error> {
        self.submit(Event::Shutdown)
    }

    /// Host lifecycle event
    ///
    /// Returns `Ok(None)` for events the display ignores.
    pub fn on_event(&self, name: &str, payload: Payload) -> Result<Option<Submission>, Error> {
        let pending = PendingEvent::new(name, payload);
        match Event::from_pending(&pending)? {
            Some(event) => self.submit(event).map(Some),
            None => {
                trace!("Ignoring event {}", name);
                Ok(None)
            }
        }
    }

    /// Print progress callback
    ///
    /// 0 % and 100 % are not shown; the start and end of a job have their
    /// own events.
    pub fn on_print_progress(
        &self,
        storage: &str,
        path: &str,
        percent: u8,
    ) -> Result<Option<Submission>, Error> {
        if is_boundary(percent) {
            return Ok(None);
        }
        trace!("Progress {}% for {}:{}", percent, storage, path);
        self.submit(Event::Progress { percent }).map(Some)
    }

    /// Slicing progress callback
    pub fn on_slicing_progress(
        &self,
        slicer: &str,
        source_location: &str,
        source_path: &str,
        destination_location: &str,
        destination_path: &str,
        percent: u8,
    ) -> Result<Option<Submission>, Error> {
        if is_boundary(percent) {
            return Ok(None);
        }
        trace!(
            "{} slicing {}% {}:{} -> {}:{}",
            slicer,
            percent,
            source_location,
            source_path,
            destination_location,
            destination_path
        );
        self.submit(Event::SlicingProgress { percent }).map(Some)
    }

    /// Subscribe to printer status updates
    ///
    /// Only the first registration takes effect.
    pub fn register_status_source(&self, source: &dyn PrinterStatusSource) -> bool {
        if self.status_registered.swap(true, Ordering::SeqCst) {
            warn!("Printer status callback already registered");
            return false;
        }
        let stats = self.stats.clone();
        source.register_callback(Box::new(move |update| stats.update(update)));
        debug!("Registered printer status callback");
        true
    }

    /// Shared printer statistics
    pub fn stats(&self) -> SharedPrintStats {
        self.stats.clone()
    }

    /// Inspect the renderer
    pub fn with_renderer<T>(&self, f: impl FnOnce(&Renderer<L>) -> T) -> T {
        self.serializer.with_renderer(f)
    }

    /// Whether no event is being rendered
    pub fn is_idle(&self) -> bool {
        self.serializer.is_idle()
    }
}
