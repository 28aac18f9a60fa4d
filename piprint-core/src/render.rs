//! Semantic screen handlers
//!
//! [`Renderer`] is the only owner of the [`DisplayDriver`]. It is driven by
//! the [`EventSerializer`](crate::EventSerializer), so every handler runs
//! alone and the screen state it keeps (job name, last progress, printing
//! flag) needs no further locking.

use std::sync::Arc;

use log::{debug, info};
use piprint_display::{format_progress_bar, DisplayDriver, DisplayError, COLS};
use piprint_hal::CharLcd;

use crate::event::{AnalysisEvent, Event, PrintEvent, SlicingEvent};
use crate::serializer::Render;
use crate::stats::PrintStats;
use crate::text::{format_hours_minutes, format_slicing_done, shorten_name};
use crate::timers::{Carousel, CarouselTick, CarouselView, InactivityTimeout, TimeoutReset};

/// Event-to-screen renderer
pub struct Renderer<L> {
    driver: DisplayDriver<L>,
    carousel: Arc<Carousel>,
    timeout: Arc<InactivityTimeout>,
    /// Shortened name of the job being printed
    job_name: String,
    /// Shortened name of the model being sliced
    slice_name: String,
    last_progress: Option<u8>,
    printing: bool,
}

fn hours_minutes_or_unknown(label: &str, seconds: Option<u32>) -> String {
    match seconds {
        Some(s) => format_hours_minutes(label, s.into()),
        None => format!("{}: --", label),
    }
}

impl<L: CharLcd> Renderer<L> {
    /// Create a renderer around an initialised driver
    pub fn new(
        driver: DisplayDriver<L>,
        carousel: Arc<Carousel>,
        timeout: Arc<InactivityTimeout>,
    ) -> Self {
        Self {
            driver,
            carousel,
            timeout,
            job_name: String::new(),
            slice_name: String::new(),
            last_progress: None,
            printing: false,
        }
    }

    /// Whether a print job is active
    pub fn is_printing(&self) -> bool {
        self.printing
    }

    /// Shortened name of the current job
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// Last print progress seen
    pub fn last_progress(&self) -> Option<u8> {
        self.last_progress
    }

    /// The display driver
    pub fn driver(&self) -> &DisplayDriver<L> {
        &self.driver
    }

    fn write(&mut self, text: &str, row: u8) -> Result<(), DisplayError> {
        self.driver.write(text, row, true, 0).map(|_| ())
    }

    fn write_keep(&mut self, text: &str, row: u8) -> Result<(), DisplayError> {
        self.driver.write(text, row, false, 0).map(|_| ())
    }

    fn power(&mut self, on: bool, force: bool) -> Result<(), DisplayError> {
        self.driver.enable(on, force)?;
        self.driver.set_backlight(on, force)?;
        Ok(())
    }

    /// Count activity, waking the panel if the timer had run out
    fn touch_timeout(&mut self) -> Result<(), DisplayError> {
        if self.timeout.reset() == TimeoutReset::Started {
            self.power(true, true)?;
        }
        Ok(())
    }

    fn handle(&mut self, event: Event) -> Result<(), DisplayError> {
        match event {
            Event::Startup => self.on_startup(),
            Event::Shutdown => self.on_shutdown(),
            Event::Connection { name } => self.on_connection(&name),
            Event::Failure { name, message } => self.on_failure(&name, &message),
            Event::Print(print) => self.on_print(print),
            Event::Analysis(analysis) => self.on_analysis(analysis),
            Event::Slicing(slicing) => self.on_slicing(slicing),
            Event::Progress { percent } => self.on_progress(percent),
            Event::SlicingProgress { percent } => self.on_slicing_progress(percent),
            Event::Carousel(tick) => self.on_carousel(tick),
            Event::Timeout { generation } => self.on_timeout(generation),
        }
    }

    fn on_startup(&mut self) -> Result<(), DisplayError> {
        info!("PiPrint starting");
        self.driver.clear()?;
        self.driver.load_progress_glyphs()?;
        self.power(true, true)
    }

    fn on_shutdown(&mut self) -> Result<(), DisplayError> {
        info!("PiPrint turning off LCD");
        self.carousel.stop();
        self.timeout.cancel();
        self.printing = false;
        self.driver.clear()?;
        self.driver.set_backlight(false, true)?;
        self.driver.enable(false, true)?;
        Ok(())
    }

    fn on_connection(&mut self, name: &str) -> Result<(), DisplayError> {
        self.driver.clear()?;
        if name == "Disconnected" {
            self.driver.set_backlight(false, true)?;
            self.driver.enable(false, true)?;
            return Ok(());
        }
        self.write_keep(name, 0)
    }

    fn on_failure(&mut self, name: &str, message: &str) -> Result<(), DisplayError> {
        self.driver.clear()?;
        self.write_keep(name, 0)?;
        self.write_keep(&shorten_name(message, COLS), 1)
    }

    fn on_print(&mut self, event: PrintEvent) -> Result<(), DisplayError> {
        self.write(event.name(), 0)?;

        match event {
            PrintEvent::Started { name } => {
                self.driver.load_progress_glyphs()?;
                self.job_name = shorten_name(&name, COLS);
                self.last_progress = None;
                self.carousel.start();
                self.printing = true;
                let job = self.job_name.clone();
                self.write(&job, 1)
            }
            PrintEvent::Done { time_s } => {
                self.carousel.stop();
                self.printing = false;
                let seconds = time_s.max(0.0).floor() as u64;
                self.write(&format_hours_minutes("Time", seconds), 1)
            }
            PrintEvent::Failed | PrintEvent::Cancelled => {
                self.carousel.stop();
                self.printing = false;
                Ok(())
            }
            PrintEvent::Other { .. } => Ok(()),
        }
    }

    fn on_analysis(&mut self, event: AnalysisEvent) -> Result<(), DisplayError> {
        let (title, name) = match &event {
            AnalysisEvent::Started { name } => ("Started Analysis", name),
            AnalysisEvent::Finished { name } => ("Analysis Finish", name),
            AnalysisEvent::Other { name } => {
                debug!("Ignoring analysis event {}", name);
                return Ok(());
            }
        };
        self.write(title, 0)?;
        self.write(&shorten_name(name, COLS), 1)
    }

    fn on_slicing(&mut self, event: SlicingEvent) -> Result<(), DisplayError> {
        match event {
            SlicingEvent::Done { stl, time_s } => {
                self.write(&shorten_name(&stl, COLS), 1)?;
                self.write(&format_slicing_done("SlicingDone", time_s, COLS), 0)
            }
            SlicingEvent::Started {
                stl,
                progress_available,
            } => {
                let short = shorten_name(&stl, COLS);
                self.write(&short, 1)?;
                if progress_available {
                    self.slice_name = short;
                }
                self.write("SlicingStarted", 0)
            }
            SlicingEvent::Other { name, stl } => {
                self.write(&shorten_name(&stl, COLS), 1)?;
                self.write(&name, 0)
            }
        }
    }

    fn draw_progress(&mut self, title: &str, percent: u8) -> Result<(), DisplayError> {
        self.write(title, 0)?;
        self.write(&format_progress_bar(percent), 1)
    }

    fn on_progress(&mut self, percent: u8) -> Result<(), DisplayError> {
        self.last_progress = Some(percent);
        if self.printing && self.carousel.current_view() != CarouselView::Progress {
            debug!("Progress {}% not shown, carousel is on another view", percent);
            return Ok(());
        }
        let job = self.job_name.clone();
        self.draw_progress(&job, percent)
    }

    fn on_slicing_progress(&mut self, percent: u8) -> Result<(), DisplayError> {
        let slice = self.slice_name.clone();
        self.draw_progress(&slice, percent)
    }

    fn on_carousel(&mut self, tick: CarouselTick) -> Result<(), DisplayError> {
        if !self.printing || !self.carousel.is_current(tick.generation) {
            debug!("Dropping stale carousel tick (gen {})", tick.generation);
            return Ok(());
        }
        let PrintStats {
            print_time,
            print_time_left,
        } = tick.stats;
        let job = self.job_name.clone();
        match tick.view {
            CarouselView::Progress => match self.last_progress {
                Some(percent) => self.draw_progress(&job, percent),
                None => {
                    // no progress yet, blank the previous time view
                    self.write(&job, 0)?;
                    self.write("", 1)
                }
            },
            CarouselView::TimeLeft => {
                self.write(&job, 0)?;
                self.write(&hours_minutes_or_unknown("Left", print_time_left), 1)
            }
            CarouselView::Elapsed => {
                self.write(&job, 0)?;
                self.write(&hours_minutes_or_unknown("Time", print_time), 1)
            }
        }
    }

    fn on_timeout(&mut self, generation: u64) -> Result<(), DisplayError> {
        if !self.timeout.is_expiry(generation) {
            debug!("Ignoring stale timeout (gen {})", generation);
            return Ok(());
        }
        self.driver.clear()?;
        self.driver.enable(false, false)?;
        self.driver.set_backlight(false, false)?;
        self.timeout.acknowledge(generation);
        Ok(())
    }
}

impl<L: CharLcd> Render for Renderer<L> {
    type Event = Event;
    type Error = DisplayError;

    fn render(&mut self, event: Event) -> Result<(), DisplayError> {
        debug!("Rendering {}", event.name());

        if !self.printing && event.resets_timeout() {
            self.touch_timeout()?;
        }

        let ends_print = matches!(&event, Event::Print(print) if print.ends_print());
        self.handle(event)?;

        if self.printing {
            self.timeout.cancel();
        } else if ends_print {
            self.touch_timeout()?;
        }
        Ok(())
    }
}
