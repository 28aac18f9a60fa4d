//! Events rendered by the display
//!
//! Host events arrive as a name plus a loosely-typed payload
//! ([`PendingEvent`]). They are classified by name and validated into a
//! typed [`Event`] before reaching the serializer, so a malformed payload is
//! reported to the caller instead of failing inside a screen handler.

pub mod payload;

pub use payload::{Payload, PayloadError, PendingEvent, Value};

use crate::timers::CarouselTick;

/// Event names that match a marker but carry nothing worth showing
const EXCLUDED_EVENTS: [&str; 2] = ["ConnectivityChanged", "PrinterStateChanged"];

/// Print lifecycle events
#[derive(Debug, Clone, PartialEq)]
pub enum PrintEvent {
    /// A print job started
    Started {
        /// File name of the job
        name: String,
    },
    /// The job finished
    Done {
        /// Total print time in seconds
        time_s: f64,
    },
    /// The job failed
    Failed,
    /// The job was cancelled
    Cancelled,
    /// Any other print event (paused, resumed, ...)
    Other {
        /// Event name
        name: String,
    },
}

impl PrintEvent {
    /// Event name as reported by the host
    pub fn name(&self) -> &str {
        match self {
            PrintEvent::Started { .. } => "PrintStarted",
            PrintEvent::Done { .. } => "PrintDone",
            PrintEvent::Failed => "PrintFailed",
            PrintEvent::Cancelled => "PrintCancelled",
            PrintEvent::Other { name } => name,
        }
    }

    /// Whether the event ends the active print
    pub fn ends_print(&self) -> bool {
        matches!(
            self,
            PrintEvent::Done { .. } | PrintEvent::Failed | PrintEvent::Cancelled
        )
    }
}

/// Metadata analysis events
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    /// Analysis of a file started
    Started {
        /// File being analysed
        name: String,
    },
    /// Analysis of a file finished
    Finished {
        /// File that was analysed
        name: String,
    },
    /// Any other analysis event
    Other {
        /// Event name
        name: String,
    },
}

/// Slicer events
#[derive(Debug, Clone, PartialEq)]
pub enum SlicingEvent {
    /// Slicing started
    Started {
        /// Model being sliced
        stl: String,
        /// Whether progress callbacks will follow
        progress_available: bool,
    },
    /// Slicing finished
    Done {
        /// Model that was sliced
        stl: String,
        /// Slicing time in seconds
        time_s: f64,
    },
    /// Any other slicing event (cancelled, failed, ...)
    Other {
        /// Event name
        name: String,
        /// Model being sliced
        stl: String,
    },
}

/// Typed display event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Plugin started: prepare the panel
    Startup,
    /// Host shutting down: switch the panel off
    Shutdown,
    /// Printer connection changed (`Connected`, `Disconnected`, ...)
    Connection {
        /// Event name
        name: String,
    },
    /// Host reported an error
    Failure {
        /// Event name
        name: String,
        /// Error message
        message: String,
    },
    /// Print lifecycle
    Print(PrintEvent),
    /// Metadata analysis
    Analysis(AnalysisEvent),
    /// Slicer lifecycle
    Slicing(SlicingEvent),
    /// Print progress (1-99)
    Progress {
        /// Percent complete
        percent: u8,
    },
    /// Slicing progress (1-99)
    SlicingProgress {
        /// Percent complete
        percent: u8,
    },
    /// Carousel rotated to a new view
    Carousel(CarouselTick),
    /// Inactivity timer expired
    Timeout {
        /// Arming generation of the timer that fired
        generation: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Connection,
    Failure,
    Print,
    Analysis,
    Slicing,
}

fn categorize(name: &str) -> Option<Category> {
    if EXCLUDED_EVENTS.contains(&name) || name.contains("Profile") {
        return None;
    }
    if name.contains("onnect") {
        Some(Category::Connection)
    } else if name.contains("Error") {
        Some(Category::Failure)
    } else if name.contains("Print") {
        Some(Category::Print)
    } else if name.contains("Anal") {
        Some(Category::Analysis)
    } else if name.contains("Slicing") {
        Some(Category::Slicing)
    } else {
        None
    }
}

impl Event {
    /// Validate a host event
    ///
    /// Returns `Ok(None)` for events the display does not care about.
    pub fn from_pending(pending: &PendingEvent) -> Result<Option<Self>, PayloadError> {
        let name = pending.name.as_str();
        let payload = &pending.payload;

        let Some(category) = categorize(name) else {
            return Ok(None);
        };

        let event = match category {
            Category::Connection => Event::Connection {
                name: name.to_string(),
            },
            Category::Failure => Event::Failure {
                name: name.to_string(),
                message: payload.str_field(name, "error")?.to_string(),
            },
            Category::Print => Event::Print(match name {
                "PrintStarted" => PrintEvent::Started {
                    name: payload.str_field(name, "name")?.to_string(),
                },
                "PrintDone" => PrintEvent::Done {
                    time_s: payload.number_field(name, "time")?,
                },
                "PrintFailed" => PrintEvent::Failed,
                "PrintCancelled" => PrintEvent::Cancelled,
                _ => PrintEvent::Other {
                    name: name.to_string(),
                },
            }),
            Category::Analysis => Event::Analysis(match name {
                "MetadataAnalysisStarted" => AnalysisEvent::Started {
                    name: payload.str_field(name, "name")?.to_string(),
                },
                "MetadataAnalysisFinished" => AnalysisEvent::Finished {
                    name: payload.str_field(name, "name")?.to_string(),
                },
                _ => AnalysisEvent::Other {
                    name: name.to_string(),
                },
            }),
            Category::Slicing => {
                let stl = payload.str_field(name, "stl")?.to_string();
                Event::Slicing(match name {
                    "SlicingStarted" => SlicingEvent::Started {
                        stl,
                        progress_available: payload.bool_field(name, "progressAvailable")?,
                    },
                    "SlicingDone" => SlicingEvent::Done {
                        stl,
                        time_s: payload.number_field(name, "time")?,
                    },
                    _ => SlicingEvent::Other {
                        name: name.to_string(),
                        stl,
                    },
                })
            }
        };
        Ok(Some(event))
    }

    /// Short name for logging
    pub fn name(&self) -> &str {
        match self {
            Event::Startup => "Startup",
            Event::Shutdown => "Shutdown",
            Event::Connection { name } | Event::Failure { name, .. } => name,
            Event::Print(e) => e.name(),
            Event::Analysis(AnalysisEvent::Started { .. }) => "MetadataAnalysisStarted",
            Event::Analysis(AnalysisEvent::Finished { .. }) => "MetadataAnalysisFinished",
            Event::Analysis(AnalysisEvent::Other { name }) => name,
            Event::Slicing(SlicingEvent::Started { .. }) => "SlicingStarted",
            Event::Slicing(SlicingEvent::Done { .. }) => "SlicingDone",
            Event::Slicing(SlicingEvent::Other { name, .. }) => name,
            Event::Progress { .. } => "self_progress",
            Event::SlicingProgress { .. } => "self_slicing_progress",
            Event::Carousel(tick) => tick.view.event_name(),
            Event::Timeout { .. } => "self_timeout",
        }
    }

    /// Whether this event counts as activity for the inactivity timeout
    ///
    /// Everything coming from the host does; the display's own timer
    /// events do not.
    pub fn resets_timeout(&self) -> bool {
        !matches!(
            self,
            Event::Shutdown | Event::Carousel(_) | Event::Timeout { .. }
        )
    }
}
