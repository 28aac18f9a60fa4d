//! Screen logic for the PiPrint status LCD
//!
//! This crate turns print-server callbacks into display updates:
//!
//! - Typed events and payload validation (`event`)
//! - File-name shortening and time formatting (`text`)
//! - Shared printer statistics (`stats`)
//! - The single-flight event serializer (`serializer`)
//! - Semantic screen handlers (`render`)
//! - Carousel and inactivity timers (`timers`)
//! - The inbound facade used by the host (`service`)
//!
//! # Concurrency
//!
//! Host callbacks and timer threads may call in concurrently. Every display
//! update goes through one [`EventSerializer`]; whoever finds it idle renders
//! its own event and then drains whatever queued up meanwhile, while
//! everybody else only enqueues. The display itself is never locked
//! separately.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod event;
pub mod render;
pub mod serializer;
pub mod service;
pub mod stats;
pub mod text;
pub mod timers;

// Re-export key types
pub use config::{ConfigError, LcdConfig};
pub use error::Error;
pub use event::{
    AnalysisEvent, Event, Payload, PayloadError, PendingEvent, PrintEvent, SlicingEvent, Value,
};
pub use render::Renderer;
pub use serializer::{EventSerializer, EventSink, Render, Submission};
pub use service::LcdService;
pub use stats::{PrintStats, PrinterStatusSource, SharedPrintStats, StatusCallback};
pub use timers::{
    Carousel, CarouselTick, CarouselView, InactivityTimeout, TimeoutReset, Timer, TimerState,
};
