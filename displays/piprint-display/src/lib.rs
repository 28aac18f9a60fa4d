//! Character LCD rendering for PiPrint
//!
//! This crate provides:
//! - `DisplayBuffer`: the last-known contents of the two panel rows and the
//!   per-cell diff against a desired row
//! - `DisplayDriver`: applies writes to a `CharLcd`, touching only the cells
//!   that changed
//! - `PowerController`: backlight / enable state with conditional writes
//! - Progress-bar glyphs and formatting
//!
//! # Architecture
//!
//! The driver owns both the hardware handle and the buffer. Callers are
//! expected to serialize access (see `piprint-core`); nothing in this crate
//! locks.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod driver;
pub mod glyph;
pub mod power;

// Re-export key types
pub use buffer::{compute_diff, DisplayBuffer, RowPlan, Row, COLS, ROWS};
pub use driver::{DisplayDriver, DisplayError, WriteStats};
pub use glyph::{format_progress_bar, Printable, ProgressBar, PROGRESS_GLYPHS};
pub use power::{PowerController, PowerState};
