//! PiPrint Hardware Abstraction Layer
//!
//! This crate defines the character-LCD trait that the display layer drives.
//! A concrete implementation talks to an HD44780-compatible controller over
//! whatever transport the board uses (GPIO expander, I2C backpack, ...).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  piprint-core (events, timers, render)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  piprint-display (buffer, diff, power)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  piprint-hal (this crate - CharLcd)     │
//! └─────────────────────────────────────────┘
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ board shim    │       │ SimLcd (std)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Features
//!
//! - `std`: enables [`sim::SimLcd`], an in-memory panel used by tests
//! - `defmt`: derives `defmt::Format` on the error type

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

pub mod lcd;
#[cfg(feature = "std")]
pub mod sim;

pub use lcd::{CharLcd, HalError, LCD_COLS, LCD_ROWS, CUSTOM_GLYPH_SLOTS};
#[cfg(feature = "std")]
pub use sim::SimLcd;
