//! Error type for the core crate

use std::fmt;
use std::io;

use piprint_display::DisplayError;

use crate::config::ConfigError;
use crate::event::PayloadError;

/// Errors surfaced by the LCD service
#[derive(Debug)]
pub enum Error {
    /// Display or hardware failure
    Display(DisplayError),
    /// Malformed event payload
    Payload(PayloadError),
    /// Invalid configuration
    Config(ConfigError),
    /// A timer worker thread could not be spawned
    Timer(io::ErrorKind),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Display(e) => write!(f, "display error: {:?}", e),
            Error::Payload(e) => write!(f, "bad payload: {}", e),
            Error::Config(e) => write!(f, "{}", e),
            Error::Timer(kind) => write!(f, "failed to start timer: {}", kind),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Payload(e) => Some(e),
            Error::Config(e) => Some(e),
            Error::Display(_) | Error::Timer(_) => None,
        }
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Error::Display(e)
    }
}

impl From<PayloadError> for Error {
    fn from(e: PayloadError) -> Self {
        Error::Payload(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Timer(e.kind())
    }
}
