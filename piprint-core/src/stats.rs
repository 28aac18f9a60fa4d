//! Printer statistics shared between the status callback and the carousel

use std::sync::{Arc, Mutex, PoisonError};

/// Latest print timing reported by the printer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintStats {
    /// Seconds elapsed in the current job
    pub print_time: Option<u32>,
    /// Estimated seconds remaining
    pub print_time_left: Option<u32>,
}

/// Lock-protected [`PrintStats`] cell
///
/// Written from the printer-status callback, read by the carousel when it
/// builds a tick. Readers always get a consistent copy.
#[derive(Debug, Clone, Default)]
pub struct SharedPrintStats(Arc<Mutex<PrintStats>>);

impl SharedPrintStats {
    /// Create an empty cell
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored statistics
    pub fn update(&self, stats: PrintStats) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = stats;
    }

    /// Copy of the stored statistics
    pub fn snapshot(&self) -> PrintStats {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Callback invoked with every printer status update
pub type StatusCallback = Box<dyn Fn(PrintStats) + Send + Sync>;

/// Source of printer status updates
///
/// The print server implements this to deliver timing data; it is
/// registered once at service construction.
pub trait PrinterStatusSource {
    /// Register the callback that receives every status update
    fn register_callback(&self, callback: StatusCallback);
}
