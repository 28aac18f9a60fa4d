//! Simulated character LCD
//!
//! An in-memory HD44780 model for host-side tests. The handle is cheap to
//! clone, so a test can keep one copy as a probe while the driver owns the
//! other.

use std::string::String;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use crate::lcd::{CharLcd, HalError, CUSTOM_GLYPH_SLOTS, LCD_COLS, LCD_ROWS};

/// Counters of hardware transactions issued against the panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounts {
    /// `set_cursor` calls
    pub cursor_moves: usize,
    /// `write_char` calls
    pub char_writes: usize,
    /// `set_backlight` calls
    pub backlight_calls: usize,
    /// `enable_display` calls
    pub enable_calls: usize,
    /// `clear` calls
    pub clears: usize,
    /// `create_char` calls
    pub glyph_loads: usize,
}

#[derive(Debug)]
struct Panel {
    ddram: [[u8; LCD_COLS]; LCD_ROWS],
    cursor: (usize, usize),
    backlight: f32,
    enabled: bool,
    glyphs: [Option<[u8; 8]>; CUSTOM_GLYPH_SLOTS as usize],
    counts: OpCounts,
    /// Remaining successful calls before every call fails
    fail_after: Option<usize>,
}

impl Panel {
    fn new() -> Self {
        Self {
            ddram: [[b' '; LCD_COLS]; LCD_ROWS],
            cursor: (0, 0),
            backlight: 0.0,
            enabled: false,
            glyphs: [None; CUSTOM_GLYPH_SLOTS as usize],
            counts: OpCounts::default(),
            fail_after: None,
        }
    }

    fn transact(&mut self) -> Result<(), HalError> {
        match self.fail_after {
            Some(0) => {
                warn!("SimLcd: injected I/O fault");
                Err(HalError::Io)
            }
            Some(n) => {
                self.fail_after = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Shared handle onto a simulated 16x2 panel
#[derive(Debug, Clone)]
pub struct SimLcd {
    panel: Arc<Mutex<Panel>>,
}

impl Default for SimLcd {
    fn default() -> Self {
        Self::new()
    }
}

impl SimLcd {
    /// Create a blank, disabled panel with the backlight off
    pub fn new() -> Self {
        Self {
            panel: Arc::new(Mutex::new(Panel::new())),
        }
    }

    fn panel(&self) -> MutexGuard<'_, Panel> {
        self.panel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Text currently shown on `row`, one `char` per character code
    ///
    /// Custom glyph codes come back as `'\x00'..='\x07'`.
    pub fn text(&self, row: usize) -> String {
        let panel = self.panel();
        panel
            .ddram
            .get(row)
            .map(|cells| cells.iter().map(|&b| b as char).collect())
            .unwrap_or_default()
    }

    /// Current backlight level
    pub fn backlight(&self) -> f32 {
        self.panel().backlight
    }

    /// Whether the backlight is on
    pub fn is_backlit(&self) -> bool {
        self.panel().backlight > 0.0
    }

    /// Whether the display circuit is enabled
    pub fn is_enabled(&self) -> bool {
        self.panel().enabled
    }

    /// Pattern loaded into a glyph slot
    pub fn glyph(&self, slot: u8) -> Option<[u8; 8]> {
        self.panel().glyphs.get(slot as usize).copied().flatten()
    }

    /// Current cursor position as (col, row)
    pub fn cursor(&self) -> (usize, usize) {
        self.panel().cursor
    }

    /// Snapshot of the transaction counters
    pub fn counts(&self) -> OpCounts {
        self.panel().counts
    }

    /// Reset the transaction counters to zero
    pub fn reset_counts(&self) {
        self.panel().counts = OpCounts::default();
    }

    /// Let `calls` more hardware calls succeed, then fail every call
    pub fn fail_after(&self, calls: usize) {
        debug!("SimLcd: failing after {} more calls", calls);
        self.panel().fail_after = Some(calls);
    }

    /// Stop injecting failures
    pub fn recover(&self) {
        debug!("SimLcd: fault injection cleared");
        self.panel().fail_after = None;
    }
}

impl CharLcd for SimLcd {
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), HalError> {
        let mut panel = self.panel();
        panel.transact()?;
        if row as usize >= LCD_ROWS {
            return Err(HalError::InvalidArgument);
        }
        panel.counts.cursor_moves += 1;
        panel.cursor = (col as usize, row as usize);
        Ok(())
    }

    fn write_char(&mut self, byte: u8) -> Result<(), HalError> {
        let mut panel = self.panel();
        panel.transact()?;
        panel.counts.char_writes += 1;
        let (col, row) = panel.cursor;
        // DDRAM beyond the visible window is not modelled
        if col < LCD_COLS {
            panel.ddram[row][col] = byte;
        }
        panel.cursor = (col + 1, row);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), HalError> {
        let mut panel = self.panel();
        panel.transact()?;
        panel.counts.clears += 1;
        panel.ddram = [[b' '; LCD_COLS]; LCD_ROWS];
        panel.cursor = (0, 0);
        Ok(())
    }

    fn home(&mut self) -> Result<(), HalError> {
        let mut panel = self.panel();
        panel.transact()?;
        panel.cursor = (0, 0);
        Ok(())
    }

    fn set_backlight(&mut self, level: f32) -> Result<(), HalError> {
        let mut panel = self.panel();
        panel.transact()?;
        panel.counts.backlight_calls += 1;
        panel.backlight = level;
        Ok(())
    }

    fn enable_display(&mut self, on: bool) -> Result<(), HalError> {
        let mut panel = self.panel();
        panel.transact()?;
        panel.counts.enable_calls += 1;
        panel.enabled = on;
        Ok(())
    }

    fn create_char(&mut self, slot: u8, pattern: [u8; 8]) -> Result<(), HalError> {
        let mut panel = self.panel();
        panel.transact()?;
        let glyph = panel
            .glyphs
            .get_mut(slot as usize)
            .ok_or(HalError::InvalidArgument)?;
        *glyph = Some(pattern);
        panel.counts.glyph_loads += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(text: &str) -> String {
        format!("{:<16}", text)
    }

    #[test]
    fn test_write() {
        let mut lcd = SimLcd::new();
        lcd.write_char(b'A').unwrap();
        assert_eq!(lcd.text(0), padded("A"));
        assert_eq!(lcd.cursor(), (1, 0));
    }

    #[test]
    fn test_message() {
        let mut lcd = SimLcd::new();
        lcd.message("Hello World!").unwrap();
        assert_eq!(lcd.text(0), padded("Hello World!"));
    }

    #[test]
    fn test_cursor() {
        let mut lcd = SimLcd::new();
        lcd.set_cursor(15, 0).unwrap();
        lcd.write_char(b'B').unwrap();
        assert_eq!(lcd.text(0), padded("               B"));
    }

    #[test]
    fn test_newline() {
        let mut lcd = SimLcd::new();
        lcd.message("1234567890123456\nHello World").unwrap();
        assert_eq!(lcd.text(0), "1234567890123456");
        assert_eq!(lcd.text(1), padded("Hello World"));
    }

    #[test]
    fn test_backlight() {
        let mut lcd = SimLcd::new();
        lcd.set_backlight(1.0).unwrap();
        assert!(lcd.is_backlit());
        lcd.set_backlight(0.0).unwrap();
        assert!(!lcd.is_backlit());
        assert_eq!(lcd.counts().backlight_calls, 2);
    }

    #[test]
    fn test_write_past_edge_is_dropped() {
        let mut lcd = SimLcd::new();
        lcd.set_cursor(15, 1).unwrap();
        lcd.write_char(b'x').unwrap();
        lcd.write_char(b'y').unwrap();
        assert_eq!(lcd.text(1), padded("               x"));
        assert_eq!(lcd.text(0), padded(""));
    }

    #[test]
    fn test_glyph_slots() {
        let mut lcd = SimLcd::new();
        lcd.create_char(3, [1; 8]).unwrap();
        assert_eq!(lcd.glyph(3), Some([1; 8]));
        assert_eq!(lcd.create_char(8, [0; 8]), Err(HalError::InvalidArgument));
    }

    #[test]
    fn test_fault_injection() {
        let mut lcd = SimLcd::new();
        lcd.fail_after(1);
        assert!(lcd.clear().is_ok());
        assert_eq!(lcd.write_char(b'a'), Err(HalError::Io));
        assert_eq!(lcd.set_backlight(1.0), Err(HalError::Io));
        assert_eq!(lcd.counts().char_writes, 0);
        assert!(!lcd.is_backlit());
        lcd.recover();
        assert!(lcd.write_char(b'a').is_ok());
    }

    #[test]
    fn test_probe_shares_panel() {
        let probe = SimLcd::new();
        let mut lcd = probe.clone();
        lcd.enable_display(true).unwrap();
        assert!(probe.is_enabled());
    }
}
