//! Character LCD abstraction
//!
//! Mirrors the primitive operations of an HD44780-style controller as
//! exposed by common character-LCD plate libraries.

/// Number of character columns on the panel
pub const LCD_COLS: usize = 16;

/// Number of character rows on the panel
pub const LCD_ROWS: usize = 2;

/// Number of programmable CGRAM glyph slots
pub const CUSTOM_GLYPH_SLOTS: u8 = 8;

/// Errors reported by a character LCD transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// Bus or pin I/O failed
    Io,
    /// Panel is not responding (unplugged or unpowered)
    Disconnected,
    /// Argument out of range for the controller
    InvalidArgument,
}

/// Character LCD controller
///
/// Every method maps to one hardware transaction. Implementations must not
/// retry internally; failures are reported to the caller.
pub trait CharLcd {
    /// Move the cursor to `col`, `row` (both 0-based)
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), HalError>;

    /// Write one character code at the cursor
    ///
    /// The controller advances the cursor by one column after the write.
    fn write_char(&mut self, byte: u8) -> Result<(), HalError>;

    /// Clear the panel and return the cursor home
    fn clear(&mut self) -> Result<(), HalError>;

    /// Return the cursor to column 0, row 0
    fn home(&mut self) -> Result<(), HalError>;

    /// Set backlight intensity (`0.0` off, `1.0` on)
    fn set_backlight(&mut self, level: f32) -> Result<(), HalError>;

    /// Switch the display circuit on or off
    fn enable_display(&mut self, on: bool) -> Result<(), HalError>;

    /// Program a 5x8 glyph into CGRAM
    ///
    /// - `slot`: glyph slot (0-7); the glyph is then printed with
    ///   character code `slot`
    /// - `pattern`: one byte per pixel row, low five bits used
    fn create_char(&mut self, slot: u8, pattern: [u8; 8]) -> Result<(), HalError>;

    /// Write a multi-line message starting at the cursor
    ///
    /// A `'\n'` moves to column 0 of the next row.
    fn message(&mut self, text: &str) -> Result<(), HalError> {
        let mut row = 0u8;
        for ch in text.chars() {
            if ch == '\n' {
                row = row.saturating_add(1);
                self.set_cursor(0, row)?;
            } else {
                self.write_char(if ch.is_ascii() { ch as u8 } else { b'?' })?;
            }
        }
        Ok(())
    }
}
