//! Display driver
//!
//! Wraps a [`CharLcd`] together with the [`DisplayBuffer`] describing what it
//! shows and the [`PowerController`] tracking its power state. Writes are
//! diffed against the buffer so only changed cells reach the hardware.

use log::{debug, info, trace};
use piprint_hal::{CharLcd, HalError, CUSTOM_GLYPH_SLOTS};

use crate::buffer::{DisplayBuffer, Row, RowPlan, ROWS};
use crate::glyph::{Printable, PROGRESS_GLYPHS};
use crate::power::{PowerController, PowerState};

/// Display driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Hardware call failed
    Hal(HalError),
    /// Row index outside the panel
    InvalidRow(u8),
    /// Glyph slot outside CGRAM
    InvalidGlyphSlot(u8),
}

impl From<HalError> for DisplayError {
    fn from(e: HalError) -> Self {
        DisplayError::Hal(e)
    }
}

/// Hardware traffic caused by a single write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriteStats {
    /// Cursor positioning commands issued
    pub cursor_moves: usize,
    /// Characters written
    pub char_writes: usize,
}

/// Character code sent to the controller for `ch`
fn char_code(ch: char) -> u8 {
    if ch.is_ascii() {
        ch as u8
    } else {
        b'?'
    }
}

/// Diffing driver for a 16x2 character LCD
pub struct DisplayDriver<L> {
    lcd: L,
    buffer: DisplayBuffer,
    power: PowerController,
}

impl<L: CharLcd> DisplayDriver<L> {
    /// Take ownership of the panel and show a cold-start splash
    ///
    /// The display is enabled, cleared and `splash` is written with the
    /// controller's own line handling. The buffer is seeded with the splash
    /// lines so later writes diff against what is really shown.
    pub fn new(mut lcd: L, splash: &str) -> Result<Self, DisplayError> {
        lcd.enable_display(true)?;
        lcd.clear()?;
        lcd.home()?;
        lcd.message(splash)?;

        let mut buffer = DisplayBuffer::new();
        for (row, line) in splash.split('\n').take(ROWS).enumerate() {
            if let Some(plan) = buffer.plan(row, line, true, 0) {
                buffer.commit(&plan);
            }
        }

        Ok(Self {
            lcd,
            buffer,
            power: PowerController::new(PowerState {
                enabled: true,
                backlit: false,
            }),
        })
    }

    /// Write `message` to `row`, starting at `column`
    ///
    /// Turns the panel and backlight on if needed. With `clear`, the rest of
    /// the row after the message is blanked.
    pub fn write(
        &mut self,
        message: &str,
        row: u8,
        clear: bool,
        column: u8,
    ) -> Result<WriteStats, DisplayError> {
        let plan = self
            .buffer
            .plan(row as usize, message, clear, column as usize)
            .ok_or(DisplayError::InvalidRow(row))?;

        info!("Writing to LCD: {}", Printable(message.chars()));

        self.enable(true, false)?;
        self.set_backlight(true, false)?;

        let stats = self.apply(&plan)?;

        debug!(
            "LCD now displays: '{}' / '{}'",
            Printable(self.buffer.row(0).into_iter().flatten().copied()),
            Printable(self.buffer.row(1).into_iter().flatten().copied()),
        );
        Ok(stats)
    }

    /// Push the changed cells of `plan` to the hardware
    ///
    /// The cursor auto-advances after each write, so it is only moved when
    /// the next changed cell is not adjacent to the previous one. Each cell
    /// is recorded in the buffer as soon as it reaches the panel, so a
    /// failure part way through leaves the buffer matching the hardware.
    fn apply(&mut self, plan: &RowPlan) -> Result<WriteStats, DisplayError> {
        let mut stats = WriteStats::default();
        let mut next_col: Option<usize> = None;

        for &col in &plan.diff {
            if next_col != Some(col) {
                self.lcd.set_cursor(col as u8, plan.row as u8)?;
                stats.cursor_moves += 1;
            }
            let ch = plan.target[col];
            self.lcd.write_char(char_code(ch))?;
            self.buffer.set_cell(plan.row, col, ch);
            stats.char_writes += 1;
            trace!("  {}", Printable(core::iter::once(ch)));
            next_col = Some(col + 1);
        }
        Ok(stats)
    }

    /// Clear the panel and the buffer
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.lcd.clear()?;
        self.buffer.clear();
        Ok(())
    }

    /// Program a 5x8 glyph into a CGRAM slot
    pub fn load_custom_glyph(&mut self, slot: u8, bitmap: [u8; 8]) -> Result<(), DisplayError> {
        if slot >= CUSTOM_GLYPH_SLOTS {
            return Err(DisplayError::InvalidGlyphSlot(slot));
        }
        self.lcd.create_char(slot, bitmap)?;
        Ok(())
    }

    /// Load the four partial-fill progress glyphs
    pub fn load_progress_glyphs(&mut self) -> Result<(), DisplayError> {
        for (slot, bitmap) in PROGRESS_GLYPHS {
            self.load_custom_glyph(slot, bitmap)?;
        }
        debug!("Loaded progress bar glyphs");
        Ok(())
    }

    /// Switch the display circuit on or off
    pub fn enable(&mut self, on: bool, force: bool) -> Result<bool, DisplayError> {
        Ok(self.power.enable(&mut self.lcd, on, force)?)
    }

    /// Switch the backlight on or off
    pub fn set_backlight(&mut self, on: bool, force: bool) -> Result<bool, DisplayError> {
        Ok(self.power.set_backlight(&mut self.lcd, on, force)?)
    }

    /// Current power state
    pub fn power(&self) -> PowerState {
        self.power.state()
    }

    /// Contents of a row as last written
    pub fn row(&self, row: usize) -> Option<&Row> {
        self.buffer.row(row)
    }

    /// The logical display buffer
    pub fn buffer(&self) -> &DisplayBuffer {
        &self.buffer
    }

    /// The underlying panel
    pub fn lcd(&self) -> &L {
        &self.lcd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use piprint_hal::SimLcd;

    fn driver() -> (DisplayDriver<SimLcd>, SimLcd) {
        let probe = SimLcd::new();
        let driver = DisplayDriver::new(probe.clone(), "").unwrap();
        probe.reset_counts();
        (driver, probe)
    }

    fn padded(text: &str) -> String {
        format!("{:<16}", text)
    }

    fn row_text(driver: &DisplayDriver<SimLcd>, row: usize) -> String {
        driver.row(row).unwrap().iter().collect()
    }

    #[test]
    fn test_splash_seeds_buffer() {
        let probe = SimLcd::new();
        let driver = DisplayDriver::new(probe.clone(), "Hold on, I'm\nstill waking up").unwrap();
        assert_eq!(probe.text(0), padded("Hold on, I'm"));
        assert_eq!(probe.text(1), padded("still waking up"));
        assert_eq!(row_text(&driver, 0), probe.text(0));
        assert_eq!(row_text(&driver, 1), probe.text(1));
        assert!(probe.is_enabled());
    }

    #[test]
    fn test_basic_write() {
        let (mut driver, probe) = driver();
        driver.write("Hello World!", 0, false, 0).unwrap();
        assert_eq!(row_text(&driver, 0), padded("Hello World!"));
        assert_eq!(probe.text(0), padded("Hello World!"));
    }

    #[test]
    fn test_write_turns_power_on() {
        let (mut driver, probe) = driver();
        driver.enable(false, true).unwrap();
        driver.write("x", 1, true, 0).unwrap();
        assert!(probe.is_enabled());
        assert!(probe.is_backlit());
        assert_eq!(
            driver.power(),
            PowerState {
                enabled: true,
                backlit: true
            }
        );
    }

    #[test]
    fn test_repeat_write_is_free() {
        let (mut driver, probe) = driver();
        driver.write("Printing", 0, true, 0).unwrap();
        probe.reset_counts();

        let stats = driver.write("Printing", 0, true, 0).unwrap();
        assert_eq!(stats, WriteStats::default());
        assert_eq!(probe.counts().char_writes, 0);
        assert_eq!(probe.counts().cursor_moves, 0);
    }

    #[test]
    fn test_contiguous_changes_need_one_cursor_move() {
        let (mut driver, probe) = driver();
        driver.write("abcdefgh", 0, true, 0).unwrap();
        probe.reset_counts();

        let stats = driver.write("abXYZfgh", 0, true, 0).unwrap();
        assert_eq!(stats.char_writes, 3);
        assert_eq!(stats.cursor_moves, 1);
        assert_eq!(probe.counts().char_writes, 3);
        assert_eq!(probe.text(0), padded("abXYZfgh"));
    }

    #[test]
    fn test_scattered_changes_move_cursor_each_time() {
        let (mut driver, probe) = driver();
        driver.write("abcdefgh", 1, true, 0).unwrap();

        let stats = driver.write("Xbcdefgh      XY", 1, true, 0).unwrap();
        assert_eq!(stats.char_writes, 3);
        assert_eq!(stats.cursor_moves, 2);
        assert_eq!(probe.text(1), "Xbcdefgh      XY");
    }

    #[test]
    fn test_glyphs_reach_panel() {
        let (mut driver, probe) = driver();
        driver.load_progress_glyphs().unwrap();
        driver.write("[===\x03      ] 37%", 1, true, 0).unwrap();
        assert_eq!(probe.text(1), padded("[===\x03      ] 37%"));
        assert_eq!(probe.glyph(3), Some(PROGRESS_GLYPHS[2].1));
    }

    #[test]
    fn test_non_ascii_sent_as_placeholder() {
        let (mut driver, probe) = driver();
        driver.write("25°C", 0, true, 0).unwrap();
        assert_eq!(probe.text(0), padded("25?C"));
        assert_eq!(row_text(&driver, 0), padded("25°C"));
    }

    #[test]
    fn test_clear_resets_buffer() {
        let (mut driver, probe) = driver();
        driver.write("something", 0, true, 0).unwrap();
        driver.clear().unwrap();
        assert_eq!(row_text(&driver, 0), padded(""));
        assert_eq!(probe.text(0), padded(""));
    }

    #[test]
    fn test_invalid_row() {
        let (mut driver, _) = driver();
        assert_eq!(
            driver.write("x", 2, true, 0),
            Err(DisplayError::InvalidRow(2))
        );
    }

    #[test]
    fn test_invalid_glyph_slot() {
        let (mut driver, _) = driver();
        assert_eq!(
            driver.load_custom_glyph(8, [0; 8]),
            Err(DisplayError::InvalidGlyphSlot(8))
        );
    }

    #[test]
    fn test_hardware_failure_leaves_buffer_matching_panel() {
        let (mut driver, probe) = driver();
        driver.write("before", 0, true, 0).unwrap();
        // cursor move + first char succeed, second char fails
        probe.fail_after(2);

        let result = driver.write("after!", 0, true, 0);
        assert_eq!(result, Err(DisplayError::Hal(HalError::Io)));
        assert_eq!(probe.text(0), padded("aefore"));
        assert_eq!(row_text(&driver, 0), probe.text(0));

        // the old text must be redrawn over the partial write
        probe.recover();
        let stats = driver.write("before", 0, true, 0).unwrap();
        assert_eq!(stats.char_writes, 1);
        assert_eq!(probe.text(0), padded("before"));
        assert_eq!(row_text(&driver, 0), probe.text(0));

        driver.write("after!", 0, true, 0).unwrap();
        assert_eq!(probe.text(0), padded("after!"));
    }
}
