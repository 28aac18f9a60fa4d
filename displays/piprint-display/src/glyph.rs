//! Custom glyphs and the progress bar
//!
//! The bar is ten cells wide. Each cell stands for 10 %, and the last cell
//! can be partially filled in 2 % steps using four CGRAM glyphs.

use core::fmt::{self, Write};

use heapless::String;

/// Cell drawn for a completely filled 10 % step
pub const FULL_CELL: char = '=';

/// Glyph for a 2 % partial cell
pub const GLYPH_2: char = '\x01';
/// Glyph for a 4 % partial cell
pub const GLYPH_4: char = '\x02';
/// Glyph for a 6 % partial cell
pub const GLYPH_6: char = '\x03';
/// Glyph for an 8 % partial cell
pub const GLYPH_8: char = '\x04';

/// CGRAM slot and 5x8 pattern for each partial-fill glyph
pub const PROGRESS_GLYPHS: [(u8, [u8; 8]); 4] = [
    (GLYPH_2 as u8, [0, 0, 0b10000, 0, 0b10000, 0, 0, 0]),
    (GLYPH_4 as u8, [0, 0, 0b11000, 0, 0b11000, 0, 0, 0]),
    (GLYPH_6 as u8, [0, 0, 0b11100, 0, 0b11100, 0, 0, 0]),
    (GLYPH_8 as u8, [0, 0, 0b11110, 0, 0b11110, 0, 0, 0]),
];

/// Width of the bar in cells
pub const BAR_CELLS: usize = 10;

/// Formatted progress bar, e.g. `"[===\x03      ] 37%"`
pub type ProgressBar = String<20>;

/// Partial cell following the full cells
fn partial_cell(progress: u8) -> char {
    match (progress % 10) / 2 {
        0 => ' ',
        1 => GLYPH_2,
        2 => GLYPH_4,
        3 => GLYPH_6,
        4 => GLYPH_8,
        _ => FULL_CELL,
    }
}

/// Render `progress` (0-100) as `"[" + 10 cells + "] " + progress + "%"`
///
/// Full cells are `progress / 10` (integer division), followed by one
/// partial glyph picked by `(progress % 10) / 2`, then spaces.
pub fn format_progress_bar(progress: u8) -> ProgressBar {
    let progress = progress.min(100);
    let full = (progress / 10) as usize;

    let mut bar = ProgressBar::new();
    let _ = bar.push('[');
    let cells = core::iter::repeat(FULL_CELL)
        .take(full)
        .chain(core::iter::once(partial_cell(progress)))
        .chain(core::iter::repeat(' '))
        .take(BAR_CELLS);
    for cell in cells {
        let _ = bar.push(cell);
    }
    let _ = write!(bar, "] {}%", progress);
    bar
}

/// Log-friendly view of display text
///
/// Glyph codes 0-7 are shown as `#n` so they survive a text log.
#[derive(Clone)]
pub struct Printable<I>(pub I);

impl<I> fmt::Display for Printable<I>
where
    I: Clone + Iterator<Item = char>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.0.clone() {
            if (ch as u32) < 8 {
                write!(f, "#{}", ch as u32)?;
            } else {
                f.write_char(ch)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_37() {
        assert_eq!(format_progress_bar(37).as_str(), "[===\x03      ] 37%");
    }

    #[test]
    fn test_progress_35_uses_40_percent_glyph() {
        assert_eq!(format_progress_bar(35).as_str(), "[===\x02      ] 35%");
    }

    #[test]
    fn test_progress_small() {
        assert_eq!(format_progress_bar(1).as_str(), "[          ] 1%");
        assert_eq!(format_progress_bar(2).as_str(), "[\x01         ] 2%");
    }

    #[test]
    fn test_progress_round_tens() {
        assert_eq!(format_progress_bar(10).as_str(), "[=         ] 10%");
        assert_eq!(format_progress_bar(50).as_str(), "[=====     ] 50%");
    }

    #[test]
    fn test_progress_high_values_stay_ten_cells() {
        assert_eq!(format_progress_bar(99).as_str(), "[=========\x04] 99%");
        assert_eq!(format_progress_bar(100).as_str(), "[==========] 100%");
        assert_eq!(format_progress_bar(250).as_str(), "[==========] 100%");
    }

    #[test]
    fn test_bar_width_is_constant() {
        for p in 0..=100u8 {
            let bar = format_progress_bar(p);
            let cells = bar.chars().skip(1).take_while(|&c| c != ']').count();
            assert_eq!(cells, BAR_CELLS, "progress {}", p);
        }
    }

    #[test]
    fn test_printable_marks_glyphs() {
        let text = format!("{}", Printable("[=\x03 ]".chars()));
        assert_eq!(text, "[=#3 ]");
    }
}
