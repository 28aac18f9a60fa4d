//! Display buffer
//!
//! Holds what the panel is currently showing, one `char` per cell, and
//! computes which cells have to change to reach a desired row.

use heapless::Vec;
use piprint_hal::{LCD_COLS, LCD_ROWS};

/// Number of character rows
pub const ROWS: usize = LCD_ROWS;

/// Number of character columns
pub const COLS: usize = LCD_COLS;

/// One full row of cells
pub type Row = [char; COLS];

const BLANK_ROW: Row = [' '; COLS];

/// Indices at which `current` and `desired` differ, ascending
///
/// Only the overlapping prefix of the two slices is compared.
pub fn compute_diff<'a>(
    current: &'a [char],
    desired: &'a [char],
) -> impl Iterator<Item = usize> + 'a {
    current
        .iter()
        .zip(desired.iter())
        .enumerate()
        .filter(|(_, (have, want))| have != want)
        .map(|(i, _)| i)
}

/// Planned update of a single row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPlan {
    /// Row index
    pub row: usize,
    /// Full row contents after the update
    pub target: Row,
    /// Cells that differ from what is currently shown
    pub diff: Vec<usize, COLS>,
}

impl RowPlan {
    /// Whether the update changes nothing on the panel
    pub fn is_noop(&self) -> bool {
        self.diff.is_empty()
    }
}

/// Last-known contents of the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    rows: [Row; ROWS],
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBuffer {
    /// Create a buffer filled with spaces
    pub const fn new() -> Self {
        Self {
            rows: [BLANK_ROW; ROWS],
        }
    }

    /// Contents of a row
    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    /// Work out the target row and its diff for a write
    ///
    /// - `message` is truncated to the cells remaining after `column`
    /// - with `clear`, everything after the message is blanked; cells
    ///   before `column` keep their current contents
    /// - without `clear`, only the cells covered by `message` change
    ///
    /// Returns `None` if `row` is out of range.
    pub fn plan(&self, row: usize, message: &str, clear: bool, column: usize) -> Option<RowPlan> {
        let current = self.rows.get(row)?;
        let column = column.min(COLS);

        let mut target = *current;
        let mut end = column;
        for (cell, ch) in target[column..].iter_mut().zip(message.chars()) {
            *cell = ch;
            end += 1;
        }
        if clear {
            for cell in &mut target[end..] {
                *cell = ' ';
            }
        }

        let diff = compute_diff(current, &target).collect();
        Some(RowPlan { row, target, diff })
    }

    /// Record that the panel now shows `plan.target`
    pub fn commit(&mut self, plan: &RowPlan) {
        if let Some(row) = self.rows.get_mut(plan.row) {
            *row = plan.target;
        }
    }

    /// Record that a single cell now shows `ch`
    ///
    /// Out-of-range positions are ignored.
    pub fn set_cell(&mut self, row: usize, col: usize, ch: char) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = ch;
        }
    }

    /// Blank both rows
    pub fn clear(&mut self) {
        self.rows = [BLANK_ROW; ROWS];
    }
}
