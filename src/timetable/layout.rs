//! Positional conventions of the published timetable workbook.
//!
//! The workbook carries one sheet per weekday at the end, preceded by any
//! number of non-schedule sheets. Inside a day sheet, row 2 holds the period
//! labels, column 0 holds the venue, and courses start at row 4 / column 1.
//! All indices are 0-based.

/// Number of trailing sheets holding the Monday..Friday grids.
pub const DAY_SHEET_COUNT: usize = 5;

/// Row holding the period label of each column.
pub const PERIOD_LABEL_ROW: u32 = 2;

/// Column holding the venue of each row.
pub const VENUE_COLUMN: u32 = 0;

/// First row that may contain course cells.
pub const FIRST_COURSE_ROW: u32 = 4;

/// First column that may contain course cells.
pub const FIRST_COURSE_COLUMN: u32 = 1;

pub const DAY_NAMES: [&str; DAY_SHEET_COUNT] =
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// Index of the first day sheet in a workbook of `sheet_count` sheets, or
/// `None` when there are not enough sheets for a full week.
pub fn first_day_sheet(sheet_count: usize) -> Option<usize> {
    sheet_count.checked_sub(DAY_SHEET_COUNT)
}
