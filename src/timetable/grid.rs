use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde::Serialize;
use std::{fs, io::Cursor, path::Path};
use tracing::{debug, info, instrument, warn};

use super::{
    cleaning::{clean_cell_text, is_single_char_artifact},
    layout::{
        first_day_sheet, DAY_NAMES, DAY_SHEET_COUNT, FIRST_COURSE_COLUMN, FIRST_COURSE_ROW,
        PERIOD_LABEL_ROW, VENUE_COLUMN,
    },
    schedule::{aggregate, slot_count, ClassSlot, CourseScheduleMap},
    time_slot,
};
use crate::error::SyncError;

/// A course cell as found in a day sheet, before its period label is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridEntry {
    pub course: String,
    pub venue: String,
    pub period_label: String,
    pub day: u8,
    pub row: u32,
    pub column: u32,
}

/// A course cell that was dropped instead of aborting the parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCell {
    pub sheet: String,
    pub day: u8,
    pub row: u32,
    pub column: u32,
    pub course: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ParsedTimetable {
    pub schedule: CourseScheduleMap,
    pub skipped: Vec<SkippedCell>,
}

fn cell_text(range: &Range<Data>, row: u32, column: u32) -> Option<String> {
    match range.get_value((row, column))? {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Walk the course area of one day sheet.
///
/// Rows run from [`FIRST_COURSE_ROW`] up to, but excluding, the last used row;
/// columns from [`FIRST_COURSE_COLUMN`] through the last used column.
pub fn scan_day_sheet(
    sheet: &str,
    range: &Range<Data>,
    day: u8,
    skipped: &mut Vec<SkippedCell>,
) -> Vec<GridEntry> {
    let mut entries = Vec::new();
    let Some((max_row, max_col)) = range.end() else {
        return entries;
    };

    for row in FIRST_COURSE_ROW..max_row {
        for column in FIRST_COURSE_COLUMN..=max_col {
            let Some(raw) = cell_text(range, row, column) else {
                continue;
            };
            let course = clean_cell_text(&raw);
            if course.is_empty() || is_single_char_artifact(&course) {
                continue;
            }

            let venue = cell_text(range, row, VENUE_COLUMN)
                .map(|v| clean_cell_text(&v))
                .filter(|v| !v.is_empty());
            let Some(venue) = venue else {
                warn!(sheet, row, column, course = %course, "course cell without venue; skipping");
                skipped.push(SkippedCell {
                    sheet: sheet.to_string(),
                    day,
                    row,
                    column,
                    course,
                    reason: "missing venue".to_string(),
                });
                continue;
            };

            let period_label = cell_text(range, PERIOD_LABEL_ROW, column)
                .map(|l| clean_cell_text(&l))
                .unwrap_or_default();

            entries.push(GridEntry {
                course,
                venue,
                period_label,
                day,
                row,
                column,
            });
        }
    }

    entries
}

/// Normalize each entry's period label and group the results by course.
/// Entries with an unrecognized label are logged and reported, not fatal.
pub fn build_schedule(
    entries: Vec<GridEntry>,
    sheet_names: &[String],
    skipped: &mut Vec<SkippedCell>,
) -> CourseScheduleMap {
    aggregate(entries.into_iter().filter_map(|entry| {
        match time_slot::normalize(&entry.period_label) {
            Ok(time) => Some((
                entry.course,
                ClassSlot {
                    venue: entry.venue,
                    time: time.to_string(),
                    day: entry.day,
                },
            )),
            Err(e) => {
                let sheet = sheet_names
                    .get(entry.day as usize)
                    .cloned()
                    .unwrap_or_default();
                warn!(sheet = %sheet, row = entry.row, column = entry.column, error = %e, "skipping cell");
                skipped.push(SkippedCell {
                    sheet,
                    day: entry.day,
                    row: entry.row,
                    column: entry.column,
                    course: entry.course,
                    reason: e.to_string(),
                });
                None
            }
        }
    }))
}

/// Open the workbook at `path` and extract the week's schedule from its
/// trailing day sheets.
///
/// The format (xls, xlsx, xlsb or ods) is detected from the file contents;
/// the extension of `path` is ignored.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn parse_workbook(path: &Path) -> Result<ParsedTimetable, SyncError> {
    let unreadable = |reason: String| SyncError::WorkbookUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = fs::read(path).map_err(|e| unreadable(e.to_string()))?;
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| unreadable(e.to_string()))?;
    let names = workbook.sheet_names();
    let first = first_day_sheet(names.len()).ok_or(SyncError::MissingDaySheets {
        found: names.len(),
        required: DAY_SHEET_COUNT,
    })?;
    let day_sheets = &names[first..];

    let mut skipped = Vec::new();
    let mut entries = Vec::new();
    for (day, name) in day_sheets.iter().enumerate() {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| unreadable(format!("sheet `{name}`: {e}")))?;
        let found = scan_day_sheet(name, &range, day as u8, &mut skipped);
        debug!(sheet = %name, day = DAY_NAMES[day], cells = found.len(), "scanned day sheet");
        entries.extend(found);
    }

    let schedule = build_schedule(entries, day_sheets, &mut skipped);
    info!(
        courses = schedule.len(),
        slots = slot_count(&schedule),
        skipped = skipped.len(),
        "parsed timetable"
    );
    Ok(ParsedTimetable { schedule, skipped })
}
