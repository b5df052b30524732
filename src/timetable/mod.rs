pub mod cleaning;
pub mod grid;
pub mod layout;
pub mod schedule;
pub mod time_slot;

pub use grid::{parse_workbook, GridEntry, ParsedTimetable, SkippedCell};
pub use schedule::{aggregate, ClassSlot, CourseScheduleMap};
