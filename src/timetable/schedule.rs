use serde::Serialize;
use std::collections::BTreeMap;

/// One weekly occurrence of a course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClassSlot {
    pub venue: String,
    /// Canonical `HH:MM-HH:MM` range.
    pub time: String,
    /// 0 = Monday .. 4 = Friday.
    pub day: u8,
}

/// Course name -> every slot found for it, in scan order.
pub type CourseScheduleMap = BTreeMap<String, Vec<ClassSlot>>;

/// Group `(course, slot)` pairs by course name. Identical slots are kept.
pub fn aggregate<I>(entries: I) -> CourseScheduleMap
where
    I: IntoIterator<Item = (String, ClassSlot)>,
{
    let mut map = CourseScheduleMap::new();
    for (course, slot) in entries {
        map.entry(course).or_default().push(slot);
    }
    map
}

/// Total number of slots across all courses.
pub fn slot_count(map: &CourseScheduleMap) -> usize {
    map.values().map(Vec::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(venue: &str, time: &str, day: u8) -> ClassSlot {
        ClassSlot {
            venue: venue.to_string(),
            time: time.to_string(),
            day,
        }
    }

    #[test]
    fn test_groups_by_course_and_keeps_duplicates() {
        let map = aggregate(vec![
            ("CS101".to_string(), slot("Room A", "09:00-09:55", 0)),
            ("MA201".to_string(), slot("Room B", "10:00-10:55", 0)),
            ("CS101".to_string(), slot("Room A", "09:00-09:55", 0)),
            ("CS101".to_string(), slot("Lab 1", "13:00-13:55", 3)),
        ]);

        assert_eq!(map.len(), 2);
        assert_eq!(
            map["CS101"],
            vec![
                slot("Room A", "09:00-09:55", 0),
                slot("Room A", "09:00-09:55", 0),
                slot("Lab 1", "13:00-13:55", 3),
            ]
        );
        assert_eq!(map["MA201"], vec![slot("Room B", "10:00-10:55", 0)]);
        assert_eq!(slot_count(&map), 4);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(Vec::new()).is_empty());
    }
}
