use crate::error::SyncError;

/// Period labels as printed in the workbook header row, mapped to 24-hour
/// ranges. The afternoon labels are written in 12-hour form without a suffix.
pub const PERIODS: [(&str, &str); 8] = [
    ("08-8:55", "08:00-08:55"),
    ("09-09:55", "09:00-09:55"),
    ("10-10:55", "10:00-10:55"),
    ("11-11:55", "11:00-11:55"),
    ("12-12:55", "12:00-12:55"),
    ("1-1:55", "13:00-13:55"),
    ("2-2:55", "14:00-14:55"),
    ("3-3:55", "15:00-15:55"),
];

/// Map a raw period label to its canonical `HH:MM-HH:MM` range.
pub fn normalize(label: &str) -> Result<&'static str, SyncError> {
    let label = label.trim();
    PERIODS
        .iter()
        .find(|(raw, _)| *raw == label)
        .map(|(_, canonical)| *canonical)
        .ok_or_else(|| SyncError::UnknownTimeSlot(label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_periods() {
        let expected = [
            ("08-8:55", "08:00-08:55"),
            ("09-09:55", "09:00-09:55"),
            ("10-10:55", "10:00-10:55"),
            ("11-11:55", "11:00-11:55"),
            ("12-12:55", "12:00-12:55"),
            ("1-1:55", "13:00-13:55"),
            ("2-2:55", "14:00-14:55"),
            ("3-3:55", "15:00-15:55"),
        ];
        for (raw, canonical) in expected {
            assert_eq!(normalize(raw).unwrap(), canonical, "label {raw}");
        }
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert_eq!(normalize(" 1-1:55 ").unwrap(), "13:00-13:55");
    }

    #[test]
    fn test_unknown_label() {
        match normalize("4-4:55") {
            Err(SyncError::UnknownTimeSlot(label)) => assert_eq!(label, "4-4:55"),
            other => panic!("expected UnknownTimeSlot, got {other:?}"),
        }
        assert!(normalize("").is_err());
    }
}
