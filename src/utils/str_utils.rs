use itertools::Itertools;

pub trait StringExtensions {
    /// Convert a display name to a bucket path segment.
    /// E.g. `"Bath  Time Fun".to_storage_key() == "bath_time_fun"`
    fn to_storage_key(&self) -> String;
}

impl StringExtensions for str {
    fn to_storage_key(&self) -> String {
        self
            .split_whitespace()
            .map(|s| s.to_lowercase())
            .join("_")
    }
}

#[test]
fn test_to_storage_key() {
    assert_eq!("Month 3".to_storage_key(), "month_3");
    assert_eq!("Milestone Celebrations".to_storage_key(), "milestone_celebrations");
    assert_eq!("  Bath \t Time  ".to_storage_key(), "bath_time");
    assert_eq!("Newborn".to_storage_key(), "newborn");
}
