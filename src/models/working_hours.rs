use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// One row per weekday, 0 = Monday through 6 = Sunday. Availability only
/// ever consults a single row per weekday; duplicates are a data defect
/// that the calculator detects and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingHours {
    pub id: i64,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_working: bool,
}

pub fn day_name(day_of_week: u8) -> &'static str {
    match day_of_week {
        0 => "Monday",
        1 => "Tuesday",
        2 => "Wednesday",
        3 => "Thursday",
        4 => "Friday",
        5 => "Saturday",
        6 => "Sunday",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_name() {
        assert_eq!(day_name(0), "Monday");
        assert_eq!(day_name(6), "Sunday");
        assert_eq!(day_name(7), "Unknown");
    }
}
