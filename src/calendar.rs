// src/calendar.rs

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekendDay {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
}

fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Fri | Weekday::Sat | Weekday::Sun)
}

/// Every Friday, Saturday and Sunday from Jan 1 of `start_year` through
/// Dec 31 of `end_year`, ascending. Empty when the range is reversed.
pub fn weekends(start_year: i32, end_year: i32) -> Vec<WeekendDay> {
    let (Some(first), Some(last)) = (
        NaiveDate::from_ymd_opt(start_year, 1, 1),
        NaiveDate::from_ymd_opt(end_year, 12, 31),
    ) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| is_weekend(*d))
        .map(|date| WeekendDay { date })
        .collect()
}
