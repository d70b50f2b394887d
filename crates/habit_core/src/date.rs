//! Canonical `YYYY-MM-DD` dates and month arithmetic used by the calendar.

use chrono::{Datelike, NaiveDate};

use crate::error::{HabitError, HabitResult};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weekday headings in grid order; weeks start on Sunday.
pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Parses a zero-padded `YYYY-MM-DD` string into a calendar day.
///
/// Anything else (missing padding, trailing text, impossible days like
/// `2025-02-30`) is rejected with [`HabitError::InvalidDate`].
pub fn parse_date(input: &str) -> HabitResult<NaiveDate> {
    let bytes = input.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(idx, b)| idx == 4 || idx == 7 || b.is_ascii_digit());
    if !well_formed {
        return Err(HabitError::invalid_date(input));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| HabitError::invalid_date(input))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// First day of the given month, rejecting months outside `1..=12`.
pub fn first_of_month(year: i32, month: u32) -> HabitResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| HabitError::invalid_date(format!("{year:04}-{month:02}")))
}

/// Number of days in `month`; zero for a month outside `1..=12`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Empty cells before the first of the month in a Sunday-first grid.
pub fn first_weekday_offset(year: i32, month: u32) -> HabitResult<u32> {
    Ok(first_of_month(year, month)?.weekday().num_days_from_sunday())
}

/// Moves `delta` months forward (or backward when negative).
pub fn shift_month(year: i32, month: u32, delta: i32) -> HabitResult<(i32, u32)> {
    first_of_month(year, month)?;
    let total_months = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(delta);
    let target_month = (total_months.rem_euclid(12) + 1) as u32;
    let target_year = i32::try_from(total_months.div_euclid(12))
        .map_err(|_| HabitError::invalid_date(format!("{year:04}-{month:02}{delta:+}")))?;
    first_of_month(target_year, target_month)?;
    Ok((target_year, target_month))
}

pub fn month_title(year: i32, month: u32) -> HabitResult<String> {
    first_of_month(year, month)?;
    Ok(format!("{} {}", MONTH_NAMES[(month - 1) as usize], year))
}

/// Parses a `YYYY-MM` month selector.
pub fn parse_month(input: &str) -> HabitResult<(i32, u32)> {
    let date = parse_date(&format!("{input}-01"))?;
    Ok((date.year(), date.month()))
}

/// Serde adapter storing a date set as sorted canonical strings.
pub mod canonical_dates {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_date, parse_date};

    pub fn serialize<S>(dates: &BTreeSet<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(dates.iter().map(|date| format_date(*date)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeSet<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Vec<String> = Vec::deserialize(deserializer)?;
        raw.iter()
            .map(|value| parse_date(value).map_err(serde::de::Error::custom))
            .collect()
    }
}
