use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::date::{days_in_month, first_of_month, first_weekday_offset, format_date};
use crate::error::HabitResult;

/// One cell of a Sunday-first month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum DayCell {
    /// Padding before the first of the month.
    #[serde(rename = "empty")]
    Empty,
    #[serde(rename = "day")]
    Day {
        #[serde(serialize_with = "serialize_date")]
        date: NaiveDate,
        completed: bool,
        is_today: bool,
        is_future: bool,
    },
}

impl DayCell {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DayCell::Empty => None,
            DayCell::Day { date, .. } => Some(*date),
        }
    }

    pub fn day_of_month(&self) -> Option<u32> {
        self.date().map(|date| date.day())
    }
}

fn serialize_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format_date(*date))
}

/// Cells for `year`-`month` in row-major order: leading padding, then one
/// cell per day of the month.
pub fn month_cells(
    completed: &BTreeSet<NaiveDate>,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> HabitResult<Vec<DayCell>> {
    let first = first_of_month(year, month)?;
    let offset = first_weekday_offset(year, month)? as usize;
    let day_count = days_in_month(year, month) as usize;

    let mut cells = Vec::with_capacity(offset + day_count);
    cells.extend(std::iter::repeat(DayCell::Empty).take(offset));
    cells.extend(first.iter_days().take(day_count).map(|date| DayCell::Day {
        date,
        completed: completed.contains(&date),
        is_today: date == today,
        is_future: date > today,
    }));
    Ok(cells)
}

/// Splits a cell sequence into rows of seven, padding the last row.
pub fn weeks(cells: &[DayCell]) -> Vec<Vec<DayCell>> {
    cells
        .chunks(7)
        .map(|row| {
            let mut row = row.to_vec();
            row.resize(7, DayCell::Empty);
            row
        })
        .collect()
}
