use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};

/// Current streak length as of `today`.
///
/// The run is anchored at today when today is completed, otherwise at
/// yesterday, so an unfinished today does not break a streak that is still
/// alive. Two consecutive missed days yield zero.
pub fn streak_from(completed: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let anchor = if completed.contains(&today) {
        today
    } else {
        match today.checked_sub_days(Days::new(1)) {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut count = 0;
    let mut cursor = Some(anchor);
    while let Some(day) = cursor {
        if !completed.contains(&day) {
            break;
        }
        count += 1;
        cursor = day.checked_sub_days(Days::new(1));
    }
    count
}
