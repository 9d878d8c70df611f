use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Monday of the week containing `today`.
pub fn week_anchor(today: NaiveDate) -> NaiveDate {
    today - Duration::days(today.weekday().num_days_from_monday().into())
}

/// Reads a weekday from the first word of a header such as "Wednesday, April 10".
/// Full names and three letter abbreviations are accepted, in any case.
pub fn parse_weekday_label(label: &str) -> Option<Weekday> {
    label
        .split(|c: char| !c.is_alphabetic())
        .find(|word| !word.is_empty())?
        .parse()
        .ok()
}

pub fn date_in_week(week_of: NaiveDate, weekday: Weekday) -> NaiveDate {
    week_of + Duration::days(weekday.num_days_from_monday().into())
}
