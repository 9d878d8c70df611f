use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use juniper::graphql_object;

use super::MealPeriod;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceHours {
    start: NaiveTime,
    end: NaiveTime,
}

const fn hm(hour: u32, min: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, min, 0) {
        Some(t) => t,
        None => panic!("invalid service time"),
    }
}

impl ServiceHours {
    const WEEKDAY_LUNCH: Self = Self::new(hm(11, 30), hm(13, 30));
    const WEEKDAY_DINNER: Self = Self::new(hm(17, 30), hm(20, 0));
    const WEEKEND_LUNCH: Self = Self::new(hm(11, 30), hm(14, 0));
    const WEEKEND_DINNER: Self = Self::new(hm(17, 0), hm(20, 0));

    const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub const fn for_meal(weekday: Weekday, meal: MealPeriod) -> Self {
        let weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
        match (weekend, meal) {
            (false, MealPeriod::Lunch) => Self::WEEKDAY_LUNCH,
            (false, MealPeriod::Dinner) => Self::WEEKDAY_DINNER,
            (true, MealPeriod::Lunch) => Self::WEEKEND_LUNCH,
            (true, MealPeriod::Dinner) => Self::WEEKEND_DINNER,
        }
    }

    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    pub const fn end(&self) -> NaiveTime {
        self.end
    }
}

/// Whether service for `meal` on `date` is already over at `now` (local time).
pub fn has_ended(date: NaiveDate, meal: MealPeriod, now: NaiveDateTime) -> bool {
    let hours = ServiceHours::for_meal(date.weekday(), meal);
    date.and_time(hours.end()) <= now
}

#[graphql_object]
impl ServiceHours {
    /// ex. "11:30"
    #[graphql(name = "start")]
    fn graphql_start(&self) -> String {
        self.start.format("%H:%M").to_string()
    }

    #[graphql(name = "end")]
    fn graphql_end(&self) -> String {
        self.end.format("%H:%M").to_string()
    }
}
