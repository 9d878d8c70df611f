use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use juniper::{graphql_object, GraphQLInputObject};
use serde::Serialize;

use super::{
    view::{DayMenu, MealMenu, SourceMenu},
    MealPeriod, MenuEntry, SourceId,
};
use crate::fetch::FetchError;

/// Everything served on one date: meal → location → items in document order.
pub type DailyMenu = BTreeMap<MealPeriod, BTreeMap<SourceId, Vec<MenuEntry>>>;

/// Result of one source's fetch → extract → dedupe pipeline.
pub type SourceOutcome = (SourceId, Result<Vec<MenuEntry>, FetchError>);

/// The merged schedule for one Monday-first week, keyed by date → meal → source.
///
/// Built in one go by [`WeeklyMenu::aggregate`] and read-only afterwards. Dates are ordered by
/// their calendar value, never by label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyMenu {
    week_of: NaiveDate,
    days: BTreeMap<NaiveDate, DailyMenu>,
}

#[derive(GraphQLInputObject, Debug)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl WeeklyMenu {
    pub const fn empty(week_of: NaiveDate) -> Self {
        Self {
            week_of,
            days: BTreeMap::new(),
        }
    }

    /// Merges every successful source into one menu. Failed sources add nothing but are logged.
    pub fn aggregate(week_of: NaiveDate, outcomes: impl IntoIterator<Item = SourceOutcome>) -> Self {
        let mut menu = Self::empty(week_of);
        for (source, outcome) in outcomes {
            match outcome {
                Ok(entries) => {
                    log::debug!("Merging {} entries from {source}", entries.len());
                    for entry in entries {
                        menu.insert(&source, entry);
                    }
                }
                Err(e) => {
                    log::warn!("No menu from {source} for the week of {week_of}: {e}");
                }
            }
        }
        menu
    }

    fn insert(&mut self, source: &SourceId, entry: MenuEntry) {
        let last_day = self.week_of + Duration::days(6);
        if entry.source() != source {
            log::error!(
                "Skipping {:?}: extracted for {} but reported by {source}",
                entry.name(),
                entry.source()
            );
            return;
        }
        if !(self.week_of..=last_day).contains(&entry.date()) {
            log::error!(
                "Skipping {:?} from {source}: {} is outside the week of {}",
                entry.name(),
                entry.date(),
                self.week_of
            );
            return;
        }
        self.days
            .entry(entry.date())
            .or_default()
            .entry(entry.meal_period())
            .or_default()
            .entry(source.clone())
            .or_default()
            .push(entry);
    }

    pub const fn week_of(&self) -> NaiveDate {
        self.week_of
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &DailyMenu)> {
        self.days.iter().map(|(date, menu)| (*date, menu))
    }

    pub fn get(&self, date: NaiveDate, meal: MealPeriod, source: &SourceId) -> Option<&[MenuEntry]> {
        self.days
            .get(&date)?
            .get(&meal)?
            .get(source)
            .map(Vec::as_slice)
    }

    pub fn entries(&self) -> impl Iterator<Item = &MenuEntry> {
        self.days
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .flatten()
    }

    pub fn sources(&self) -> BTreeSet<&SourceId> {
        self.entries().map(MenuEntry::source).collect()
    }

    /// Every dietary tag that appears at least once this week.
    pub fn dietary_tags(&self) -> BTreeSet<&str> {
        self.entries()
            .flat_map(|entry| entry.dietary_tags().iter().map(String::as_str))
            .collect()
    }

    fn day_view(date: NaiveDate, menu: &DailyMenu) -> DayMenu {
        let meals = menu
            .iter()
            .map(|(meal_period, by_source)| {
                let sources = by_source
                    .iter()
                    .map(|(source, entries)| SourceMenu::new(source.clone(), entries.clone()))
                    .collect();
                MealMenu::new(date, *meal_period, sources)
            })
            .collect();
        DayMenu::new(date, meals)
    }
}

/// Groups entries by category label, categories sorted by name.
pub fn group_by_category<'e>(
    entries: impl IntoIterator<Item = &'e MenuEntry>,
) -> BTreeMap<&'e str, Vec<&'e MenuEntry>> {
    entries
        .into_iter()
        .fold(BTreeMap::new(), |mut groups, entry| {
            groups
                .entry(entry.category_label())
                .or_insert_with(Vec::new)
                .push(entry);
            groups
        })
}

#[graphql_object]
impl WeeklyMenu {
    /// Monday of the scraped week.
    #[graphql(name = "weekOf")]
    fn graphql_week_of(&self) -> NaiveDate {
        self.week_of
    }

    #[graphql(name = "sources")]
    fn graphql_sources(&self) -> Vec<&str> {
        self.sources().into_iter().map(SourceId::as_str).collect()
    }

    #[graphql(name = "dietaryTags")]
    fn graphql_dietary_tags(&self) -> Vec<&str> {
        self.dietary_tags().into_iter().collect()
    }

    #[allow(clippy::needless_pass_by_value)] // ignored because graphql doesn't support pass by reference
    #[graphql(name = "days")]
    fn graphql_days(&self, date_range: Option<DateRange>) -> Vec<DayMenu> {
        let (start, end) = date_range.map_or((None, None), |r| (r.start, r.end));
        self.days()
            .filter(|(date, _)| {
                let mut incl = true;
                incl &= start.map_or(true, |start_date| *date >= start_date);
                incl &= end.map_or(true, |end_date| *date <= end_date);
                incl
            })
            .map(|(date, menu)| Self::day_view(date, menu))
            .collect()
    }
}
