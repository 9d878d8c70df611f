//! Read-only projections of a [`super::WeeklyMenu`] handed to GraphQL.
use chrono::{Datelike, Local, NaiveDate};
use juniper::graphql_object;

use super::{
    filter::ItemFilter,
    hours::{has_ended, ServiceHours},
    weekly_menu::group_by_category,
    MealPeriod, MenuEntry, SourceId,
};

#[derive(Debug, Clone)]
pub struct DayMenu {
    date: NaiveDate,
    meals: Vec<MealMenu>,
}

impl DayMenu {
    pub const fn new(date: NaiveDate, meals: Vec<MealMenu>) -> Self {
        Self { date, meals }
    }
}

#[graphql_object]
impl DayMenu {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// ex. "Monday"
    pub fn weekday(&self) -> String {
        self.date.format("%A").to_string()
    }

    /// With `upcomingOnly`, meals whose service already ended are left out.
    pub fn meals(
        &self,
        meal_period: Option<MealPeriod>,
        upcoming_only: Option<bool>,
    ) -> Vec<MealMenu> {
        let now = Local::now().naive_local();
        let upcoming_only = upcoming_only.unwrap_or(false);
        self.meals
            .iter()
            .filter(|meal| meal_period.map_or(true, |p| meal.meal_period == p))
            .filter(|meal| !upcoming_only || !has_ended(self.date, meal.meal_period, now))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct MealMenu {
    date: NaiveDate,
    meal_period: MealPeriod,
    sources: Vec<SourceMenu>,
}

impl MealMenu {
    pub const fn new(date: NaiveDate, meal_period: MealPeriod, sources: Vec<SourceMenu>) -> Self {
        Self {
            date,
            meal_period,
            sources,
        }
    }
}

#[graphql_object]
impl MealMenu {
    pub fn meal_period(&self) -> MealPeriod {
        self.meal_period
    }

    pub fn hours(&self) -> ServiceHours {
        ServiceHours::for_meal(self.date.weekday(), self.meal_period)
    }

    #[allow(clippy::needless_pass_by_value)] // ignored because graphql doesn't support pass by reference
    pub fn sources(&self, names: Option<Vec<String>>) -> Vec<SourceMenu> {
        self.sources
            .iter()
            .filter(|s| {
                names
                    .as_ref()
                    .map_or(true, |names| names.iter().any(|n| n == s.source.as_str()))
            })
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct SourceMenu {
    source: SourceId,
    entries: Vec<MenuEntry>,
}

impl SourceMenu {
    pub const fn new(source: SourceId, entries: Vec<MenuEntry>) -> Self {
        Self { source, entries }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryMenu {
    name: String,
    items: Vec<MenuEntry>,
}

#[graphql_object]
impl CategoryMenu {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[MenuEntry] {
        &self.items
    }
}

#[graphql_object]
impl SourceMenu {
    pub fn name(&self) -> &str {
        self.source.as_str()
    }

    pub fn items(
        &self,
        contains_any_tags: Option<Vec<String>>,
        excludes_all_tags: Option<Vec<String>>,
        name_contains: Option<String>,
    ) -> Vec<MenuEntry> {
        ItemFilter::new(contains_any_tags, excludes_all_tags, name_contains.as_deref())
            .apply(&self.entries)
    }

    /// Items grouped by station, stations in alphabetical order. Empty stations are dropped.
    pub fn categories(
        &self,
        contains_any_tags: Option<Vec<String>>,
        excludes_all_tags: Option<Vec<String>>,
        name_contains: Option<String>,
    ) -> Vec<CategoryMenu> {
        let filter = ItemFilter::new(contains_any_tags, excludes_all_tags, name_contains.as_deref());
        group_by_category(&self.entries)
            .into_iter()
            .map(|(name, items)| CategoryMenu {
                name: name.to_owned(),
                items: filter.apply(items),
            })
            .filter(|category| !category.items.is_empty())
            .collect()
    }
}
