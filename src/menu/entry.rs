use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use chrono::NaiveDate;
use juniper::{graphql_object, GraphQLEnum};
use serde::{Deserialize, Serialize};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Name of a dining location, ex. "Seibel Servery".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, GraphQLEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum MealPeriod {
    Lunch,
    Dinner,
}

impl MealPeriod {
    pub const ALL: [Self; 2] = [Self::Lunch, Self::Dinner];

    /// Finds the first word of a header that names a meal, ex. "Dinner Menu".
    pub fn from_label(label: &str) -> Option<Self> {
        label
            .split(|c: char| !c.is_alphabetic())
            .find_map(|word| word.parse().ok())
    }
}

impl FromStr for MealPeriod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("lunch") {
            Ok(Self::Lunch)
        } else if s.eq_ignore_ascii_case("dinner") {
            Ok(Self::Dinner)
        } else {
            Err(())
        }
    }
}

impl Display for MealPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lunch => f.write_str("LUNCH"),
            Self::Dinner => f.write_str("DINNER"),
        }
    }
}

/// One dish served at one location for one meal. Never mutated once extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    source: SourceId,
    date: NaiveDate,
    meal_period: MealPeriod,
    name: String,
    dietary_tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    category: Option<String>,
}

impl MenuEntry {
    pub fn new(
        source: SourceId,
        date: NaiveDate,
        meal_period: MealPeriod,
        name: impl Into<String>,
        dietary_tags: BTreeSet<String>,
        category: Option<String>,
    ) -> Self {
        Self {
            source,
            date,
            meal_period,
            name: name.into(),
            dietary_tags,
            category,
        }
    }

    pub const fn source(&self) -> &SourceId {
        &self.source
    }

    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    pub const fn meal_period(&self) -> MealPeriod {
        self.meal_period
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn dietary_tags(&self) -> &BTreeSet<String> {
        &self.dietary_tags
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn category_label(&self) -> &str {
        self.category().unwrap_or(UNCATEGORIZED)
    }
}

#[graphql_object(name = "MenuItem")]
impl MenuEntry {
    #[graphql(name = "name")]
    fn graphql_name(&self) -> &str {
        &self.name
    }

    #[graphql(name = "dietaryTags")]
    fn graphql_dietary_tags(&self) -> Vec<&str> {
        self.dietary_tags.iter().map(String::as_str).collect()
    }

    #[graphql(name = "category")]
    fn graphql_category(&self) -> &str {
        self.category_label()
    }
}
